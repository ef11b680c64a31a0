//! Document natures of GSTR-1 Table 13.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Nature of document as listed in Table 13.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentNature {
    #[default]
    InvoicesOutward,
    InvoicesInwardRcm,
    RevisedInvoice,
    DebitNote,
    CreditNote,
    ReceiptVoucher,
    PaymentVoucher,
    RefundVoucher,
    DeliveryChallanJobWork,
    DeliveryChallanApproval,
    DeliveryChallanLiquidGas,
    DeliveryChallanOthers,
}

impl DocumentNature {
    const ALL: [DocumentNature; 12] = [
        Self::InvoicesOutward,
        Self::InvoicesInwardRcm,
        Self::RevisedInvoice,
        Self::DebitNote,
        Self::CreditNote,
        Self::ReceiptVoucher,
        Self::PaymentVoucher,
        Self::RefundVoucher,
        Self::DeliveryChallanJobWork,
        Self::DeliveryChallanApproval,
        Self::DeliveryChallanLiquidGas,
        Self::DeliveryChallanOthers,
    ];

    /// Every nature, in Table 13 order.
    pub fn all() -> &'static [DocumentNature] {
        &Self::ALL
    }

    /// Label as printed in the return.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvoicesOutward => "Invoices for outward supply",
            Self::InvoicesInwardRcm => {
                "Invoices for inward supply from unregistered person (RCM)"
            }
            Self::RevisedInvoice => "Revised Invoice",
            Self::DebitNote => "Debit Note",
            Self::CreditNote => "Credit Note",
            Self::ReceiptVoucher => "Receipt Voucher",
            Self::PaymentVoucher => "Payment Voucher",
            Self::RefundVoucher => "Refund Voucher",
            Self::DeliveryChallanJobWork => "Delivery Challan for job work",
            Self::DeliveryChallanApproval => "Delivery Challan for supply on approval",
            Self::DeliveryChallanLiquidGas => "Delivery Challan in case of liquid gas",
            Self::DeliveryChallanOthers => "Delivery Challan in other cases",
        }
    }
}

impl fmt::Display for DocumentNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentNature {
    type Err = String;

    /// Accepts the exact label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Err("please select a document nature".to_string());
        }
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("invalid document nature: {}", wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            "Credit Note".parse::<DocumentNature>(),
            Ok(DocumentNature::CreditNote)
        );
        assert_eq!(
            "  invoices for outward supply ".parse::<DocumentNature>(),
            Ok(DocumentNature::InvoicesOutward)
        );
        assert!("Bill of Supply".parse::<DocumentNature>().is_err());
        assert!("".parse::<DocumentNature>().is_err());
    }

    #[test]
    fn test_all_labels_round_trip() {
        assert_eq!(DocumentNature::all().len(), 12);
        for nature in DocumentNature::all() {
            assert_eq!(nature.label().parse::<DocumentNature>(), Ok(*nature));
        }
    }
}
