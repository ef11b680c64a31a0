//! WASM bindings for invoice series analysis.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use wasm_bindgen::prelude::*;

use docseries_core::models::continuity::PreviousSeriesRecord;
use docseries_core::pattern::CompileOptions;
use docseries_core::report::format_table13_tsv;
use docseries_core::{
    compile_pattern, fy_of, same_fy, DocumentNature, PatternDetector, PatternSpec,
    PreviousSeriesInfo, ProcessingResult, SeriesAnalyzer, SeriesMatcher,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn nature_label(nature: Option<String>) -> Result<&'static str, JsValue> {
    match nature {
        Some(n) => n
            .parse::<DocumentNature>()
            .map(|n| n.label())
            .map_err(js_err),
        None => Ok(DocumentNature::default().label()),
    }
}

/// Analyze invoice numbers (one per line) against a pattern.
///
/// Returns the processing result as a plain object.
#[wasm_bindgen]
pub fn analyze_invoices(
    pattern: &str,
    text: &str,
    nature: Option<String>,
) -> Result<JsValue, JsValue> {
    let processor = SeriesProcessor::new(pattern)?;
    processor.analyze(text, nature)
}

/// Guess a pattern from sample invoice numbers (one per line).
#[wasm_bindgen]
pub fn detect_pattern(text: &str) -> Result<JsValue, JsValue> {
    let lines: Vec<&str> = text.lines().collect();
    let detection = PatternDetector::new().detect(&lines).map_err(js_err)?;

    #[derive(serde::Serialize)]
    struct DetectResult {
        pattern: String,
        confidence: u8,
        method: &'static str,
        samples: usize,
        message: String,
    }

    to_js(&DetectResult {
        message: detection.message(),
        method: detection.method.as_str(),
        pattern: detection.pattern,
        confidence: detection.confidence,
        samples: detection.samples,
    })
}

/// Human-readable breakdown of a pattern.
#[wasm_bindgen]
pub fn describe_pattern(pattern: &str) -> Result<String, JsValue> {
    compile_pattern(pattern).map(|spec| spec.describe()).map_err(js_err)
}

/// Error text for an invalid pattern, or `undefined` when it compiles.
#[wasm_bindgen]
pub fn validate_pattern(pattern: &str) -> Option<String> {
    docseries_core::pattern::validate_pattern(pattern, CompileOptions::default())
        .err()
        .map(|e| e.to_string())
}

/// Financial year of an `MMYYYY` period, e.g. `"2024-25"`.
#[wasm_bindgen]
pub fn financial_year(period: &str) -> Result<String, JsValue> {
    fy_of(period).map(|fy| fy.to_string()).map_err(js_err)
}

/// Whether two `MMYYYY` periods share a financial year.
#[wasm_bindgen]
pub fn same_financial_year(a: &str, b: &str) -> bool {
    same_fy(a, b)
}

/// Compare previous-period rows with a processing result.
///
/// `previous_js` is an array of `{ docType, from, to, total, cancelled, taxPeriod }`.
#[wasm_bindgen]
pub fn check_continuity(
    previous_js: JsValue,
    result_js: JsValue,
    period: &str,
) -> Result<JsValue, JsValue> {
    let records: Vec<PreviousSeriesRecord> =
        serde_wasm_bindgen::from_value(previous_js).map_err(js_err)?;
    let result: ProcessingResult = serde_wasm_bindgen::from_value(result_js).map_err(js_err)?;

    if let Err(e) = docseries_core::TaxPeriod::parse(period) {
        web_sys::console::warn_1(&format!("{e}; comparing against all previous rows").into());
    }

    let previous: Vec<PreviousSeriesInfo> = records
        .into_iter()
        .filter(|r| !r.to_invoice.trim().is_empty())
        .map(PreviousSeriesInfo::from)
        .collect();

    to_js(&docseries_core::check_continuity(
        &previous,
        &result.series_results,
        period,
    ))
}

/// Table 13 rows of a processing result as tab-separated text.
#[wasm_bindgen]
pub fn report_tsv(result_js: JsValue) -> Result<String, JsValue> {
    let result: ProcessingResult = serde_wasm_bindgen::from_value(result_js).map_err(js_err)?;
    Ok(format_table13_tsv(&docseries_core::to_report_rows(&result)))
}

/// Series processor class for browser use.
///
/// Compiles the pattern once for repeated analysis.
#[wasm_bindgen]
pub struct SeriesProcessor {
    matcher: SeriesMatcher,
}

#[wasm_bindgen]
impl SeriesProcessor {
    /// Create a processor for `pattern`.
    #[wasm_bindgen(constructor)]
    pub fn new(pattern: &str) -> Result<SeriesProcessor, JsValue> {
        let spec = compile_pattern(pattern).map_err(js_err)?;
        Ok(Self::from_spec(spec))
    }

    /// The pattern this processor was built from.
    #[wasm_bindgen(getter)]
    pub fn pattern(&self) -> String {
        self.matcher.spec().raw().to_string()
    }

    /// Human-readable breakdown of the pattern.
    #[wasm_bindgen]
    pub fn describe(&self) -> String {
        self.matcher.spec().describe()
    }

    /// Whether a single invoice number fits the pattern.
    #[wasm_bindgen]
    pub fn matches(&self, invoice: &str) -> bool {
        self.matcher.match_line(invoice).is_valid()
    }

    /// Analyze invoice numbers (one per line).
    #[wasm_bindgen]
    pub fn analyze(&self, text: &str, nature: Option<String>) -> Result<JsValue, JsValue> {
        let nature = nature_label(nature)?;
        let result = self.run(text, nature);
        to_js(&result)
    }

    /// Analyze and return Table 13 rows as tab-separated text.
    #[wasm_bindgen]
    pub fn analyze_tsv(&self, text: &str, nature: Option<String>) -> Result<String, JsValue> {
        let nature = nature_label(nature)?;
        let result = self.run(text, nature);
        Ok(format_table13_tsv(&docseries_core::to_report_rows(&result)))
    }
}

impl SeriesProcessor {
    fn from_spec(spec: PatternSpec) -> Self {
        Self {
            matcher: SeriesMatcher::new(spec),
        }
    }

    fn run(&self, text: &str, nature: &str) -> ProcessingResult {
        let outcome = self.matcher.match_all(text);
        SeriesAnalyzer::new(&self.matcher).analyze_outcome(outcome, nature)
    }
}
