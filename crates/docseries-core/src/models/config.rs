//! Configuration structures for the series pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::models::nature::DocumentNature;
use crate::pattern::{BracketPolicy, CompileOptions};
use crate::series::MatcherOptions;

/// Main configuration for docseries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocSeriesConfig {
    /// Pattern compilation configuration.
    pub pattern: PatternConfig,

    /// Invoice matching configuration.
    pub matching: MatchingConfig,

    /// Series analysis configuration.
    pub analysis: AnalysisConfig,

    /// Pattern auto-detection configuration.
    pub detection: DetectionConfig,

    /// Report configuration.
    pub report: ReportConfig,
}

/// Pattern compilation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// `lenient` accepts stray brackets as fixed text, `strict` rejects them.
    pub bracket_policy: BracketPolicy,
}

/// Invoice matching configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Render sequences with the declared width only, ignoring observed
    /// zero padding.
    pub ignore_leading_zeros: bool,
}

/// Series analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Missing share of the range above which a warning is raised.
    pub high_cancellation_ratio: f64,

    /// Consecutive missing numbers that count as a large gap.
    pub large_gap_threshold: u64,

    /// Missing numbers listed in text summaries before truncating.
    pub max_missing_display: usize,

    /// Widest sequence range whose gaps are enumerated (0 = no limit).
    /// Wider series get a warning and no missing list.
    pub max_range_span: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_cancellation_ratio: 0.20,
            large_gap_threshold: 50,
            max_missing_display: 20,
            max_range_span: 1_000_000,
        }
    }
}

/// Pattern auto-detection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum lines fed to the detector (0 = all).
    pub max_sample: usize,
}

/// Report configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Nature used when none is given.
    pub default_nature: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_nature: DocumentNature::default().label().to_string(),
        }
    }
}

impl DocSeriesConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            bracket_policy: self.pattern.bracket_policy,
        }
    }

    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            ignore_leading_zeros: self.matching.ignore_leading_zeros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DocSeriesConfig::default();
        assert_eq!(config.analysis.high_cancellation_ratio, 0.20);
        assert_eq!(config.analysis.large_gap_threshold, 50);
        assert_eq!(config.analysis.max_range_span, 1_000_000);
        assert_eq!(config.pattern.bracket_policy, BracketPolicy::Lenient);
        assert_eq!(config.report.default_nature, "Invoices for outward supply");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DocSeriesConfig =
            serde_json::from_str(r#"{"pattern":{"bracket_policy":"strict"}}"#).unwrap();
        assert_eq!(config.pattern.bracket_policy, BracketPolicy::Strict);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DocSeriesConfig::default();
        config.analysis.large_gap_threshold = 10;
        config.matching.ignore_leading_zeros = true;
        config.save(&path).unwrap();

        let loaded = DocSeriesConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
