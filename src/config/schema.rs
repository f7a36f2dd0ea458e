//! KDL schema for config.kdl / maintboard.kdl.
//!
//! This module provides:
//! - The `MaintboardConfig` struct representing one config file
//! - Parsing from KDL format
//! - Validation

use kdl::{KdlDocument, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings read from one config file. Unset values are `None`.
///
/// # KDL Schema
///
/// ```kdl
/// source "/data/maintenance/demo.xlsx"
/// refresh-interval 300   // seconds
/// recent-limit 10
/// output-format "human"  // or "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintboardConfig {
    /// Path of the spreadsheet to load
    pub source: Option<PathBuf>,

    /// Seconds between periodic refreshes in `mb watch`
    pub refresh_interval: Option<u64>,

    /// Number of rows in the recent-items listing
    pub recent_limit: Option<usize>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

fn first_entry<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

impl MaintboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval == Some(0) {
            return Err("refresh-interval must be at least 1 second".to_string());
        }
        if self.recent_limit == Some(0) {
            return Err("recent-limit must be at least 1".to_string());
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Entries of the wrong type are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_entry(doc, "source").and_then(|v| v.as_string()) {
            config.source = Some(PathBuf::from(s));
        }

        if let Some(i) = first_entry(doc, "refresh-interval").and_then(|v| v.as_integer()) {
            config.refresh_interval = u64::try_from(i).ok();
        }

        if let Some(i) = first_entry(doc, "recent-limit").and_then(|v| v.as_integer()) {
            config.recent_limit = usize::try_from(i).ok();
        }

        if let Some(s) = first_entry(doc, "output-format").and_then(|v| v.as_string()) {
            config.output_format = OutputFormat::parse(s);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== OutputFormat Tests ====================

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("yaml"), None);
        assert_eq!(format!("{}", OutputFormat::Human), "human");
    }

    // ==================== MaintboardConfig Tests ====================

    #[test]
    fn test_config_from_kdl_empty() {
        let doc = KdlDocument::new();
        assert_eq!(MaintboardConfig::from_kdl(&doc), MaintboardConfig::default());
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            source "/srv/sheets/demo.xlsx"
            refresh-interval 60
            recent-limit 25
            output-format "human"
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = MaintboardConfig::from_kdl(&doc);

        assert_eq!(config.source, Some(PathBuf::from("/srv/sheets/demo.xlsx")));
        assert_eq!(config.refresh_interval, Some(60));
        assert_eq!(config.recent_limit, Some(25));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
    }

    #[test]
    fn test_config_from_kdl_ignores_wrong_types() {
        let kdl = r#"
            source 42
            refresh-interval "soon"
            recent-limit -3
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        assert_eq!(MaintboardConfig::from_kdl(&doc), MaintboardConfig::default());
    }

    #[test]
    fn test_config_validate() {
        assert!(MaintboardConfig::default().validate().is_ok());

        let zero_interval = MaintboardConfig {
            refresh_interval: Some(0),
            ..Default::default()
        };
        assert!(zero_interval.validate().unwrap_err().contains("refresh-interval"));

        let zero_limit = MaintboardConfig {
            recent_limit: Some(0),
            ..Default::default()
        };
        assert!(zero_limit.validate().unwrap_err().contains("recent-limit"));
    }
}
