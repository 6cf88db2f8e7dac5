//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tripstat.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Unit settings.
    #[serde(default)]
    pub units: UnitsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "tripstat_report.txt".to_string()
}

/// Display unit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// Distance unit selector. `"miles"` selects miles; any other value
    /// falls back to kilometers.
    #[serde(default = "default_distance")]
    pub distance: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
        }
    }
}

fn default_distance() -> String {
    "km".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report format selector: `"text"` or `"json"`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Embed the calculation explanation in the JSON report.
    #[serde(default)]
    pub include_explanation: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            include_explanation: false,
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".tripstat.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref unit) = args.unit {
            self.units.distance = unit.clone();
        }

        if let Some(format) = args.format {
            self.report.format = match format {
                crate::cli::OutputFormat::Text => "text".to_string(),
                crate::cli::OutputFormat::Json => "json".to_string(),
            };
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::PathBuf;

    fn make_args() -> crate::cli::Args {
        crate::cli::Args {
            input: Some(PathBuf::from("-")),
            output: None,
            format: None,
            unit: None,
            sample: false,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "tripstat_report.txt");
        assert_eq!(config.units.distance, "km");
        assert_eq!(config.report.format, "text");
        assert!(!config.report.include_explanation);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "fleet_report.txt"
verbose = true

[units]
distance = "miles"

[report]
format = "json"
include_explanation = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "fleet_report.txt");
        assert!(config.general.verbose);
        assert_eq!(config.units.distance, "miles");
        assert_eq!(config.report.format, "json");
        assert!(config.report.include_explanation);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[units]\ndistance = \"miles\"\n").unwrap();
        assert_eq!(config.units.distance, "miles");
        assert_eq!(config.general.output, "tripstat_report.txt");
        assert_eq!(config.report.format, "text");
    }

    #[test]
    fn test_merge_with_args_cli_precedence() {
        let mut config: Config = toml::from_str(
            r#"
[units]
distance = "km"

[report]
format = "text"
"#,
        )
        .unwrap();

        let mut args = make_args();
        args.output = Some(PathBuf::from("custom.txt"));
        args.unit = Some("miles".to_string());
        args.format = Some(OutputFormat::Json);
        args.verbose = true;

        config.merge_with_args(&args);

        assert_eq!(config.general.output, "custom.txt");
        assert_eq!(config.units.distance, "miles");
        assert_eq!(config.report.format, "json");
        assert!(config.general.verbose);
    }

    #[test]
    fn test_merge_without_cli_values_keeps_config() {
        let mut config: Config = toml::from_str("[units]\ndistance = \"miles\"\n").unwrap();
        config.merge_with_args(&make_args());
        assert_eq!(config.units.distance, "miles");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[units]"));
        assert!(toml_str.contains("[report]"));
    }
}
