//! Runtime configuration: output format selection and the optional
//! config file.

use crate::error::{Result, StatError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How poll results are written to stdout.
///
/// # Examples
///
/// ```rust
/// use corestat_core::OutputFormat;
///
/// let format: OutputFormat = "csv".parse().unwrap();
/// assert_eq!(format, OutputFormat::Csv);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A timestamp line followed by one aligned line per core
    Human,
    /// One `timestamp, index, busy, iowait` row per core
    Csv,
}

impl Default for OutputFormat {
    /// Default to the human-readable layout.
    fn default() -> Self {
        Self::Human
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Human => "human",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "plain" | "text" => Ok(Self::Human),
            "csv" | "delimited" => Ok(Self::Csv),
            _ => Err(OutputFormatParseError {
                input: s.to_owned(),
                valid_options: &["human", "csv"],
            }),
        }
    }
}

/// Error type for parsing [`OutputFormat`] from string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid output format '{input}'. Valid options: {}", valid_options.join(", "))]
pub struct OutputFormatParseError {
    input: String,
    valid_options: &'static [&'static str],
}

/// Configuration loaded from the optional config file.
///
/// Command line arguments override these settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Seconds between polls.
    #[serde(
        default = "default_interval",
        deserialize_with = "validate_interval_secs"
    )]
    pub interval: u64,
    /// Output format for poll results.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            format: OutputFormat::default(),
        }
    }
}

fn default_interval() -> u64 {
    GlobalConfig::MIN_INTERVAL_SECS
}

impl GlobalConfig {
    /// Minimum allowed poll interval in seconds.
    pub const MIN_INTERVAL_SECS: u64 = 1;

    /// Load configuration from the standard config file location.
    ///
    /// Searches for config in:
    /// 1. ~/.config/corestat/config.ron
    /// 2. ~/.corestat/config.ron (fallback)
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::find_config_file() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: GlobalConfig = ron::from_str(&content).map_err(|e| StatError::Config {
            message: format!("Failed to parse config file: {e}"),
            value: None,
        })?;

        Ok(config)
    }

    /// Find the config file in standard locations.
    pub fn find_config_file() -> Option<PathBuf> {
        // Try XDG config directory first
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_path = config_dir.join("corestat").join("config.ron");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        // Try home directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".corestat").join("config.ron");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        None
    }

    /// Get the default config file path for writing.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("corestat").join("config.ron"))
    }

    /// Save an example configuration with documentation to a file.
    pub fn save_example_config_to_file(path: &PathBuf) -> Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r##"// corestat Configuration File
// ===========================
// Copy this to ~/.config/corestat/config.ron and customize as needed.
//
// Note: Command line arguments override these settings.

(
    // Seconds between polls (minimum 1)
    interval: 1,

    // Output format for poll results
    // Options: human, csv
    // - human: a timestamp line, then "core N: busy X%, iowait Y%" per core
    // - csv: one "timestamp, index, busy, iowait" row per core
    format: human,
)
"##;

        std::fs::write(path, template)?;

        Ok(())
    }
}

/// Validate the poll interval during deserialization.
fn validate_interval_secs<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let interval = u64::deserialize(deserializer)?;
    if interval < GlobalConfig::MIN_INTERVAL_SECS {
        return Err(serde::de::Error::custom(format!(
            "Poll interval must be at least {} second(s), got {}",
            GlobalConfig::MIN_INTERVAL_SECS,
            interval
        )));
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(
            "delimited".parse::<OutputFormat>().unwrap(),
            OutputFormat::Csv
        );

        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_parse_error_message() {
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid output format 'xml'. Valid options: human, csv"
        );
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Human.to_string(), "human");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.interval, 1);
        assert_eq!(config.format, OutputFormat::Human);
    }

    #[test]
    fn test_config_from_ron() {
        let config: GlobalConfig = ron::from_str("(interval: 5, format: csv)").unwrap();
        assert_eq!(config.interval, 5);
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: GlobalConfig = ron::from_str("()").unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_config_rejects_zero_interval() {
        assert!(ron::from_str::<GlobalConfig>("(interval: 0)").is_err());
    }

    #[test]
    fn test_load_from_file_maps_parse_failure_to_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, "(interval: banana)").unwrap();

        let err = GlobalConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, StatError::Config { .. }));
    }

    #[test]
    fn test_example_config_round_trips_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ron");

        GlobalConfig::save_example_config_to_file(&path).unwrap();
        let config = GlobalConfig::load_from_file(&path).unwrap();

        assert_eq!(config, GlobalConfig::default());
    }
}
