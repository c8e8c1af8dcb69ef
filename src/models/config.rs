//! Scanner configuration.
//!
//! Defaults are overridden by an optional JSON file, then by `MRZSCAN_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::ValidationRules;
use crate::utils::ScanError;

pub const ENV_COMMIT_DELAY_MS: &str = "MRZSCAN_COMMIT_DELAY_MS";
pub const ENV_VERIFY_CHECK_DIGITS: &str = "MRZSCAN_VERIFY_CHECK_DIGITS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Pause between committing a result and notifying the listener, so the
    /// matched region stays highlighted on screen.
    pub commit_delay_ms: u64,

    /// Verify ICAO check digits on extracted fields.
    pub verify_check_digits: bool,

    /// Minimum document number length for passports (TD3).
    pub passport_min_document_number: usize,

    /// Minimum document number length for ID cards (TD1, TD2).
    pub id_card_min_document_number: usize,

    /// Minimum document number length for typed entries.
    pub manual_entry_min_document_number: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let rules = ValidationRules::default();
        Self {
            commit_delay_ms: 1000,
            verify_check_digits: rules.verify_check_digits,
            passport_min_document_number: rules.passport_min_document_number,
            id_card_min_document_number: rules.id_card_min_document_number,
            manual_entry_min_document_number: rules.manual_entry_min_document_number,
        }
    }
}

impl ScannerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw).map_err(|e| {
            ScanError::Config(format!(
                "Failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Layer on file (if any) and process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ScanError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_COMMIT_DELAY_MS) {
            self.commit_delay_ms = value.trim().parse().map_err(|_| {
                ScanError::Config(format!(
                    "{} must be an integer, got '{}'",
                    ENV_COMMIT_DELAY_MS, value
                ))
            })?;
        }

        if let Some(value) = lookup(ENV_VERIFY_CHECK_DIGITS) {
            self.verify_check_digits = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ScanError::Config(format!(
                        "{} must be a boolean, got '{}'",
                        ENV_VERIFY_CHECK_DIGITS, value
                    )))
                }
            };
        }

        Ok(self)
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            passport_min_document_number: self.passport_min_document_number,
            id_card_min_document_number: self.id_card_min_document_number,
            manual_entry_min_document_number: self.manual_entry_min_document_number,
            verify_check_digits: self.verify_check_digits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::default();
        assert_eq!(config.commit_delay(), Duration::from_secs(1));
        assert!(!config.verify_check_digits);
        assert_eq!(config.rules(), ValidationRules::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{"commit_delay_ms": 250, "verify_check_digits": true,
            "manual_entry_min_document_number": 6}"#;
        file.write_all(json.as_bytes()).unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.commit_delay_ms, 250);
        assert!(config.verify_check_digits);
        assert_eq!(config.passport_min_document_number, 8);
        assert_eq!(config.rules().manual_entry_min_len(), 6);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "commit_delay_ms = 250").unwrap();

        let err = ScannerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = ScannerConfig::default()
            .apply_env_overrides(|key| match key {
                ENV_COMMIT_DELAY_MS => Some("0".to_string()),
                ENV_VERIFY_CHECK_DIGITS => Some("yes".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.commit_delay(), Duration::ZERO);
        assert!(config.verify_check_digits);

        let err = ScannerConfig::default()
            .apply_env_overrides(|key| (key == ENV_COMMIT_DELAY_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }
}
