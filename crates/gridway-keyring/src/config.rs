//! Codec configuration

use gridway_types::{AccAddress, DEFAULT_BECH32_PREFIX};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest record accepted by default when decoding
pub const DEFAULT_MAX_RECORD_LEN: usize = 64 * 1024;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("io error:: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml parsing error:: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("toml serialization error:: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("invalid config:: {0}")]
    Invalid(String),
}

/// Settings for [`InfoCodec`](crate::InfoCodec) and key listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Upper bound on the declared length of a record being decoded
    pub max_record_len: usize,
    /// Bech32 human-readable prefix for addresses in key listings
    pub bech32_prefix: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
        }
    }
}

impl CodecConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_record_len == 0 {
            return Err(ConfigError::Invalid(
                "max_record_len must be greater than zero".to_string(),
            ));
        }

        AccAddress::default()
            .to_bech32(&self.bech32_prefix)
            .map_err(|e| ConfigError::Invalid(format!("bech32_prefix:: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_empty() {
        let config = CodecConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.max_record_len, DEFAULT_MAX_RECORD_LEN);
        assert_eq!(config.bech32_prefix, "cosmos");
    }

    #[test]
    fn test_partial_override() {
        let config = CodecConfig::from_toml_str("bech32_prefix = \"gridway\"").unwrap();
        assert_eq!(config.bech32_prefix, "gridway");
        assert_eq!(config.max_record_len, DEFAULT_MAX_RECORD_LEN);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            CodecConfig::from_toml_str("max_record_len = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("bech32_prefix = \"has space\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml_str("max_record_len = \"big\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let config = CodecConfig {
            max_record_len: 512,
            bech32_prefix: "grid".to_string(),
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = CodecConfig::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CodecConfig::load_from_file("/nonexistent/gridway/codec.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
