//! YAML configuration file support for the identity pipeline.
//!
//! Lets deployments define identifier, batch and remote-adapter settings in
//! a single YAML file and load them at runtime.
//!
//! ## Example configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "ci-change-detection"
//!
//! identifier:
//!   algorithm: "sha256"
//!   encoding: "hex"
//!   truncate: 16
//!   include_metadata: false
//!
//! batch:
//!   concurrency: 10
//!   continue_on_error: true
//!
//! remote:
//!   host: "github.com"
//!   token: "ghp_example"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gitid_batch::{AdapterConfig, BatchOptions};
use gitid_identifier::{Algorithm, DigestEncoding, IdentifierOptions};

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the identity pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitIdConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Identifier generation settings.
    #[serde(default)]
    pub identifier: IdentifierSection,

    /// Batch orchestration settings.
    #[serde(default)]
    pub batch: BatchSection,

    /// Remote adapter settings. Credentials live here explicitly; nothing
    /// in the engine reads the process environment.
    #[serde(default)]
    pub remote: RemoteSection,
}

/// Identifier settings as they appear in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierSection {
    pub algorithm: String,
    pub encoding: String,
    pub truncate: Option<usize>,
    pub include_metadata: bool,
}

impl Default for IdentifierSection {
    fn default() -> Self {
        Self {
            algorithm: "sha256".to_string(),
            encoding: "hex".to_string(),
            truncate: None,
            include_metadata: false,
        }
    }
}

/// Batch settings as they appear in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    pub concurrency: usize,
    pub continue_on_error: bool,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            concurrency: 10,
            continue_on_error: true,
        }
    }
}

/// Remote adapter settings as they appear in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    pub host: String,
    pub token: Option<String>,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            token: None,
        }
    }
}

impl Default for GitIdConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            identifier: IdentifierSection::default(),
            batch: BatchSection::default(),
            remote: RemoteSection::default(),
        }
    }
}

impl GitIdConfig {
    /// Loads and validates a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and validates a configuration from a YAML string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GitIdConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks version support and every section's constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.version.as_str(), "1" | "1.0") {
            return Err(ConfigError::UnsupportedVersion(self.version.clone()));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::Validation(
                "batch.concurrency must be at least 1".to_string(),
            ));
        }
        if self.identifier.truncate == Some(0) {
            return Err(ConfigError::Validation(
                "identifier.truncate must be at least 1".to_string(),
            ));
        }
        if self.remote.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "remote.host must not be empty".to_string(),
            ));
        }
        self.identifier_options()?;
        Ok(())
    }

    /// Builds the typed identifier options from the string-keyed section.
    pub fn identifier_options(&self) -> Result<IdentifierOptions, ConfigError> {
        let algorithm = match self.identifier.algorithm.as_str() {
            "sha256" => Algorithm::Sha256,
            "sha1" => Algorithm::Sha1,
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown identifier.algorithm: {other}"
                )));
            }
        };
        let encoding = match self.identifier.encoding.as_str() {
            "hex" => DigestEncoding::Hex,
            "base64" => DigestEncoding::Base64,
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown identifier.encoding: {other}"
                )));
            }
        };
        Ok(IdentifierOptions {
            algorithm,
            encoding,
            truncate: self.identifier.truncate,
            include_metadata: self.identifier.include_metadata,
        })
    }

    /// Builds the typed batch options, identifier settings included.
    pub fn batch_options(&self) -> Result<BatchOptions, ConfigError> {
        Ok(BatchOptions {
            concurrency: self.batch.concurrency,
            continue_on_error: self.batch.continue_on_error,
            identifier: self.identifier_options()?,
        })
    }

    /// Adapter construction settings for the remote side.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            host: self.remote.host.clone(),
            token: self.remote.token.clone(),
        }
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version: "1.0"
name: "ci-change-detection"

identifier:
  algorithm: "sha1"
  encoding: "base64"
  truncate: 16

batch:
  concurrency: 4
  continue_on_error: false

remote:
  host: "git.example.com"
  token: "secret"
"#;

    #[test]
    fn parses_full_config_into_typed_options() {
        let config = GitIdConfig::from_yaml_str(SAMPLE).expect("config parses");

        let identifier = config.identifier_options().expect("identifier options");
        assert_eq!(identifier.algorithm, Algorithm::Sha1);
        assert_eq!(identifier.encoding, DigestEncoding::Base64);
        assert_eq!(identifier.truncate, Some(16));

        let batch = config.batch_options().expect("batch options");
        assert_eq!(batch.concurrency, 4);
        assert!(!batch.continue_on_error);

        let adapter = config.adapter_config();
        assert_eq!(adapter.host, "git.example.com");
        assert_eq!(adapter.token.as_deref(), Some("secret"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = GitIdConfig::from_yaml_str("version: \"1.0\"\n").expect("config parses");

        assert_eq!(config.identifier.algorithm, "sha256");
        assert_eq!(config.batch.concurrency, 10);
        assert!(config.batch.continue_on_error);
        assert_eq!(config.remote.host, "github.com");
        assert!(config.remote.token.is_none());
    }

    #[test]
    fn unsupported_version_rejected() {
        let err = GitIdConfig::from_yaml_str("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(_)));
    }

    #[test]
    fn bad_algorithm_and_zero_concurrency_rejected() {
        let err = GitIdConfig::from_yaml_str(
            "version: \"1.0\"\nidentifier:\n  algorithm: \"md5\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("algorithm")));

        let err = GitIdConfig::from_yaml_str("version: \"1.0\"\nbatch:\n  concurrency: 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("concurrency")));
    }

    #[test]
    fn yaml_round_trip_preserves_settings() {
        let config = GitIdConfig::from_yaml_str(SAMPLE).expect("config parses");
        let yaml = config.to_yaml().expect("serialize");
        let reparsed = GitIdConfig::from_yaml_str(&yaml).expect("reparse");

        assert_eq!(reparsed.version, config.version);
        assert_eq!(reparsed.identifier.algorithm, config.identifier.algorithm);
        assert_eq!(reparsed.batch.concurrency, config.batch.concurrency);
        assert_eq!(reparsed.remote.token, config.remote.token);
    }
}
