//! # Cluster Configuration Errors
//!
//! Error handling for the configuration ingestion pipeline.
//!
//! - Uses `thiserror` for structured error definitions
//! - Provides `Display` and `Error` trait implementations
//! - Every variant names exactly one failure; the pipeline aborts on the
//!   first error and never returns a partial configuration

use thiserror::Error;

/// Errors surfaced by the configuration pipeline.
///
/// Each variant is the terminal result of one failing pipeline stage.
/// There are no retries: all operations are local and deterministic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("unsupported configuration format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to parse YAML configuration: {reason}")]
    YamlParse { reason: String },

    #[error("failed to parse JSON configuration: {reason}")]
    JsonParse { reason: String },

    #[error("unsupported apiVersion: {api_version} (expected: cluster-forge.io/v1, multicloud-k8s.io/v1 or v1)")]
    UnsupportedApiVersion { api_version: String },

    #[error("unsupported kind: {kind} (expected: Cluster)")]
    UnsupportedKind { kind: String },

    #[error("failed to apply override {path}: {reason}")]
    Override { path: String, reason: String },

    #[error("configuration validation failed: {reason}")]
    Validation { reason: String },

    #[error("no configurations to merge")]
    NoConfigurations,

    #[error("no configuration loaded")]
    NoConfigLoaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Shorthand for a validation failure naming one violated invariant.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_codec() {
        let yaml = ConfigError::YamlParse {
            reason: "bad indent".to_string(),
        };
        assert!(yaml.to_string().contains("YAML"));

        let json = ConfigError::JsonParse {
            reason: "trailing comma".to_string(),
        };
        assert!(json.to_string().contains("JSON"));
    }

    #[test]
    fn test_api_version_error_names_offending_string() {
        let err = ConfigError::UnsupportedApiVersion {
            api_version: "example.io/v2".to_string(),
        };
        assert!(err.to_string().contains("example.io/v2"));
    }

    #[test]
    fn test_validation_shorthand() {
        let err = ConfigError::validation("cluster name is required");
        assert!(err.to_string().contains("cluster name is required"));
    }
}
