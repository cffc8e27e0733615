//! # Override Engine
//!
//! Applies key/value overrides addressed by dot-paths, from three sources
//! in fixed precedence (later wins): file values, `CLUSTER_`-prefixed
//! environment variables, explicit caller-registered overrides.
//!
//! Supported paths are an explicit enum rather than a stringly-typed
//! switch, so the set is checked exhaustively at compile time. Unknown
//! paths are silently skipped — that looseness is a documented policy for
//! callers that feed generic key/value stores through this engine — and
//! logged at debug level so they are at least visible.

use crate::env::EnvSnapshot;
use crate::model::ClusterConfig;
use errors::ConfigError;
use std::str::FromStr;

/// Prefix that marks an environment variable as an override source.
pub const ENV_OVERRIDE_PREFIX: &str = "CLUSTER_";

/// An override value. Boolean-typed destination fields require
/// [`OverrideValue::Bool`]; a string at such a field is a type mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideValue {
    String(String),
    Bool(bool),
}

impl From<&str> for OverrideValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OverrideValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for OverrideValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl OverrideValue {
    fn as_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// The dot-paths this engine can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePath {
    MetadataName,
    MetadataEnvironment,
    MetadataVersion,
    MetadataOwner,
    MetadataTeam,
    ClusterType,
    ClusterVersion,
    ClusterHighAvailability,
    KubernetesDistribution,
    KubernetesVersion,
    NetworkCidr,
}

impl FromStr for OverridePath {
    type Err = ();

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match path {
            "metadata.name" => Ok(Self::MetadataName),
            "metadata.environment" => Ok(Self::MetadataEnvironment),
            "metadata.version" => Ok(Self::MetadataVersion),
            "metadata.owner" => Ok(Self::MetadataOwner),
            "metadata.team" => Ok(Self::MetadataTeam),
            "cluster.type" => Ok(Self::ClusterType),
            "cluster.version" => Ok(Self::ClusterVersion),
            "cluster.highavailability" => Ok(Self::ClusterHighAvailability),
            "kubernetes.distribution" => Ok(Self::KubernetesDistribution),
            "kubernetes.version" => Ok(Self::KubernetesVersion),
            "network.cidr" => Ok(Self::NetworkCidr),
            _ => Err(()),
        }
    }
}

impl OverridePath {
    fn apply(self, cfg: &mut ClusterConfig, value: &OverrideValue) -> Result<(), ConfigError> {
        match self {
            Self::MetadataName => cfg.metadata.name = value.as_string(),
            Self::MetadataEnvironment => cfg.metadata.environment = value.as_string(),
            Self::MetadataVersion => cfg.metadata.version = value.as_string(),
            Self::MetadataOwner => cfg.metadata.owner = value.as_string(),
            Self::MetadataTeam => cfg.metadata.team = value.as_string(),
            Self::ClusterType => cfg.cluster.cluster_type = value.as_string(),
            Self::ClusterVersion => cfg.cluster.version = value.as_string(),
            Self::ClusterHighAvailability => match value {
                OverrideValue::Bool(b) => cfg.cluster.high_availability = *b,
                OverrideValue::String(_) => {
                    return Err(ConfigError::Override {
                        path: "cluster.highavailability".to_string(),
                        reason: "expected a boolean value".to_string(),
                    });
                }
            },
            Self::KubernetesDistribution => cfg.kubernetes.distribution = value.as_string(),
            Self::KubernetesVersion => cfg.kubernetes.version = value.as_string(),
            Self::NetworkCidr => cfg.network.cidr = value.as_string(),
        }
        Ok(())
    }
}

/// Applies one override; unknown paths are skipped without error.
pub fn apply_override(
    cfg: &mut ClusterConfig,
    path: &str,
    value: &OverrideValue,
) -> Result<(), ConfigError> {
    match OverridePath::from_str(path) {
        Ok(parsed) => {
            parsed.apply(cfg, value)?;
            if path.contains("token") || path.contains("password") {
                tracing::info!("override applied: {} = ***", path);
            } else {
                tracing::info!("override applied: {} = {}", path, value.as_string());
            }
            Ok(())
        }
        Err(()) => {
            tracing::debug!("ignoring unsupported override path: {}", path);
            Ok(())
        }
    }
}

/// Applies all `CLUSTER_`-prefixed environment overrides from the snapshot.
///
/// `CLUSTER_METADATA_NAME=edge` becomes `metadata.name = "edge"`: the
/// prefix is stripped, the remainder lower-cased, underscores turned into
/// path separators. Values arrive as strings, so boolean-typed fields
/// reject them as type mismatches.
pub fn apply_env_overrides(
    cfg: &mut ClusterConfig,
    env: &EnvSnapshot,
) -> Result<(), ConfigError> {
    for (name, value) in env.with_prefix(ENV_OVERRIDE_PREFIX) {
        // Strip the prefix exactly once: CLUSTER_CLUSTER_TYPE must keep its
        // leading cluster segment.
        let path = name
            .strip_prefix(ENV_OVERRIDE_PREFIX)
            .unwrap_or(name)
            .to_lowercase()
            .replace('_', ".");
        apply_override(cfg, &path, &OverrideValue::String(value.to_string()))?;
    }
    Ok(())
}
