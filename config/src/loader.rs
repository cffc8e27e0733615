//! # Loader Facade
//!
//! Single entry point tying the pipeline together: read the file, expand
//! environment references, parse whichever dialect the document is
//! written in, apply environment and explicit overrides, cascade
//! defaults, then run the validation chain. The loaded configuration is
//! retained for later [`Loader::save`] calls.

use crate::defaults::apply_defaults;
use crate::env::EnvSnapshot;
use crate::expand::expand_env;
use crate::file_loader::{self, Codec};
use crate::model::ClusterConfig;
use crate::overrides::{apply_env_overrides, apply_override, OverrideValue};
use crate::validate::{run_builtin_validators, ClusterValidator};
use errors::ConfigError;
use std::path::{Path, PathBuf};

/// Stateful configuration loader.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Orchestrates the full ingestion pipeline for one configuration file
/// and keeps the result so the caller can re-read or persist it.
///
/// ## Pipeline order
/// read → env-expand → parse → env overrides → explicit overrides →
/// defaults → built-in validators → custom validators.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Loader, OverrideValue};
///
/// fn main() -> Result<(), errors::ConfigError> {
///     let mut loader = Loader::new("cluster.yaml");
///     loader.set_override("metadata.environment", "staging".into());
///     let config = loader.load()?;
///     println!("environment: {}", config.metadata.environment);
///     Ok(())
/// }
/// ```
pub struct Loader {
    path: PathBuf,
    env: EnvSnapshot,
    overrides: Vec<(String, OverrideValue)>,
    validators: Vec<Box<dyn ClusterValidator>>,
    config: Option<ClusterConfig>,
}

impl Loader {
    /// Creates a loader over `path`, snapshotting the process environment.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_env(path, EnvSnapshot::from_process())
    }

    /// Creates a loader with an explicit environment snapshot. This is the
    /// constructor tests use; [`Loader::new`] delegates here.
    pub fn with_env(path: impl AsRef<Path>, env: EnvSnapshot) -> Self {
        Self {
            path: file_loader::expand_home(path.as_ref()),
            env,
            overrides: Vec::new(),
            validators: Vec::new(),
            config: None,
        }
    }

    /// Registers an explicit override, applied after environment overrides.
    /// Repeated calls for the same path apply in registration order, so the
    /// last one wins.
    pub fn set_override(&mut self, path: impl Into<String>, value: OverrideValue) {
        self.overrides.push((path.into(), value));
    }

    /// Registers a custom validator, run after the built-in chain.
    pub fn add_validator(&mut self, validator: Box<dyn ClusterValidator>) {
        self.validators.push(validator);
    }

    /// The most recently loaded configuration, if any.
    pub fn config(&self) -> Option<&ClusterConfig> {
        self.config.as_ref()
    }

    /// Runs the full pipeline and returns the validated configuration.
    pub fn load(&mut self) -> Result<&ClusterConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.path.display().to_string(),
            });
        }

        let codec = Codec::from_path(&self.path)?;
        let raw = std::fs::read_to_string(&self.path)?;
        let expanded = expand_env(&raw, &self.env);
        let mut cfg = file_loader::parse_document(&expanded, codec)?;

        apply_env_overrides(&mut cfg, &self.env)?;
        for (path, value) in &self.overrides {
            apply_override(&mut cfg, path, value)?;
        }

        apply_defaults(&mut cfg);

        run_builtin_validators(&cfg)?;
        for validator in &self.validators {
            validator.validate(&cfg)?;
        }

        tracing::info!(
            cluster = %cfg.metadata.name,
            environment = %cfg.metadata.environment,
            distribution = %cfg.kubernetes.distribution,
            "configuration loaded"
        );

        self.config = Some(cfg);
        // The Some() assignment directly above makes this infallible.
        self.config.as_ref().ok_or(ConfigError::NoConfigLoaded)
    }

    /// Persists the loaded configuration to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let cfg = self.config.as_ref().ok_or(ConfigError::NoConfigLoaded)?;
        file_loader::save_to_path(cfg, path.as_ref())
    }
}
