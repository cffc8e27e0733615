//! # Cluster Configuration Pipeline
//!
//! Loading, expansion, defaulting, override and validation machinery for
//! multi-cloud cluster configurations.
//!
//! Two on-disk dialects are accepted, in YAML or JSON:
//!
//! - the legacy flat document, deserialized directly into
//!   [`ClusterConfig`];
//! - the Kubernetes-style `apiVersion`/`kind: Cluster` manifest, converted
//!   through [`dialect::ClusterManifest`].
//!
//! The [`Loader`] facade runs the full pipeline in a fixed order: read,
//! environment expansion, parse, environment overrides, explicit
//! overrides, default cascade, validation chain.

pub mod defaults;
pub mod dialect;
pub mod env;
pub mod expand;
pub mod file_loader;
pub mod loader;
pub mod merge;
pub mod model;
pub mod overrides;
pub mod rke2;
pub mod validate;

pub use defaults::apply_defaults;
pub use env::EnvSnapshot;
pub use expand::expand_env;
pub use file_loader::{parse_document, save_to_path, Codec};
pub use loader::Loader;
pub use merge::merge_configs;
pub use model::{
    ClusterConfig, KubernetesConfig, Metadata, NetworkConfig, NodeConfig, NodePool,
    ProvidersConfig, Rke2Config, WireGuardConfig,
};
pub use overrides::{apply_override, OverridePath, OverrideValue};
pub use validate::{run_builtin_validators, ClusterValidator};
