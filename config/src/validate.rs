//! # Validation Chain
//!
//! An ordered chain of validators run over the fully assembled
//! configuration. The chain is strictly first-error-wins: validators run
//! in registration order and the first failure aborts the run, so callers
//! always see the earliest structural problem rather than a knock-on one.

use crate::model::{ClusterConfig, NodePool};
use errors::ConfigError;
use validator::Validate;

/// A single validation rule over the assembled configuration.
///
/// Implementations must be side-effect free. Custom validators registered
/// on the loader run after the built-in chain, in registration order.
pub trait ClusterValidator {
    fn validate(&self, cfg: &ClusterConfig) -> Result<(), ConfigError>;
}

impl<F> ClusterValidator for F
where
    F: Fn(&ClusterConfig) -> Result<(), ConfigError>,
{
    fn validate(&self, cfg: &ClusterConfig) -> Result<(), ConfigError> {
        self(cfg)
    }
}

/// Runs the built-in validation chain in its fixed order.
pub fn run_builtin_validators(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    validate_structure(cfg)?;
    validate_metadata(cfg)?;
    validate_providers(cfg)?;
    validate_nodes(cfg)?;
    validate_distribution(cfg)?;
    Ok(())
}

/// Field-level constraints declared on the model (lengths, ranges).
fn validate_structure(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    cfg.validate().map_err(|e| {
        // Report the first offending field only, matching the chain's
        // first-error-wins contract.
        let reason = first_field_error("", &e)
            .unwrap_or_else(|| "structural validation failed".to_string());
        ConfigError::validation(reason)
    })
}

/// Descends into nested validation errors and returns the first
/// `path: message` pair found.
fn first_field_error(prefix: &str, errors: &validator::ValidationErrors) -> Option<String> {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    return Some(format!("field {path}: {err}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(found) = first_field_error(&path, nested) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let item_path = format!("{path}[{index}]");
                    if let Some(found) = first_field_error(&item_path, nested) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

fn validate_metadata(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    if cfg.metadata.name.is_empty() {
        return Err(ConfigError::validation("cluster name is required"));
    }
    Ok(())
}

fn validate_providers(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    if !cfg.providers.any_enabled() {
        return Err(ConfigError::validation(
            "at least one cloud provider must be enabled",
        ));
    }

    if let Some(provider) = &cfg.providers.digitalocean {
        if provider.enabled && provider.token.is_empty() {
            return Err(ConfigError::validation(
                "digitalocean token is required when provider is enabled",
            ));
        }
    }
    if let Some(provider) = &cfg.providers.linode {
        if provider.enabled && provider.token.is_empty() {
            return Err(ConfigError::validation(
                "linode token is required when provider is enabled",
            ));
        }
    }

    Ok(())
}

fn validate_nodes(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    if cfg.nodes.is_empty() && cfg.node_pools.is_empty() {
        return Err(ConfigError::validation(
            "at least one node or node pool must be configured",
        ));
    }

    let masters = master_count(cfg);
    if masters == 0 {
        return Err(ConfigError::validation(
            "at least one control plane (master) node is required",
        ));
    }
    if masters % 2 == 0 {
        return Err(ConfigError::validation(format!(
            "master count must be odd for HA etcd quorum (got {masters})"
        )));
    }

    if worker_count(cfg) == 0 {
        return Err(ConfigError::validation("at least one worker node is required"));
    }

    Ok(())
}

fn validate_distribution(cfg: &ClusterConfig) -> Result<(), ConfigError> {
    match cfg.kubernetes.distribution.as_str() {
        "rke2" | "k3s" => Ok(()),
        other => Err(ConfigError::validation(format!(
            "only rke2 and k3s distributions are supported (got {other})"
        ))),
    }
}

fn has_role(roles: &[String], role: &str) -> bool {
    roles.iter().any(|r| r == role)
}

/// `master` and `controlplane` are synonyms; a role list carrying both
/// still describes one control-plane node.
fn is_control_plane(roles: &[String]) -> bool {
    has_role(roles, "master") || has_role(roles, "controlplane")
}

fn pool_masters(pool: &NodePool) -> u32 {
    if is_control_plane(&pool.roles) { pool.count } else { 0 }
}

fn pool_workers(pool: &NodePool) -> u32 {
    if has_role(&pool.roles, "worker") { pool.count } else { 0 }
}

/// Total control-plane node count across flat nodes and pools; this is
/// the figure the odd-parity rule applies to.
fn master_count(cfg: &ClusterConfig) -> u32 {
    let from_pools: u32 = cfg.node_pools.values().map(pool_masters).sum();
    let from_nodes = cfg.nodes.iter().filter(|n| is_control_plane(&n.roles)).count() as u32;
    from_pools + from_nodes
}

fn worker_count(cfg: &ClusterConfig) -> u32 {
    let from_pools: u32 = cfg.node_pools.values().map(pool_workers).sum();
    let from_nodes = cfg
        .nodes
        .iter()
        .filter(|n| has_role(&n.roles, "worker"))
        .count() as u32;
    from_pools + from_nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterConfig, DigitalOceanProvider, NodeConfig, NodePool};

    fn valid_config() -> ClusterConfig {
        let mut cfg = ClusterConfig::example();
        crate::defaults::apply_defaults(&mut cfg);
        cfg
    }

    fn set_master_count(cfg: &mut ClusterConfig, count: u32) {
        cfg.node_pools.retain(|_, pool| !pool.roles.iter().any(|r| r == "master"));
        cfg.node_pools.insert(
            "masters".to_string(),
            NodePool {
                count,
                roles: vec!["master".to_string()],
                ..NodePool::default()
            },
        );
    }

    #[test]
    fn test_valid_config_passes() {
        run_builtin_validators(&valid_config()).unwrap();
    }

    #[test]
    fn test_missing_name_is_first_error() {
        let mut cfg = valid_config();
        cfg.metadata.name.clear();
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("cluster name is required"));
    }

    #[test]
    fn test_no_provider_enabled() {
        let mut cfg = valid_config();
        cfg.providers.digitalocean = None;
        cfg.providers.linode = None;
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("at least one cloud provider"));
    }

    #[test]
    fn test_enabled_provider_without_token() {
        let mut cfg = valid_config();
        cfg.providers.digitalocean = Some(DigitalOceanProvider {
            enabled: true,
            ..DigitalOceanProvider::default()
        });
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("digitalocean token is required"));
    }

    #[test]
    fn test_no_nodes_at_all() {
        let mut cfg = valid_config();
        cfg.nodes.clear();
        cfg.node_pools.clear();
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("at least one node or node pool"));
    }

    #[test]
    fn test_even_master_count_fails() {
        let mut cfg = valid_config();
        set_master_count(&mut cfg, 2);
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("odd"));
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn test_odd_master_counts_pass() {
        for count in [1, 3, 5] {
            let mut cfg = valid_config();
            set_master_count(&mut cfg, count);
            run_builtin_validators(&cfg).unwrap();
        }
    }

    #[test]
    fn test_controlplane_role_is_accepted_as_master() {
        let mut cfg = valid_config();
        cfg.node_pools.clear();
        cfg.node_pools.insert(
            "cp".to_string(),
            NodePool {
                count: 3,
                roles: vec!["controlplane".to_string()],
                ..NodePool::default()
            },
        );
        cfg.node_pools.insert(
            "workers".to_string(),
            NodePool {
                count: 2,
                roles: vec!["worker".to_string()],
                ..NodePool::default()
            },
        );
        run_builtin_validators(&cfg).unwrap();
    }

    #[test]
    fn test_controlplane_role_is_subject_to_parity() {
        let mut cfg = valid_config();
        set_master_count(&mut cfg, 1);
        // One master pool plus one controlplane pool of 1: 2 total, even.
        cfg.node_pools.insert(
            "cp".to_string(),
            NodePool {
                count: 1,
                roles: vec!["controlplane".to_string()],
                ..NodePool::default()
            },
        );
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("odd"));
    }

    #[test]
    fn test_both_roles_on_one_pool_count_once() {
        let mut cfg = valid_config();
        cfg.node_pools.retain(|_, pool| !pool.roles.iter().any(|r| r == "master"));
        cfg.node_pools.insert(
            "cp".to_string(),
            NodePool {
                count: 3,
                roles: vec!["master".to_string(), "controlplane".to_string()],
                ..NodePool::default()
            },
        );
        run_builtin_validators(&cfg).unwrap();
    }

    #[test]
    fn test_masters_counted_across_pools_and_nodes() {
        let mut cfg = valid_config();
        // One master pool of 2 plus one flat master node: 3 total, odd.
        set_master_count(&mut cfg, 2);
        cfg.nodes.push(NodeConfig {
            name: "extra-master".to_string(),
            roles: vec!["master".to_string()],
            ..NodeConfig::default()
        });
        run_builtin_validators(&cfg).unwrap();
    }

    #[test]
    fn test_no_workers_fails() {
        let mut cfg = valid_config();
        cfg.node_pools.retain(|_, pool| pool.roles.iter().any(|r| r == "master"));
        cfg.nodes.clear();
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("worker"));
    }

    #[test]
    fn test_unsupported_distribution() {
        let mut cfg = valid_config();
        cfg.kubernetes.distribution = "openshift".to_string();
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(err.to_string().contains("rke2 and k3s"));
    }

    #[test]
    fn test_structural_limits_run_first() {
        let mut cfg = valid_config();
        cfg.metadata.environment = "e".repeat(64);
        let err = run_builtin_validators(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn test_closure_validator() {
        let validator = |cfg: &ClusterConfig| -> Result<(), ConfigError> {
            if cfg.metadata.team.is_empty() {
                return Err(ConfigError::validation("team is required"));
            }
            Ok(())
        };

        let mut cfg = valid_config();
        cfg.metadata.team.clear();
        let err = validator.validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("team is required"));

        cfg.metadata.team = "platform".to_string();
        validator.validate(&cfg).unwrap();
    }
}
