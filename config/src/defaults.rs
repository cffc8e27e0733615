//! # Default Cascade
//!
//! Fills every omitted field with its documented default. The rule is
//! fill-if-zero: a field equal to its type's zero value receives the
//! default, a non-zero value is never overwritten. Two cascades are
//! conditional:
//!
//! - WireGuard numeric/list defaults apply only when the block is present
//!   and enabled;
//! - RKE2 defaults are synthesized (or field-wise merged) only when the
//!   distribution is rke2, and therefore run after the distribution itself
//!   has been defaulted.
//!
//! Known looseness, kept on purpose: an explicitly configured zero value
//! (e.g. `snapshotRetention: 0`) is indistinguishable from an omitted field
//! and will be replaced by the default.

use crate::model::{ClusterConfig, Rke2Config};
use std::collections::BTreeMap;

pub const DEFAULT_CLUSTER_NAME: &str = "kubernetes-cluster";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_METADATA_VERSION: &str = "1.0.0";
pub const DEFAULT_CLUSTER_TYPE: &str = "rke";
pub const DEFAULT_NETWORK_MODE: &str = "vpc";
pub const DEFAULT_NETWORK_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_DISTRIBUTION: &str = "rke2";
pub const DEFAULT_KUBERNETES_VERSION: &str = "v1.28.5+rke2r1";
pub const DEFAULT_NETWORK_PLUGIN: &str = "calico";
pub const DEFAULT_POD_CIDR: &str = "10.42.0.0/16";
pub const DEFAULT_SERVICE_CIDR: &str = "10.43.0.0/16";
pub const DEFAULT_CLUSTER_DNS: &str = "10.43.0.10";
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";
pub const DEFAULT_SSH_PORT: u16 = 22;

pub const DEFAULT_WIREGUARD_PORT: u16 = 51820;
pub const DEFAULT_WIREGUARD_MTU: u16 = 1420;
pub const DEFAULT_WIREGUARD_KEEPALIVE: u16 = 25;
pub const DEFAULT_WIREGUARD_CLIENT_IP_BASE: &str = "10.100.0.0/24";

pub const DEFAULT_RKE2_DATA_DIR: &str = "/var/lib/rancher/rke2";

fn set_if_empty(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

/// Applies the full default cascade to a parsed configuration.
pub fn apply_defaults(cfg: &mut ClusterConfig) {
    // Metadata
    set_if_empty(&mut cfg.metadata.name, DEFAULT_CLUSTER_NAME);
    set_if_empty(&mut cfg.metadata.environment, DEFAULT_ENVIRONMENT);
    set_if_empty(&mut cfg.metadata.version, DEFAULT_METADATA_VERSION);

    // Cluster shape
    set_if_empty(&mut cfg.cluster.cluster_type, DEFAULT_CLUSTER_TYPE);
    set_if_empty(&mut cfg.cluster.version, DEFAULT_KUBERNETES_VERSION);

    // Network addressing
    set_if_empty(&mut cfg.network.mode, DEFAULT_NETWORK_MODE);
    set_if_empty(&mut cfg.network.cidr, DEFAULT_NETWORK_CIDR);

    // Kubernetes; the distribution must be settled before the RKE2 cascade.
    set_if_empty(&mut cfg.kubernetes.distribution, DEFAULT_DISTRIBUTION);
    set_if_empty(&mut cfg.kubernetes.version, DEFAULT_KUBERNETES_VERSION);
    set_if_empty(&mut cfg.kubernetes.network_plugin, DEFAULT_NETWORK_PLUGIN);
    set_if_empty(&mut cfg.kubernetes.pod_cidr, DEFAULT_POD_CIDR);
    set_if_empty(&mut cfg.kubernetes.service_cidr, DEFAULT_SERVICE_CIDR);
    set_if_empty(&mut cfg.kubernetes.cluster_dns, DEFAULT_CLUSTER_DNS);
    set_if_empty(&mut cfg.kubernetes.cluster_domain, DEFAULT_CLUSTER_DOMAIN);

    apply_rke2_defaults(cfg);

    // Security
    if cfg.security.ssh.port == 0 {
        cfg.security.ssh.port = DEFAULT_SSH_PORT;
    }

    apply_wireguard_defaults(cfg);
}

/// Both paths pin `version` to the Kubernetes version when unset, so a
/// synthesized block and a merged block produce the same install command
/// and re-running the cascade is a no-op.
fn apply_rke2_defaults(cfg: &mut ClusterConfig) {
    if cfg.kubernetes.distribution == "rke2" && cfg.kubernetes.rke2.is_none() {
        let mut defaults = Rke2Config::defaults();
        defaults.version = cfg.kubernetes.version.clone();
        cfg.kubernetes.rke2 = Some(defaults);
    } else if let Some(rke2) = cfg.kubernetes.rke2.take() {
        cfg.kubernetes.rke2 = Some(merge_rke2_with_defaults(rke2, &cfg.kubernetes.version));
    }
}

fn apply_wireguard_defaults(cfg: &mut ClusterConfig) {
    let Some(wireguard) = cfg.network.wireguard.as_mut() else {
        return;
    };
    if !wireguard.enabled {
        return;
    }

    set_if_empty(&mut wireguard.client_ip_base, DEFAULT_WIREGUARD_CLIENT_IP_BASE);
    if wireguard.port == 0 {
        wireguard.port = DEFAULT_WIREGUARD_PORT;
    }
    if wireguard.mtu == 0 {
        wireguard.mtu = DEFAULT_WIREGUARD_MTU;
    }
    if wireguard.persistent_keepalive == 0 {
        wireguard.persistent_keepalive = DEFAULT_WIREGUARD_KEEPALIVE;
    }
    if wireguard.dns.is_empty() {
        wireguard.dns = vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()];
    }
    if wireguard.allowed_ips.is_empty() {
        wireguard.allowed_ips = vec!["10.0.0.0/8".to_string(), "172.16.0.0/12".to_string()];
    }
}

impl Rke2Config {
    /// The canonical RKE2 default set.
    pub fn defaults() -> Self {
        Self {
            version: String::new(), // empty means latest from channel
            channel: "stable".to_string(),
            cluster_token: "generated-cluster-token".to_string(),
            tls_san: Vec::new(),
            disable_components: vec!["rke2-ingress-nginx".to_string()],
            data_dir: DEFAULT_RKE2_DATA_DIR.to_string(),
            node_taint: Vec::new(),
            node_label: Vec::new(),
            snapshot_schedule_cron: "0 */12 * * *".to_string(),
            snapshot_retention: 5,
            system_default_registry: String::new(),
            profiles: Vec::new(),
            selinux: false,
            secrets_encryption: false,
            write_kubeconfig_mode: "0600".to_string(),
            protect_kernel_defaults: false,
            extra_server_args: BTreeMap::new(),
            extra_agent_args: BTreeMap::new(),
        }
    }
}

/// Field-wise merge of a user-supplied RKE2 block over the default set:
/// supplied values win, everything else falls back to the defaults. An
/// unset version falls back to the Kubernetes version.
pub fn merge_rke2_with_defaults(user: Rke2Config, kubernetes_version: &str) -> Rke2Config {
    let mut merged = Rke2Config::defaults();

    if !user.version.is_empty() {
        merged.version = user.version;
    } else if !kubernetes_version.is_empty() {
        merged.version = kubernetes_version.to_string();
    }
    if !user.channel.is_empty() {
        merged.channel = user.channel;
    }
    if !user.cluster_token.is_empty() {
        merged.cluster_token = user.cluster_token;
    }
    if !user.tls_san.is_empty() {
        merged.tls_san = user.tls_san;
    }
    if !user.disable_components.is_empty() {
        merged.disable_components = user.disable_components;
    }
    if !user.data_dir.is_empty() {
        merged.data_dir = user.data_dir;
    }
    if !user.node_taint.is_empty() {
        merged.node_taint = user.node_taint;
    }
    if !user.node_label.is_empty() {
        merged.node_label = user.node_label;
    }
    if !user.snapshot_schedule_cron.is_empty() {
        merged.snapshot_schedule_cron = user.snapshot_schedule_cron;
    }
    if user.snapshot_retention > 0 {
        merged.snapshot_retention = user.snapshot_retention;
    }
    if !user.system_default_registry.is_empty() {
        merged.system_default_registry = user.system_default_registry;
    }
    if !user.profiles.is_empty() {
        merged.profiles = user.profiles;
    }
    if user.selinux {
        merged.selinux = true;
    }
    if user.secrets_encryption {
        merged.secrets_encryption = true;
    }
    if !user.write_kubeconfig_mode.is_empty() {
        merged.write_kubeconfig_mode = user.write_kubeconfig_mode;
    }
    if user.protect_kernel_defaults {
        merged.protect_kernel_defaults = true;
    }
    if !user.extra_server_args.is_empty() {
        merged.extra_server_args = user.extra_server_args;
    }
    if !user.extra_agent_args.is_empty() {
        merged.extra_agent_args = user.extra_agent_args;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WireGuardConfig;

    #[test]
    fn test_fill_if_zero_does_not_overwrite() {
        let mut cfg = ClusterConfig::default();
        cfg.metadata.name = "my-cluster".to_string();
        cfg.kubernetes.distribution = "k3s".to_string();

        apply_defaults(&mut cfg);

        assert_eq!(cfg.metadata.name, "my-cluster");
        assert_eq!(cfg.kubernetes.distribution, "k3s");
        assert_eq!(cfg.metadata.environment, DEFAULT_ENVIRONMENT);
        assert_eq!(cfg.network.cidr, DEFAULT_NETWORK_CIDR);
        assert_eq!(cfg.security.ssh.port, DEFAULT_SSH_PORT);
    }

    #[test]
    fn test_rke2_block_synthesized_for_rke2_distribution() {
        let mut cfg = ClusterConfig::default();
        apply_defaults(&mut cfg);

        // Distribution defaulted to rke2, so an RKE2 block must exist.
        assert_eq!(cfg.kubernetes.distribution, "rke2");
        let rke2 = cfg.kubernetes.rke2.as_ref().unwrap();
        assert_eq!(rke2.channel, "stable");
        assert_eq!(rke2.snapshot_retention, 5);
        assert_eq!(rke2.version, DEFAULT_KUBERNETES_VERSION);
    }

    #[test]
    fn test_rke2_block_not_synthesized_for_k3s() {
        let mut cfg = ClusterConfig::default();
        cfg.kubernetes.distribution = "k3s".to_string();
        apply_defaults(&mut cfg);
        assert!(cfg.kubernetes.rke2.is_none());
    }

    #[test]
    fn test_supplied_rke2_block_is_merged_field_wise() {
        let mut cfg = ClusterConfig::default();
        cfg.kubernetes.rke2 = Some(Rke2Config {
            cluster_token: "user-token".to_string(),
            snapshot_retention: 9,
            ..Rke2Config::default()
        });

        apply_defaults(&mut cfg);

        let rke2 = cfg.kubernetes.rke2.as_ref().unwrap();
        assert_eq!(rke2.cluster_token, "user-token");
        assert_eq!(rke2.snapshot_retention, 9);
        // Unsupplied fields fall back to the default set.
        assert_eq!(rke2.channel, "stable");
        assert_eq!(rke2.disable_components, vec!["rke2-ingress-nginx"]);
        assert_eq!(rke2.data_dir, DEFAULT_RKE2_DATA_DIR);
    }

    #[test]
    fn test_rke2_version_falls_back_to_kubernetes_version() {
        let mut cfg = ClusterConfig::default();
        cfg.kubernetes.version = "v1.29.0+rke2r1".to_string();
        cfg.kubernetes.rke2 = Some(Rke2Config::default());

        apply_defaults(&mut cfg);

        assert_eq!(
            cfg.kubernetes.rke2.as_ref().unwrap().version,
            "v1.29.0+rke2r1"
        );
    }

    #[test]
    fn test_wireguard_defaults_when_enabled() {
        let mut cfg = ClusterConfig::default();
        cfg.network.wireguard = Some(WireGuardConfig {
            enabled: true,
            ..WireGuardConfig::default()
        });

        apply_defaults(&mut cfg);

        let wg = cfg.network.wireguard.as_ref().unwrap();
        assert_eq!(wg.port, 51820);
        assert_eq!(wg.mtu, 1420);
        assert_eq!(wg.persistent_keepalive, 25);
        assert_eq!(wg.client_ip_base, DEFAULT_WIREGUARD_CLIENT_IP_BASE);
        assert_eq!(wg.dns.len(), 2);
        assert_eq!(wg.allowed_ips, vec!["10.0.0.0/8", "172.16.0.0/12"]);
    }

    #[test]
    fn test_wireguard_defaults_skipped_when_disabled() {
        let mut cfg = ClusterConfig::default();
        cfg.network.wireguard = Some(WireGuardConfig::default());

        apply_defaults(&mut cfg);

        let wg = cfg.network.wireguard.as_ref().unwrap();
        assert_eq!(wg.port, 0);
        assert_eq!(wg.mtu, 0);
        assert!(wg.dns.is_empty());
    }

    #[test]
    fn test_wireguard_supplied_values_survive() {
        let mut cfg = ClusterConfig::default();
        cfg.network.wireguard = Some(WireGuardConfig {
            enabled: true,
            port: 51821,
            mtu: 1380,
            ..WireGuardConfig::default()
        });

        apply_defaults(&mut cfg);

        let wg = cfg.network.wireguard.as_ref().unwrap();
        assert_eq!(wg.port, 51821);
        assert_eq!(wg.mtu, 1380);
        assert_eq!(wg.persistent_keepalive, 25);
    }

    #[test]
    fn test_defaults_are_idempotent() {
        let mut once = ClusterConfig::default();
        apply_defaults(&mut once);
        let mut twice = once.clone();
        apply_defaults(&mut twice);
        assert_eq!(once, twice);
    }
}
