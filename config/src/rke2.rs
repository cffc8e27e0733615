//! # RKE2 Bootstrap Rendering
//!
//! Renders the per-node `/etc/rancher/rke2/config.yaml` documents and the
//! matching install command from a defaulted [`Rke2Config`]. Server and
//! agent renderings differ: only servers carry cluster-level settings
//! (CIDRs, CNI, etcd snapshots), and only the first server omits the
//! `server:` join directive.

use crate::defaults::DEFAULT_RKE2_DATA_DIR;
use crate::model::{KubernetesConfig, Rke2Config};

/// Supervisor port servers join through.
const RKE2_SUPERVISOR_PORT: u16 = 9345;

fn push_scalar(out: &mut String, key: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{key}: {value}\n"));
    }
}

fn push_quoted(out: &mut String, key: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(&format!("{key}: \"{value}\"\n"));
    }
}

fn push_list(out: &mut String, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    out.push_str(&format!("{key}:\n"));
    for value in values {
        out.push_str(&format!("  - {value}\n"));
    }
}

/// Renders the config.yaml for a server (control plane) node.
pub fn build_server_config(
    cfg: &Rke2Config,
    node_ip: &str,
    node_name: &str,
    is_first_master: bool,
    first_master_ip: &str,
    kubernetes: &KubernetesConfig,
) -> String {
    let mut out = String::new();

    push_quoted(&mut out, "token", &cfg.cluster_token);
    if !is_first_master {
        out.push_str(&format!(
            "server: https://{first_master_ip}:{RKE2_SUPERVISOR_PORT}\n"
        ));
    }

    push_list(&mut out, "tls-san", &cfg.tls_san);

    push_scalar(&mut out, "cluster-cidr", &kubernetes.pod_cidr);
    push_scalar(&mut out, "service-cidr", &kubernetes.service_cidr);
    push_scalar(&mut out, "cluster-dns", &kubernetes.cluster_dns);
    push_scalar(&mut out, "cluster-domain", &kubernetes.cluster_domain);

    // RKE2 takes cni as a list even when a single plugin is configured.
    if !kubernetes.network_plugin.is_empty() {
        push_list(&mut out, "cni", std::slice::from_ref(&kubernetes.network_plugin));
    }

    push_list(&mut out, "disable", &cfg.disable_components);

    push_scalar(&mut out, "node-name", node_name);
    push_scalar(&mut out, "node-ip", node_ip);
    push_scalar(&mut out, "bind-address", node_ip);
    push_list(&mut out, "node-taint", &cfg.node_taint);
    push_list(&mut out, "node-label", &cfg.node_label);

    if cfg.data_dir != DEFAULT_RKE2_DATA_DIR {
        push_scalar(&mut out, "data-dir", &cfg.data_dir);
    }

    // etcd snapshots are scheduled from the first server only.
    if is_first_master {
        push_quoted(&mut out, "etcd-snapshot-schedule-cron", &cfg.snapshot_schedule_cron);
        if cfg.snapshot_retention > 0 {
            out.push_str(&format!(
                "etcd-snapshot-retention: {}\n",
                cfg.snapshot_retention
            ));
        }
    }

    if cfg.selinux {
        out.push_str("selinux: true\n");
    }
    if cfg.secrets_encryption {
        out.push_str("secrets-encryption: true\n");
    }
    if cfg.protect_kernel_defaults {
        out.push_str("protect-kernel-defaults: true\n");
    }
    push_quoted(&mut out, "write-kubeconfig-mode", &cfg.write_kubeconfig_mode);
    push_scalar(&mut out, "system-default-registry", &cfg.system_default_registry);
    push_list(&mut out, "profile", &cfg.profiles);

    for (arg, value) in &cfg.extra_server_args {
        push_scalar(&mut out, arg, value);
    }

    out
}

/// Renders the config.yaml for an agent (worker) node.
pub fn build_agent_config(
    cfg: &Rke2Config,
    node_ip: &str,
    node_name: &str,
    server_ip: &str,
) -> String {
    let mut out = String::new();

    push_quoted(&mut out, "token", &cfg.cluster_token);
    out.push_str(&format!(
        "server: https://{server_ip}:{RKE2_SUPERVISOR_PORT}\n"
    ));

    push_scalar(&mut out, "node-name", node_name);
    push_scalar(&mut out, "node-ip", node_ip);
    push_list(&mut out, "node-taint", &cfg.node_taint);
    push_list(&mut out, "node-label", &cfg.node_label);

    if cfg.data_dir != DEFAULT_RKE2_DATA_DIR {
        push_scalar(&mut out, "data-dir", &cfg.data_dir);
    }
    if cfg.selinux {
        out.push_str("selinux: true\n");
    }
    if cfg.protect_kernel_defaults {
        out.push_str("protect-kernel-defaults: true\n");
    }
    push_scalar(&mut out, "system-default-registry", &cfg.system_default_registry);
    push_list(&mut out, "profile", &cfg.profiles);

    for (arg, value) in &cfg.extra_agent_args {
        push_scalar(&mut out, arg, value);
    }

    out
}

/// The install command for a node. A pinned `version` takes priority over
/// the release `channel`.
pub fn install_command(cfg: &Rke2Config, is_server: bool) -> String {
    let install_type = if is_server { "server" } else { "agent" };
    let selector = if cfg.version.is_empty() {
        format!("INSTALL_RKE2_CHANNEL={}", cfg.channel)
    } else {
        format!("INSTALL_RKE2_VERSION={}", cfg.version)
    };
    format!("curl -sfL https://get.rke2.io | INSTALL_RKE2_TYPE={install_type} {selector} sh -")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_defaults;
    use crate::model::ClusterConfig;

    fn defaulted() -> (Rke2Config, KubernetesConfig) {
        let mut cfg = ClusterConfig::example();
        apply_defaults(&mut cfg);
        let rke2 = cfg.kubernetes.rke2.clone().unwrap();
        (rke2, cfg.kubernetes)
    }

    #[test]
    fn test_first_server_has_no_join_directive() {
        let (rke2, k8s) = defaulted();
        let out = build_server_config(&rke2, "10.0.0.1", "master-1", true, "", &k8s);

        assert!(!out.contains("server:"));
        assert!(out.contains("token: \"your-secure-cluster-token\""));
        assert!(out.contains("cluster-cidr: 10.42.0.0/16"));
        assert!(out.contains("cni:\n  - calico\n"));
        assert!(out.contains("etcd-snapshot-schedule-cron: \"0 */12 * * *\""));
        assert!(out.contains("etcd-snapshot-retention: 5"));
    }

    #[test]
    fn test_joining_server_points_at_first_master() {
        let (rke2, k8s) = defaulted();
        let out = build_server_config(&rke2, "10.0.0.2", "master-2", false, "10.0.0.1", &k8s);

        assert!(out.contains("server: https://10.0.0.1:9345"));
        assert!(!out.contains("etcd-snapshot"));
    }

    #[test]
    fn test_agent_config_is_minimal() {
        let (rke2, _) = defaulted();
        let out = build_agent_config(&rke2, "10.0.0.5", "worker-1", "10.0.0.1");

        assert!(out.contains("server: https://10.0.0.1:9345"));
        assert!(out.contains("node-name: worker-1"));
        assert!(!out.contains("cluster-cidr"));
        assert!(!out.contains("cni:"));
    }

    #[test]
    fn test_agent_carries_registry_and_profiles() {
        let (mut rke2, _) = defaulted();
        rke2.system_default_registry = "registry.internal:5000".to_string();
        rke2.profiles = vec!["cis-1.23".to_string()];

        let out = build_agent_config(&rke2, "10.0.0.5", "worker-1", "10.0.0.1");
        assert!(out.contains("system-default-registry: registry.internal:5000"));
        assert!(out.contains("profile:\n  - cis-1.23\n"));
    }

    #[test]
    fn test_default_data_dir_is_omitted() {
        let (mut rke2, k8s) = defaulted();
        let out = build_server_config(&rke2, "10.0.0.1", "m", true, "", &k8s);
        assert!(!out.contains("data-dir"));

        rke2.data_dir = "/data/rke2".to_string();
        let out = build_server_config(&rke2, "10.0.0.1", "m", true, "", &k8s);
        assert!(out.contains("data-dir: /data/rke2"));
    }

    #[test]
    fn test_install_command_prefers_pinned_version() {
        let (mut rke2, _) = defaulted();
        rke2.version = "v1.28.5+rke2r1".to_string();
        assert_eq!(
            install_command(&rke2, true),
            "curl -sfL https://get.rke2.io | INSTALL_RKE2_TYPE=server INSTALL_RKE2_VERSION=v1.28.5+rke2r1 sh -"
        );

        rke2.version.clear();
        rke2.channel = "stable".to_string();
        assert_eq!(
            install_command(&rke2, false),
            "curl -sfL https://get.rke2.io | INSTALL_RKE2_TYPE=agent INSTALL_RKE2_CHANNEL=stable sh -"
        );
    }

    #[test]
    fn test_extra_args_are_rendered() {
        let (mut rke2, k8s) = defaulted();
        rke2.extra_server_args
            .insert("kube-apiserver-arg".to_string(), "audit-log-maxage=30".to_string());
        let out = build_server_config(&rke2, "10.0.0.1", "m", true, "", &k8s);
        assert!(out.contains("kube-apiserver-arg: audit-log-maxage=30"));
    }
}
