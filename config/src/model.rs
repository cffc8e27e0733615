//! # Canonical Configuration Model
//!
//! This module defines the canonical in-memory representation of a cluster
//! configuration, shared by every pipeline stage.
//!
//! All structures:
//! - Use `serde` for serialization/deserialization (camelCase wire format)
//! - Use `validator` for structural field constraints
//! - Default to their zero values; real defaults are applied by the
//!   [`crate::defaults`] cascade so that "configured" stays distinguishable
//!   from "defaulted"
//!
//! Optional sub-blocks are `Option<T>` and are skipped entirely when absent,
//! which keeps YAML/JSON round-trips lossless.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Complete cluster configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Root aggregate owning every configuration block. A `ClusterConfig` is born
/// from exactly one parse operation, threaded by mutable reference through
/// expansion, overrides, defaulting and validation, and handed to the caller
/// once fully validated.
///
/// ## Usage
/// ```rust,no_run
/// use config::Loader;
///
/// fn main() -> Result<(), errors::ConfigError> {
///     let mut loader = Loader::new("cluster.yaml");
///     let config = loader.load()?;
///     println!("cluster: {}", config.metadata.name);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    #[validate(nested)]
    pub metadata: Metadata,

    pub cluster: ClusterSpec,

    pub providers: ProvidersConfig,

    #[validate(nested)]
    pub network: NetworkConfig,

    pub security: SecurityConfig,

    /// Flat node inventory; parallel to `node_pools`.
    pub nodes: Vec<NodeConfig>,

    /// Pooled node inventory, keyed by pool name.
    pub node_pools: BTreeMap<String, NodePool>,

    pub kubernetes: KubernetesConfig,

    pub monitoring: MonitoringConfig,

    pub storage: StorageConfig,

    pub addons: AddonsConfig,
}

/// Cluster metadata: identity, environment and free-form labels.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    /// Cluster name; must be non-empty after defaulting.
    #[validate(length(max = 253))]
    pub name: String,

    #[validate(length(max = 63))]
    pub environment: String,

    pub version: String,
    pub description: String,
    pub owner: String,
    pub team: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// High-level cluster shape, independent of the Kubernetes distribution.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSpec {
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub version: String,
    pub high_availability: bool,
    pub multi_cloud: bool,
}

/// Cloud provider blocks. At most one instance per provider; each is
/// independently enableable. Absent blocks stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digitalocean: Option<DigitalOceanProvider>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linode: Option<LinodeProvider>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsProvider>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureProvider>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpProvider>,
}

impl ProvidersConfig {
    /// True when at least one provider block is present and enabled.
    pub fn any_enabled(&self) -> bool {
        self.digitalocean.as_ref().is_some_and(|p| p.enabled)
            || self.linode.as_ref().is_some_and(|p| p.enabled)
            || self.aws.as_ref().is_some_and(|p| p.enabled)
            || self.azure.as_ref().is_some_and(|p| p.enabled)
            || self.gcp.as_ref().is_some_and(|p| p.enabled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DigitalOceanProvider {
    pub enabled: bool,
    pub token: String,
    pub region: String,
    pub ssh_keys: Vec<String>,
    pub tags: Vec<String>,
    pub monitoring: bool,
    pub ipv6: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LinodeProvider {
    pub enabled: bool,
    pub token: String,
    pub region: String,
    pub root_password: String,
    pub authorized_keys: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsProvider {
    pub enabled: bool,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub key_pair: String,
    pub iam_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureProvider {
    pub enabled: bool,
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource_group: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GcpProvider {
    pub enabled: bool,
    pub project_id: String,
    pub credentials: String,
    pub region: String,
    pub zone: String,
}

/// Cluster networking: addressing plus the optional WireGuard VPN block.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkConfig {
    /// Networking mode: vpc, wireguard or hybrid.
    pub mode: String,
    pub cidr: String,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub dns_servers: Vec<String>,
    pub dns: DnsConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub wireguard: Option<WireGuardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DnsConfig {
    pub domain: String,
    pub servers: Vec<String>,
    pub provider: String,
}

/// WireGuard VPN configuration.
///
/// Numeric and list defaults (port, MTU, keepalive, DNS, allowed ranges)
/// cascade only when `enabled` is true; a disabled block is left as parsed.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGuardConfig {
    pub enabled: bool,

    /// Auto-create the WireGuard server instead of joining an existing one.
    pub create: bool,
    pub provider: String,
    pub region: String,

    pub server_endpoint: String,
    pub server_public_key: String,
    pub client_ip_base: String,
    pub port: u16,
    pub allowed_ips: Vec<String>,
    pub dns: Vec<String>,

    #[validate(range(max = 9200))]
    pub mtu: u16,

    pub persistent_keepalive: u16,
    pub peers: Vec<WireGuardPeer>,
    pub subnet_cidr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGuardPeer {
    pub name: String,
    pub public_key: String,
    pub allowed_ips: Vec<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub ssh: SshAccessConfig,
    pub network_policies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SshAccessConfig {
    pub key_path: String,
    pub public_key_path: String,
    pub authorized_keys: Vec<String>,
    pub allow_password_auth: bool,
    pub port: u16,
}

/// A single, individually addressed compute node.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    pub name: String,
    pub provider: String,
    pub pool: String,
    pub roles: Vec<String>,
    pub size: String,
    pub image: String,
    pub region: String,
    pub private_ip: String,
    pub public_ip: String,
    pub wireguard_ip: String,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<TaintConfig>,
}

/// A named, counted group of homogeneous nodes sharing provider, size and
/// role set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePool {
    pub name: String,
    pub provider: String,
    pub count: u32,
    pub min_count: u32,
    pub max_count: u32,
    pub roles: Vec<String>,
    pub size: String,
    pub image: String,
    pub region: String,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<TaintConfig>,
    pub auto_scaling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaintConfig {
    pub key: String,
    pub value: String,
    pub effect: String,
}

/// Kubernetes distribution settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesConfig {
    pub version: String,

    /// Distribution selector: rke2 or k3s.
    pub distribution: String,

    pub network_plugin: String,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub cluster_dns: String,
    pub cluster_domain: String,

    /// Present whenever `distribution` is rke2 after defaulting: either the
    /// supplied block merged over the default set, or the default set itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rke2: Option<Rke2Config>,
}

/// RKE2-specific configuration, consumed by the bootstrap renderer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Rke2Config {
    /// Pinned RKE2 version; empty means latest from `channel`.
    pub version: String,
    pub channel: String,
    pub cluster_token: String,
    pub tls_san: Vec<String>,
    pub disable_components: Vec<String>,
    pub data_dir: String,
    pub node_taint: Vec<String>,
    pub node_label: Vec<String>,
    pub snapshot_schedule_cron: String,
    pub snapshot_retention: u32,
    pub system_default_registry: String,
    pub profiles: Vec<String>,
    pub selinux: bool,
    pub secrets_encryption: bool,
    pub write_kubeconfig_mode: String,
    pub protect_kernel_defaults: bool,
    pub extra_server_args: BTreeMap<String, String>,
    pub extra_agent_args: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub default_class: String,
    pub classes: Vec<StorageClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageClass {
    pub name: String,
    pub provisioner: String,
    pub reclaim_policy: String,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AddonsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argocd: Option<ArgoCdConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArgoCdConfig {
    pub enabled: bool,
    pub version: String,
    pub gitops_repo_url: String,
    pub gitops_repo_branch: String,
    pub namespace: String,
}

impl ClusterConfig {
    /// Builds the documented multi-provider example configuration.
    ///
    /// Used by tests and by `init`-style tooling that wants a complete,
    /// valid starting point.
    pub fn example() -> Self {
        let mut node_pools = BTreeMap::new();
        node_pools.insert(
            "do-masters".to_string(),
            NodePool {
                name: "do-masters".to_string(),
                provider: "digitalocean".to_string(),
                count: 1,
                roles: vec!["master".to_string()],
                size: "s-2vcpu-4gb".to_string(),
                image: "ubuntu-22-04-x64".to_string(),
                region: "nyc3".to_string(),
                ..NodePool::default()
            },
        );
        node_pools.insert(
            "linode-masters".to_string(),
            NodePool {
                name: "linode-masters".to_string(),
                provider: "linode".to_string(),
                count: 2,
                roles: vec!["master".to_string()],
                size: "g6-standard-2".to_string(),
                image: "linode/ubuntu22.04".to_string(),
                region: "us-east".to_string(),
                ..NodePool::default()
            },
        );
        node_pools.insert(
            "do-workers".to_string(),
            NodePool {
                name: "do-workers".to_string(),
                provider: "digitalocean".to_string(),
                count: 2,
                roles: vec!["worker".to_string()],
                size: "s-2vcpu-4gb".to_string(),
                image: "ubuntu-22-04-x64".to_string(),
                region: "nyc3".to_string(),
                ..NodePool::default()
            },
        );

        Self {
            metadata: Metadata {
                name: "production-cluster".to_string(),
                environment: "production".to_string(),
                description: "Multi-cloud Kubernetes cluster".to_string(),
                owner: "devops-team".to_string(),
                labels: BTreeMap::from([("env".to_string(), "production".to_string())]),
                ..Metadata::default()
            },
            providers: ProvidersConfig {
                digitalocean: Some(DigitalOceanProvider {
                    enabled: true,
                    token: "YOUR_DO_TOKEN".to_string(),
                    region: "nyc3".to_string(),
                    tags: vec!["kubernetes".to_string(), "production".to_string()],
                    ..DigitalOceanProvider::default()
                }),
                linode: Some(LinodeProvider {
                    enabled: true,
                    token: "YOUR_LINODE_TOKEN".to_string(),
                    region: "us-east".to_string(),
                    root_password: "YOUR_SECURE_PASSWORD".to_string(),
                    tags: vec!["kubernetes".to_string(), "production".to_string()],
                    ..LinodeProvider::default()
                }),
                ..ProvidersConfig::default()
            },
            network: NetworkConfig {
                dns: DnsConfig {
                    domain: "example.com".to_string(),
                    provider: "digitalocean".to_string(),
                    ..DnsConfig::default()
                },
                wireguard: Some(WireGuardConfig {
                    enabled: true,
                    server_endpoint: "vpn.example.com:51820".to_string(),
                    server_public_key: "YOUR_WIREGUARD_PUBLIC_KEY".to_string(),
                    ..WireGuardConfig::default()
                }),
                ..NetworkConfig::default()
            },
            kubernetes: KubernetesConfig {
                distribution: "rke2".to_string(),
                version: "v1.28.5+rke2r1".to_string(),
                rke2: Some(Rke2Config {
                    channel: "stable".to_string(),
                    cluster_token: "your-secure-cluster-token".to_string(),
                    tls_san: vec!["api.example.com".to_string()],
                    disable_components: vec!["rke2-ingress-nginx".to_string()],
                    snapshot_schedule_cron: "0 */12 * * *".to_string(),
                    snapshot_retention: 5,
                    secrets_encryption: true,
                    write_kubeconfig_mode: "0600".to_string(),
                    ..Rke2Config::default()
                }),
                ..KubernetesConfig::default()
            },
            node_pools,
            ..Self::default()
        }
    }
}
