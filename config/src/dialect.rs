//! # Typed-Resource Dialect
//!
//! The Kubernetes-style configuration format: an `apiVersion`/`kind`
//! envelope with `metadata` and `spec` sections. Parsed into
//! [`ClusterManifest`] and converted into the canonical [`ClusterConfig`].
//!
//! The conversion is pure and total: every optional block present in the
//! manifest produces the corresponding canonical block; absent blocks stay
//! `None` so "was this configured at all" survives the mapping. Per-pool
//! taint and label lists convert element-wise without reordering.

use crate::model::{
    AwsProvider, AzureProvider, ClusterConfig, DigitalOceanProvider, DnsConfig, GcpProvider,
    KubernetesConfig, LinodeProvider, Metadata, NetworkConfig, NodePool, ProvidersConfig,
    Rke2Config, TaintConfig, WireGuardConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The apiVersion values this pipeline accepts, and nothing else.
pub const SUPPORTED_API_VERSIONS: [&str; 3] =
    ["cluster-forge.io/v1", "multicloud-k8s.io/v1", "v1"];

/// A typed-resource configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ManifestMetadata,
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestMetadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestSpec {
    pub providers: ProvidersSpec,
    pub network: NetworkSpec,
    pub kubernetes: KubernetesSpec,
    pub node_pools: Vec<NodePoolSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digitalocean: Option<DigitalOceanSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linode: Option<LinodeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DigitalOceanSpec {
    pub enabled: bool,
    pub token: String,
    pub region: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LinodeSpec {
    pub enabled: bool,
    pub token: String,
    pub region: String,
    pub root_password: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsSpec {
    pub enabled: bool,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub key_pair: String,
    pub iam_role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureSpec {
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
pub struct GcpSpec {
    pub enabled: bool,
    pub project_id: String,
    pub credentials: String,
    pub region: String,
    pub zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSpec {
    pub dns: DnsSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wireguard: Option<WireGuardSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DnsSpec {
    pub domain: String,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGuardSpec {
    pub enabled: bool,
    pub server_endpoint: String,
    pub server_public_key: String,
    pub client_ip_base: String,
    pub port: u16,
    pub mtu: u16,
    pub persistent_keepalive: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesSpec {
    pub distribution: String,
    pub version: String,
    pub network_plugin: String,
    #[serde(rename = "podCIDR")]
    pub pod_cidr: String,
    #[serde(rename = "serviceCIDR")]
    pub service_cidr: String,
    #[serde(rename = "clusterDNS")]
    pub cluster_dns: String,
    pub cluster_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rke2: Option<Rke2Spec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Rke2Spec {
    pub channel: String,
    pub cluster_token: String,
    pub tls_san: Vec<String>,
    pub disable_components: Vec<String>,
    pub snapshot_schedule_cron: String,
    pub snapshot_retention: u32,
    pub secrets_encryption: bool,
    pub write_kubeconfig_mode: String,
    pub extra_server_args: BTreeMap<String, String>,
    pub extra_agent_args: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePoolSpec {
    pub name: String,
    pub provider: String,
    pub count: u32,
    pub roles: Vec<String>,
    pub size: String,
    pub image: String,
    pub region: String,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<TaintSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaintSpec {
    pub key: String,
    pub value: String,
    pub effect: String,
}

impl From<ClusterManifest> for ClusterConfig {
    fn from(manifest: ClusterManifest) -> Self {
        let spec = manifest.spec;

        let mut cfg = ClusterConfig {
            metadata: Metadata {
                name: manifest.metadata.name,
                labels: manifest.metadata.labels,
                annotations: manifest.metadata.annotations,
                ..Metadata::default()
            },
            ..ClusterConfig::default()
        };

        cfg.providers = ProvidersConfig {
            digitalocean: spec.providers.digitalocean.map(|p| DigitalOceanProvider {
                enabled: p.enabled,
                token: p.token,
                region: p.region,
                tags: p.tags,
                ..DigitalOceanProvider::default()
            }),
            linode: spec.providers.linode.map(|p| LinodeProvider {
                enabled: p.enabled,
                token: p.token,
                region: p.region,
                root_password: p.root_password,
                tags: p.tags,
                ..LinodeProvider::default()
            }),
            aws: spec.providers.aws.map(|p| AwsProvider {
                enabled: p.enabled,
                access_key_id: p.access_key_id,
                secret_access_key: p.secret_access_key,
                region: p.region,
                key_pair: p.key_pair,
                iam_role: p.iam_role,
            }),
            azure: spec.providers.azure.map(|p| AzureProvider {
                enabled: p.enabled,
                subscription_id: p.subscription_id,
                tenant_id: p.tenant_id,
                client_id: p.client_id,
                client_secret: p.client_secret,
                resource_group: p.resource_group,
                location: p.location,
            }),
            gcp: spec.providers.gcp.map(|p| GcpProvider {
                enabled: p.enabled,
                project_id: p.project_id,
                credentials: p.credentials,
                region: p.region,
                zone: p.zone,
            }),
        };

        cfg.network = NetworkConfig {
            dns: DnsConfig {
                domain: spec.network.dns.domain,
                provider: spec.network.dns.provider,
                ..DnsConfig::default()
            },
            wireguard: spec.network.wireguard.map(|w| WireGuardConfig {
                enabled: w.enabled,
                server_endpoint: w.server_endpoint,
                server_public_key: w.server_public_key,
                client_ip_base: w.client_ip_base,
                port: w.port,
                mtu: w.mtu,
                persistent_keepalive: w.persistent_keepalive,
                ..WireGuardConfig::default()
            }),
            ..NetworkConfig::default()
        };

        cfg.kubernetes = KubernetesConfig {
            distribution: spec.kubernetes.distribution,
            version: spec.kubernetes.version,
            network_plugin: spec.kubernetes.network_plugin,
            pod_cidr: spec.kubernetes.pod_cidr,
            service_cidr: spec.kubernetes.service_cidr,
            cluster_dns: spec.kubernetes.cluster_dns,
            cluster_domain: spec.kubernetes.cluster_domain,
            rke2: spec.kubernetes.rke2.map(|r| Rke2Config {
                channel: r.channel,
                cluster_token: r.cluster_token,
                tls_san: r.tls_san,
                disable_components: r.disable_components,
                snapshot_schedule_cron: r.snapshot_schedule_cron,
                snapshot_retention: r.snapshot_retention,
                secrets_encryption: r.secrets_encryption,
                write_kubeconfig_mode: r.write_kubeconfig_mode,
                extra_server_args: r.extra_server_args,
                extra_agent_args: r.extra_agent_args,
                ..Rke2Config::default()
            }),
        };

        for pool in spec.node_pools {
            let taints = pool
                .taints
                .into_iter()
                .map(|t| TaintConfig {
                    key: t.key,
                    value: t.value,
                    effect: t.effect,
                })
                .collect();

            cfg.node_pools.insert(
                pool.name.clone(),
                NodePool {
                    name: pool.name,
                    provider: pool.provider,
                    count: pool.count,
                    roles: pool.roles,
                    size: pool.size,
                    image: pool.image,
                    region: pool.region,
                    labels: pool.labels,
                    taints,
                    ..NodePool::default()
                },
            );
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_yaml() -> &'static str {
        r#"
apiVersion: cluster-forge.io/v1
kind: Cluster
metadata:
  name: test-cluster
  labels:
    env: staging
spec:
  providers:
    digitalocean:
      enabled: true
      token: do-token
      region: nyc3
  network:
    dns:
      domain: example.com
      provider: digitalocean
    wireguard:
      enabled: true
      serverEndpoint: vpn.example.com:51820
      serverPublicKey: pubkey
  kubernetes:
    distribution: rke2
    version: v1.28.5+rke2r1
    rke2:
      clusterToken: secret-token
      snapshotRetention: 7
  nodePools:
    - name: masters
      provider: digitalocean
      count: 3
      roles: [master]
      size: s-2vcpu-4gb
      taints:
        - key: dedicated
          value: master
          effect: NoSchedule
    - name: workers
      provider: digitalocean
      count: 2
      roles: [worker]
      size: s-2vcpu-4gb
"#
    }

    #[test]
    fn test_conversion_maps_present_blocks() {
        let manifest: ClusterManifest = serde_yaml::from_str(manifest_yaml()).unwrap();
        let cfg: ClusterConfig = manifest.into();

        assert_eq!(cfg.metadata.name, "test-cluster");
        assert_eq!(cfg.metadata.labels.get("env").unwrap(), "staging");

        let digitalocean = cfg.providers.digitalocean.as_ref().unwrap();
        assert!(digitalocean.enabled);
        assert_eq!(digitalocean.token, "do-token");

        let wireguard = cfg.network.wireguard.as_ref().unwrap();
        assert!(wireguard.enabled);
        assert_eq!(wireguard.server_endpoint, "vpn.example.com:51820");

        let rke2 = cfg.kubernetes.rke2.as_ref().unwrap();
        assert_eq!(rke2.cluster_token, "secret-token");
        assert_eq!(rke2.snapshot_retention, 7);
    }

    #[test]
    fn test_conversion_preserves_absence() {
        let manifest = ClusterManifest::default();
        let cfg: ClusterConfig = manifest.into();

        assert!(cfg.providers.linode.is_none());
        assert!(cfg.providers.aws.is_none());
        assert!(cfg.network.wireguard.is_none());
        assert!(cfg.kubernetes.rke2.is_none());
    }

    #[test]
    fn test_pool_list_becomes_keyed_map() {
        let manifest: ClusterManifest = serde_yaml::from_str(manifest_yaml()).unwrap();
        let cfg: ClusterConfig = manifest.into();

        assert_eq!(cfg.node_pools.len(), 2);
        assert_eq!(cfg.node_pools["masters"].count, 3);
        assert_eq!(cfg.node_pools["workers"].roles, vec!["worker"]);
    }

    #[test]
    fn test_taints_convert_element_wise() {
        let manifest: ClusterManifest = serde_yaml::from_str(manifest_yaml()).unwrap();
        let cfg: ClusterConfig = manifest.into();

        let taints = &cfg.node_pools["masters"].taints;
        assert_eq!(taints.len(), 1);
        assert_eq!(taints[0].key, "dedicated");
        assert_eq!(taints[0].effect, "NoSchedule");
    }
}
