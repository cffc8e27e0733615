//! # Configuration Merging
//!
//! Folds an ordered list of configurations into one. The fold is
//! deterministic and position-based: later documents win for scalar
//! fields they set, maps are unioned with later entries replacing earlier
//! ones under the same key, and node lists concatenate in order.

use crate::model::ClusterConfig;
use errors::ConfigError;

/// Merges `configs` left to right into a single configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Combines layered configuration documents (base plus environment or
/// site overlays) into the single document the rest of the pipeline
/// consumes.
///
/// ## Semantics
/// - Scalars: a later non-empty value replaces the earlier one; empty
///   strings and `false`/zero never overwrite.
/// - Maps (`nodePools`, labels, annotations): key union, later wins.
/// - Node lists: concatenation in document order.
///
/// ## Errors
/// [`ConfigError::NoConfigurations`] when `configs` is empty.
pub fn merge_configs(configs: Vec<ClusterConfig>) -> Result<ClusterConfig, ConfigError> {
    let mut iter = configs.into_iter();
    let mut merged = iter.next().ok_or(ConfigError::NoConfigurations)?;
    for next in iter {
        merge_into(&mut merged, next);
    }
    Ok(merged)
}

fn take_if_set(dst: &mut String, src: String) {
    if !src.is_empty() {
        *dst = src;
    }
}

fn merge_into(dst: &mut ClusterConfig, src: ClusterConfig) {
    take_if_set(&mut dst.metadata.name, src.metadata.name);
    take_if_set(&mut dst.metadata.environment, src.metadata.environment);
    take_if_set(&mut dst.metadata.version, src.metadata.version);
    take_if_set(&mut dst.metadata.owner, src.metadata.owner);
    take_if_set(&mut dst.metadata.team, src.metadata.team);
    dst.metadata.labels.extend(src.metadata.labels);
    dst.metadata.annotations.extend(src.metadata.annotations);

    take_if_set(&mut dst.cluster.cluster_type, src.cluster.cluster_type);
    take_if_set(&mut dst.cluster.version, src.cluster.version);
    if src.cluster.high_availability {
        dst.cluster.high_availability = true;
    }
    if src.cluster.multi_cloud {
        dst.cluster.multi_cloud = true;
    }

    if src.providers.digitalocean.is_some() {
        dst.providers.digitalocean = src.providers.digitalocean;
    }
    if src.providers.linode.is_some() {
        dst.providers.linode = src.providers.linode;
    }
    if src.providers.aws.is_some() {
        dst.providers.aws = src.providers.aws;
    }
    if src.providers.azure.is_some() {
        dst.providers.azure = src.providers.azure;
    }
    if src.providers.gcp.is_some() {
        dst.providers.gcp = src.providers.gcp;
    }

    take_if_set(&mut dst.network.mode, src.network.mode);
    take_if_set(&mut dst.network.cidr, src.network.cidr);
    take_if_set(&mut dst.network.pod_cidr, src.network.pod_cidr);
    take_if_set(&mut dst.network.service_cidr, src.network.service_cidr);
    if !src.network.dns_servers.is_empty() {
        dst.network.dns_servers = src.network.dns_servers;
    }
    if src.network.wireguard.is_some() {
        dst.network.wireguard = src.network.wireguard;
    }

    take_if_set(&mut dst.kubernetes.distribution, src.kubernetes.distribution);
    take_if_set(&mut dst.kubernetes.version, src.kubernetes.version);
    take_if_set(&mut dst.kubernetes.network_plugin, src.kubernetes.network_plugin);
    take_if_set(&mut dst.kubernetes.pod_cidr, src.kubernetes.pod_cidr);
    take_if_set(&mut dst.kubernetes.service_cidr, src.kubernetes.service_cidr);
    if src.kubernetes.rke2.is_some() {
        dst.kubernetes.rke2 = src.kubernetes.rke2;
    }

    dst.nodes.extend(src.nodes);
    dst.node_pools.extend(src.node_pools);
}
