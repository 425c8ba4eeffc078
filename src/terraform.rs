//! Conversion between Terraform's `host` attribute blocks and [`Host`] records.

mod state;

pub use state::{CLUSTER_RESOURCE_TYPE, ClusterHosts, DesiredConfig, TerraformState};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::{Host, HostList, HostType};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported state format version {0}, expected 4")]
    UnsupportedVersion(u64),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("several {resource_type} resources in state ({candidates}), pass an address")]
    AmbiguousResource {
        resource_type: String,
        candidates: String,
    },

    #[error("resource {0} has no instances")]
    NoInstance(String),

    #[error("invalid host #{index}: {message}")]
    InvalidHost { index: usize, message: String },
}

/// A `host` block as Terraform stores it in state and configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fqdn: String,
    #[serde(rename = "type", default)]
    pub host_type: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub subnet_id: String,
    #[serde(default)]
    pub assign_public_ip: bool,
}

pub fn expand_hosts(blocks: &[HostAttributes]) -> Result<HostList, StateError> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let host_type = block
                .host_type
                .parse::<HostType>()
                .map_err(|message| StateError::InvalidHost { index, message })?;

            Ok(Host {
                name: block.name.clone(),
                host_type,
                fqdn: block.fqdn.clone(),
                zone: block.zone.clone(),
                subnet: block.subnet_id.clone(),
                public_ip: block.assign_public_ip,
            })
        })
        .collect()
}

impl From<&Host> for HostAttributes {
    fn from(host: &Host) -> Self {
        Self {
            name: host.name.clone(),
            fqdn: host.fqdn.clone(),
            host_type: host.host_type.to_string(),
            zone: host.zone.clone(),
            subnet_id: host.subnet.clone(),
            assign_public_ip: host.public_ip,
        }
    }
}

pub fn flatten_hosts(hosts: &HostList) -> Vec<HostAttributes> {
    hosts.iter().map(HostAttributes::from).collect()
}
