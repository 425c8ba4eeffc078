use std::path::Path;

use serde::Deserialize;

use super::{HostAttributes, StateError, expand_hosts};
use crate::host::HostList;

pub const CLUSTER_RESOURCE_TYPE: &str = "yandex_mdb_elasticsearch_cluster";

const SUPPORTED_VERSION: u64 = 4;

/// Terraform state parser.
///
/// Parses tfstate v4 files and extracts the `host` blocks of cluster resources.
#[derive(Debug, Deserialize)]
pub struct TerraformState {
    pub version: u64,
    #[serde(default)]
    resources: Vec<StateResource>,
}

#[derive(Debug, Deserialize)]
struct StateResource {
    #[serde(default)]
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    instances: Vec<StateInstance>,
}

impl StateResource {
    fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

#[derive(Debug, Deserialize)]
struct StateInstance {
    #[serde(default)]
    attributes: ClusterAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct ClusterAttributes {
    #[serde(default)]
    id: String,
    #[serde(default)]
    host: Vec<HostAttributes>,
}

/// Hosts and identity of one cluster resource found in state.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHosts {
    pub address: String,
    pub cluster_id: String,
    pub hosts: HostList,
}

impl TerraformState {
    pub fn from_file(path: &Path) -> Result<Self, StateError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, StateError> {
        let state: TerraformState = serde_json::from_str(raw)?;
        if state.version != SUPPORTED_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        tracing::debug!(resources = state.resources.len(), "parsed terraform state");
        Ok(state)
    }

    /// Finds a managed cluster resource by `type.name` address, or the only
    /// [`CLUSTER_RESOURCE_TYPE`] resource when no address is given.
    pub fn cluster_hosts(&self, address: Option<&str>) -> Result<ClusterHosts, StateError> {
        let mut managed = self.resources.iter().filter(|r| r.mode == "managed");

        let resource = match address {
            Some(addr) => managed
                .find(|r| r.address() == addr)
                .ok_or_else(|| StateError::ResourceNotFound(addr.to_string()))?,
            None => {
                let candidates: Vec<&StateResource> = managed
                    .filter(|r| r.resource_type == CLUSTER_RESOURCE_TYPE)
                    .collect();
                match candidates.as_slice() {
                    [] => {
                        return Err(StateError::ResourceNotFound(
                            CLUSTER_RESOURCE_TYPE.to_string(),
                        ));
                    }
                    [single] => *single,
                    many => {
                        return Err(StateError::AmbiguousResource {
                            resource_type: CLUSTER_RESOURCE_TYPE.to_string(),
                            candidates: many
                                .iter()
                                .map(|r| r.address())
                                .collect::<Vec<_>>()
                                .join(", "),
                        });
                    }
                }
            }
        };

        let instance = resource
            .instances
            .first()
            .ok_or_else(|| StateError::NoInstance(resource.address()))?;

        let hosts = expand_hosts(&instance.attributes.host)?;
        tracing::debug!(
            address = %resource.address(),
            count = hosts.len(),
            "loaded hosts from state"
        );

        Ok(ClusterHosts {
            address: resource.address(),
            cluster_id: instance.attributes.id.clone(),
            hosts,
        })
    }
}

/// Desired `host` blocks, either a bare array or an object with a `host` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DesiredConfig {
    Hosts(Vec<HostAttributes>),
    Block { host: Vec<HostAttributes> },
}

impl DesiredConfig {
    pub fn from_file(path: &Path) -> Result<HostList, StateError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<HostList, StateError> {
        let config: DesiredConfig = serde_json::from_str(raw)?;
        let blocks = match config {
            DesiredConfig::Hosts(blocks) => blocks,
            DesiredConfig::Block { host } => host,
        };
        expand_hosts(&blocks)
    }
}
