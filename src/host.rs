use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subnet value for hosts the API reported without a subnet.
///
/// It marks the subnet as "must be recalculated" rather than "explicitly absent".
pub const SUBNET_NONE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostType {
    DataNode,
    MasterNode,
}

impl HostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostType::DataNode => "DATA_NODE",
            HostType::MasterNode => "MASTER_NODE",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DATA_NODE" => Ok(HostType::DataNode),
            "MASTER_NODE" => Ok(HostType::MasterNode),
            other => Err(format!("unknown host type '{}'", other)),
        }
    }
}

/// A logical cluster member.
///
/// `name` is the stable key tracked in Terraform, `fqdn` the key assigned by the cloud.
/// Either may be empty depending on where the record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    #[serde(rename = "type")]
    pub host_type: HostType,
    pub fqdn: String,
    pub zone: String,
    pub subnet: String,
    pub public_ip: bool,
}

impl Host {
    pub fn new(name: impl Into<String>, host_type: HostType, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host_type,
            fqdn: String::new(),
            zone: zone.into(),
            subnet: String::new(),
            public_ip: false,
        }
    }

    pub fn with_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        self.fqdn = fqdn.into();
        self
    }

    pub fn with_subnet(mut self, subnet: impl Into<String>) -> Self {
        self.subnet = subnet.into();
        self
    }

    pub fn with_public_ip(mut self, public_ip: bool) -> Self {
        self.public_ip = public_ip;
        self
    }

    pub fn is_master(&self) -> bool {
        self.host_type == HostType::MasterNode
    }

    /// Zone, type and public address agree. Subnet is checked separately.
    pub fn same_placement(&self, other: &Host) -> bool {
        self.zone == other.zone
            && self.host_type == other.host_type
            && self.public_ip == other.public_ip
    }
}

impl From<ActualHost> for Host {
    fn from(actual: ActualHost) -> Self {
        let subnet = if actual.subnet.is_empty() {
            SUBNET_NONE.to_string()
        } else {
            actual.subnet
        };

        Self {
            name: String::new(),
            host_type: actual.host_type,
            fqdn: actual.fqdn,
            zone: actual.zone,
            subnet,
            public_ip: actual.public_ip,
        }
    }
}

/// A host as reported by the cloud API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualHost {
    pub fqdn: String,
    #[serde(rename = "type")]
    pub host_type: HostType,
    pub zone: String,
    pub subnet: String,
    pub public_ip: bool,
}

/// Unordered host collection consumed by the matcher through [`HostList::remove_by`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostList(Vec<Host>);

impl HostList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, host: Host) {
        self.0.push(host);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Host> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Host] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Host> {
        self.0
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Host> {
        self.0.iter().find(|h| h.name == name)
    }

    /// Removes and returns the first host matching `predicate`.
    ///
    /// The last host takes the removed slot, so the order of the remaining hosts changes.
    pub fn remove_by<F>(&mut self, predicate: F) -> Option<Host>
    where
        F: FnMut(&Host) -> bool,
    {
        let index = self.0.iter().position(predicate)?;
        Some(self.0.swap_remove(index))
    }

    pub fn count_masters(&self) -> usize {
        self.0.iter().filter(|h| h.is_master()).count()
    }
}

impl From<Vec<Host>> for HostList {
    fn from(hosts: Vec<Host>) -> Self {
        Self(hosts)
    }
}

impl FromIterator<Host> for HostList {
    fn from_iter<I: IntoIterator<Item = Host>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HostList {
    type Item = Host;
    type IntoIter = std::vec::IntoIter<Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostList {
    type Item = &'a Host;
    type IntoIter = std::slice::Iter<'a, Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
