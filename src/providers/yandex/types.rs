use serde::Deserialize;

use super::YandexError;
use crate::host::{ActualHost, HostType};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of `ListHosts`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHostsResponse {
    #[serde(default)]
    pub hosts: Vec<ApiHost>,
    #[serde(default)]
    pub next_page_token: String,
}

/// A cluster host as the MDB API returns it. `name` holds the FQDN.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHost {
    pub name: String,
    #[serde(default)]
    pub zone_id: String,
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub subnet_id: String,
    #[serde(default)]
    pub assign_public_ip: bool,
}

impl ApiHost {
    pub fn into_actual(self) -> Result<ActualHost, YandexError> {
        let host_type = self
            .type_
            .parse::<HostType>()
            .map_err(|message| YandexError::InvalidHost {
                fqdn: self.name.clone(),
                message,
            })?;

        Ok(ActualHost {
            fqdn: self.name,
            host_type,
            zone: self.zone_id,
            subnet: self.subnet_id,
            public_ip: self.assign_public_ip,
        })
    }
}

/// gRPC gateway error body.
#[derive(Debug, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}
