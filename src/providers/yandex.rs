mod client;
mod error;
mod types;

pub use client::YandexClient;
pub use error::YandexError;
pub use types::{ApiHost, ListHostsResponse};

use std::path::Path;

use async_trait::async_trait;

use super::{HostSource, ProviderError};
use crate::error::MdbError;
use crate::host::ActualHost;
use crate::terraform::CLUSTER_RESOURCE_TYPE;

/// Managed Service for Elasticsearch hosts read through the MDB REST API.
pub struct ElasticsearchSource {
    token: Option<String>,
    endpoint: Option<String>,
}

impl ElasticsearchSource {
    pub fn new(token: Option<String>, endpoint: Option<String>) -> Self {
        Self { token, endpoint }
    }

    fn client(&self) -> Result<YandexClient, ProviderError> {
        let token = self.token.clone().ok_or_else(|| {
            ProviderError::Auth(
                "No IAM token provided. Set YC_TOKEN or use --token flag".to_string(),
            )
        })?;

        let client = match &self.endpoint {
            Some(endpoint) => YandexClient::with_base_url(token, endpoint.clone())?,
            None => YandexClient::new(token)?,
        };
        Ok(client)
    }
}

#[async_trait]
impl HostSource for ElasticsearchSource {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn list_hosts(&self, cluster_id: &str) -> Result<Vec<ActualHost>, ProviderError> {
        let client = self.client()?;

        let hosts = client.list_hosts(cluster_id).await?;
        tracing::info!(cluster_id, count = hosts.len(), "cluster hosts listed");

        let actual = hosts
            .into_iter()
            .map(ApiHost::into_actual)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(actual)
    }

    fn resource_types(&self) -> Vec<&str> {
        vec![CLUSTER_RESOURCE_TYPE]
    }
}

/// Reads a `ListHosts` response body saved to disk.
pub fn read_hosts_file(path: &Path) -> Result<Vec<ActualHost>, MdbError> {
    let raw = std::fs::read_to_string(path)?;
    let response: ListHostsResponse = serde_json::from_str(&raw)?;
    let hosts = response
        .hosts
        .into_iter()
        .map(|h| h.into_actual().map_err(ProviderError::from))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = hosts.len(), path = %path.display(), "loaded saved hosts");
    Ok(hosts)
}
