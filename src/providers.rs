pub mod yandex;

use async_trait::async_trait;
use thiserror::Error;

use crate::host::ActualHost;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown host source: {0}")]
    UnknownSource(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("yandex cloud error: {0}")]
    Yandex(String),
}

/// Where live cluster topology comes from.
#[async_trait]
pub trait HostSource: Send + Sync {
    fn name(&self) -> &str;
    async fn list_hosts(&self, cluster_id: &str) -> Result<Vec<ActualHost>, ProviderError>;
    fn resource_types(&self) -> Vec<&str>;
}

pub fn get_source(
    name: &str,
    token: Option<String>,
    endpoint: Option<String>,
) -> Result<Box<dyn HostSource>, ProviderError> {
    match name {
        "elasticsearch" => Ok(Box::new(yandex::ElasticsearchSource::new(token, endpoint))),
        other => Err(ProviderError::UnknownSource(other.to_string())),
    }
}
