use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::YandexError;
use super::types::{ApiHost, ApiStatus, DEFAULT_PAGE_SIZE, ListHostsResponse};

const YANDEX_MDB_API_BASE: &str = "https://mdb.api.cloud.yandex.net";

#[derive(Clone)]
pub struct YandexClient {
    client: reqwest::Client,
    base_url: String,
}

impl YandexClient {
    pub fn new(token: String) -> Result<Self, YandexError> {
        Self::with_base_url(token, YANDEX_MDB_API_BASE.to_string())
    }

    /// NOTE: Primarily used for testing with mock servers.
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, YandexError> {
        Self::create_client(token, base_url)
    }

    fn create_client(token: String, base_url: String) -> Result<Self, YandexError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let header_value = HeaderValue::from_str(&auth_value).map_err(|_| YandexError::Auth {
            message: "Invalid token format".to_string(),
        })?;
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(YandexError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    /// Lists every host of a Managed Elasticsearch cluster, following page tokens.
    pub async fn list_hosts(&self, cluster_id: &str) -> Result<Vec<ApiHost>, YandexError> {
        let base = format!(
            "{}/managed-elasticsearch/v1/clusters/{}/hosts",
            self.base_url,
            urlencoding::encode(cluster_id)
        );

        let mut all_hosts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = match &page_token {
                Some(t) => format!(
                    "{}?pageSize={}&pageToken={}",
                    base,
                    DEFAULT_PAGE_SIZE,
                    urlencoding::encode(t)
                ),
                None => format!("{}?pageSize={}", base, DEFAULT_PAGE_SIZE),
            };

            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if !status.is_success() {
                let message = response
                    .json::<ApiStatus>()
                    .await
                    .map(|s| {
                        tracing::debug!(code = s.code, "ListHosts returned an error status");
                        s.message
                    })
                    .unwrap_or_else(|_| "Unknown error".to_string());

                return Err(match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        YandexError::Auth { message }
                    }
                    StatusCode::NOT_FOUND => YandexError::ClusterNotFound {
                        cluster_id: cluster_id.to_string(),
                    },
                    _ => YandexError::Api {
                        status: status.as_u16(),
                        message,
                    },
                });
            }

            let page: ListHostsResponse =
                response.json().await.map_err(|e| YandexError::Api {
                    status: status.as_u16(),
                    message: format!("Failed to parse response: {}", e),
                })?;

            tracing::debug!(count = page.hosts.len(), "fetched hosts page");
            all_hosts.extend(page.hosts);

            if page.next_page_token.is_empty() {
                break;
            }
            page_token = Some(page.next_page_token);
        }

        Ok(all_hosts)
    }
}

impl std::fmt::Debug for YandexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}
