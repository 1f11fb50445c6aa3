//! Outbound HTTP with cache consultation.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheKey, FetchedResponse, ResponseCache};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cache-consulting HTTP fetcher shared by all providers.
pub struct Fetcher {
    http: Client,
    cache: ResponseCache,
}

impl Fetcher {
    pub fn new(cache: ResponseCache) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, cache })
    }

    /// GET `url`, serving from cache when a fresh entry exists. Timeouts and
    /// connection failures surface as transport errors and are never cached.
    pub async fn get_cached(
        &self,
        url: &str,
        headers: &[(String, String)],
        ttl: Duration,
    ) -> Result<FetchedResponse> {
        let key = CacheKey::new(url, headers);
        self.cache
            .get_or_fetch(key, ttl, || async move {
                let mut request = self.http.get(url);
                for (name, value) in headers {
                    request = request.header(name.as_str(), value.as_str());
                }
                let response = request.send().await?;
                let status = response.status().as_u16();
                let body = response.text().await?;
                Ok(FetchedResponse { status, body })
            })
            .await
    }

    /// GET and decode JSON. A non-success upstream status becomes a
    /// structured error rather than a payload.
    pub async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        ttl: Duration,
    ) -> Result<Value> {
        let response = self.get_cached(url, headers, ttl).await?;
        if !response.is_success() {
            warn!(url, status = response.status, "upstream returned failure status");
            return Err(Error::UpstreamStatus {
                status: response.status,
            });
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}
