use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::PollutionReport;
use crate::normalize::pollution::normalize_latest;
use crate::provider::ProviderId;

const POLLUTION_TTL: Duration = Duration::from_secs(3600);

/// Client for the OpenAQ `latest` measurements API. The API key is optional:
/// without one the request simply goes out unauthenticated.
#[derive(Clone)]
pub struct OpenaqProvider {
    api_key: String,
    fetcher: Arc<Fetcher>,
}

impl OpenaqProvider {
    pub fn new(api_key: String, fetcher: Arc<Fetcher>) -> Self {
        Self { api_key, fetcher }
    }

    pub fn from_config(config: &Config, fetcher: Arc<Fetcher>) -> Self {
        let api_key = config
            .provider_api_key(ProviderId::Openaq)
            .unwrap_or_default()
            .to_string();
        Self::new(api_key, fetcher)
    }

    /// Latest measurements for a country code. Upstream failures surface as
    /// structured errors like every other endpoint.
    pub async fn latest(&self, country: &str) -> Result<PollutionReport> {
        let url = format!(
            "https://api.openaq.org/v2/latest?limit=100&page=1&offset=0&sort=desc&country={country}&order_by=lastUpdated"
        );
        let payload = self
            .fetcher
            .get_json(&url, &self.headers(), POLLUTION_TTL)
            .await?;
        Ok(normalize_latest(&payload))
    }

    fn headers(&self) -> Vec<(String, String)> {
        if self.api_key.is_empty() {
            Vec::new()
        } else {
            vec![("X-API-Key".to_string(), self.api_key.clone())]
        }
    }
}
