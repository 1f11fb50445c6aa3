use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::BirdReport;
use crate::normalize::birds::normalize_sightings;
use crate::provider::{ProviderId, require_api_key};

/// Sightings move slowly enough for an hour of caching.
const OBSERVATIONS_TTL: Duration = Duration::from_secs(3600);
/// Hotspots are reference data; cache for a day.
const HOTSPOTS_TTL: Duration = Duration::from_secs(86_400);

/// Client for the eBird observations API.
#[derive(Clone)]
pub struct EbirdProvider {
    api_key: String,
    fetcher: Arc<Fetcher>,
}

impl EbirdProvider {
    pub fn new(api_key: String, fetcher: Arc<Fetcher>) -> Self {
        Self { api_key, fetcher }
    }

    pub fn from_config(config: &Config, fetcher: Arc<Fetcher>) -> anyhow::Result<Self> {
        Ok(Self::new(require_api_key(config, ProviderId::Ebird)?, fetcher))
    }

    /// Recent sightings for an eBird region code (e.g. "US-NY-063").
    pub async fn recent_observations(&self, region: &str) -> Result<BirdReport> {
        let url = format!("https://api.ebird.org/v2/data/obs/{region}/recent");
        let payload = self
            .fetcher
            .get_json(&url, &self.headers(), OBSERVATIONS_TTL)
            .await?;
        let sightings = payload.as_array().map(Vec::as_slice).unwrap_or(&[]);
        Ok(normalize_sightings(sightings))
    }

    /// Birding hotspots around a coordinate pair, passed through without
    /// normalization.
    pub async fn hotspots(&self, lat: f64, lng: f64) -> Result<Value> {
        let url = format!("https://api.ebird.org/v2/ref/hotspot/geo?lat={lat}&lng={lng}&fmt=json");
        self.fetcher.get_json(&url, &self.headers(), HOTSPOTS_TTL).await
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("X-eBirdApiToken".to_string(), self.api_key.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_header_is_present() {
        let fetcher = Arc::new(Fetcher::new(crate::cache::ResponseCache::new()).expect("client"));
        let provider = EbirdProvider::new("EBIRD_KEY".to_string(), fetcher);

        assert_eq!(
            provider.headers(),
            vec![("X-eBirdApiToken".to_string(), "EBIRD_KEY".to_string())]
        );
    }
}
