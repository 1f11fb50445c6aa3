use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::AirQualityRecord;
use crate::normalize::aqi::normalize_aqi;
use crate::provider::{ProviderId, require_api_key};

/// Feed readings change quickly; cache for five minutes.
const AQI_TTL: Duration = Duration::from_secs(300);

/// Location selector for the feed endpoint.
#[derive(Debug, Clone)]
pub enum AqiQuery {
    City(String),
    Geo { lat: f64, lng: f64 },
}

/// Client for the AQICN (waqi.info) air quality feed.
#[derive(Clone)]
pub struct AqicnProvider {
    api_key: String,
    fetcher: Arc<Fetcher>,
}

impl AqicnProvider {
    pub fn new(api_key: String, fetcher: Arc<Fetcher>) -> Self {
        Self { api_key, fetcher }
    }

    pub fn from_config(config: &Config, fetcher: Arc<Fetcher>) -> anyhow::Result<Self> {
        Ok(Self::new(require_api_key(config, ProviderId::Aqicn)?, fetcher))
    }

    pub async fn air_quality(&self, query: &AqiQuery) -> Result<AirQualityRecord> {
        let url = self.feed_url(query);
        let payload = self.fetcher.get_json(&url, &[], AQI_TTL).await?;
        normalize_aqi(&payload)
    }

    fn feed_url(&self, query: &AqiQuery) -> String {
        match query {
            AqiQuery::City(city) => {
                format!("https://api.waqi.info/feed/{city}/?token={}", self.api_key)
            }
            AqiQuery::Geo { lat, lng } => {
                format!("https://api.waqi.info/feed/geo:{lat};{lng}/?token={}", self.api_key)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;

    fn provider() -> AqicnProvider {
        let fetcher = Arc::new(Fetcher::new(ResponseCache::new()).expect("client"));
        AqicnProvider::new("TOKEN".to_string(), fetcher)
    }

    #[test]
    fn city_query_builds_the_city_feed_url() {
        let url = provider().feed_url(&AqiQuery::City("beijing".to_string()));
        assert_eq!(url, "https://api.waqi.info/feed/beijing/?token=TOKEN");
    }

    #[test]
    fn geo_query_builds_the_geo_feed_url() {
        let url = provider().feed_url(&AqiQuery::Geo { lat: 40.7128, lng: -74.006 });
        assert_eq!(url, "https://api.waqi.info/feed/geo:40.7128;-74.006/?token=TOKEN");
    }
}
