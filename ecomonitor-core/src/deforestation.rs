//! Deforestation composite: observatory articles plus Global Forest Watch
//! statistics.
//!
//! The composite keeps its own 24-hour cache and, unlike the response cache,
//! deliberately serves the last successful result when a refresh fails. An
//! error only reaches the caller when no fetch has ever succeeded.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::cache::{Clock, SystemClock};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::DeforestationReport;
use crate::news::ArticleSource;

const COMPOSITE_TTL: Duration = Duration::from_secs(86_400);
const GFW_URL: &str = "https://gfw-api.org/forest-change/summary-stats/v1/loss?period=2001-01-01,2022-12-31&gladConfirmOnly=false&aggregate_values=true";
const SOURCE_LABEL: &str = "NASA Earth Observatory and Global Forest Watch";

/// Forest-change statistics feed.
#[async_trait]
pub trait ForestDataSource: Send + Sync {
    async fn fetch_forest_data(&self) -> Result<Value>;
}

/// Global Forest Watch summary-stats endpoint.
pub struct GfwClient {
    fetcher: Arc<Fetcher>,
}

impl GfwClient {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ForestDataSource for GfwClient {
    async fn fetch_forest_data(&self) -> Result<Value> {
        let payload = self.fetcher.get_json(GFW_URL, &[], COMPOSITE_TTL).await?;
        Ok(payload.get("data").cloned().unwrap_or_else(|| json!({})))
    }
}

pub struct DeforestationService {
    articles: Box<dyn ArticleSource>,
    forest: Box<dyn ForestDataSource>,
    clock: Arc<dyn Clock>,
    last_good: Mutex<Option<(SystemTime, DeforestationReport)>>,
}

impl DeforestationService {
    pub fn new(articles: Box<dyn ArticleSource>, forest: Box<dyn ForestDataSource>) -> Self {
        Self::with_clock(articles, forest, Arc::new(SystemClock))
    }

    pub fn with_clock(
        articles: Box<dyn ArticleSource>,
        forest: Box<dyn ForestDataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            articles,
            forest,
            clock,
            last_good: Mutex::new(None),
        }
    }

    /// The current composite. Refreshed lazily once the cached one is a day
    /// old; a failed refresh falls back to the previous composite however
    /// stale it is.
    pub async fn report(&self) -> anyhow::Result<DeforestationReport> {
        if let Some(cached) = self.cached(COMPOSITE_TTL) {
            info!("returning cached deforestation data");
            return Ok(cached);
        }

        match self.refresh().await {
            Ok(report) => {
                let mut last_good = self.last_good.lock().unwrap_or_else(PoisonError::into_inner);
                *last_good = Some((self.clock.now(), report.clone()));
                Ok(report)
            }
            Err(err) => {
                warn!("deforestation refresh failed: {err:#}");
                let last_good = self.last_good.lock().unwrap_or_else(PoisonError::into_inner);
                match last_good.as_ref() {
                    Some((_, stale)) => Ok(stale.clone()),
                    None => Err(err),
                }
            }
        }
    }

    /// Summary statistics: live numbers when the composite carries them,
    /// published reference figures otherwise.
    pub async fn forest_summary(&self) -> ForestSummary {
        match self.report().await {
            Ok(report) => ForestSummary::from_forest_data(&report.forest_data),
            Err(_) => ForestSummary::reference(),
        }
    }

    fn cached(&self, ttl: Duration) -> Option<DeforestationReport> {
        let last_good = self.last_good.lock().unwrap_or_else(PoisonError::into_inner);
        let (stored_at, report) = last_good.as_ref()?;
        let age = self
            .clock
            .now()
            .duration_since(*stored_at)
            .unwrap_or_default();
        (age < ttl).then(|| report.clone())
    }

    async fn refresh(&self) -> anyhow::Result<DeforestationReport> {
        let articles = self.articles.fetch_articles().await?;

        // Forest statistics are best effort; the composite is still useful
        // without them.
        let forest_data = match self.forest.fetch_forest_data().await {
            Ok(data) => data,
            Err(err) => {
                warn!("global forest watch fetch failed: {err}");
                json!({})
            }
        };

        Ok(DeforestationReport {
            timestamp: DateTime::<Utc>::from(self.clock.now()),
            articles,
            forest_data,
            source: SOURCE_LABEL.to_string(),
        })
    }
}

/// Forest loss/gain figures derived from the composite.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ForestSummary {
    Live {
        total_loss: f64,
        total_gain: f64,
        net_change: f64,
        years: Vec<Value>,
        source: &'static str,
    },
    Reference {
        total_loss_ha: u64,
        annual_loss_ha: u64,
        primary_forest_loss_2021: u64,
        reference: &'static str,
        source: &'static str,
        disclaimer: &'static str,
    },
}

impl ForestSummary {
    fn from_forest_data(forest: &Value) -> Self {
        match forest.get("totalLoss").and_then(Value::as_f64) {
            Some(total_loss) => {
                let total_gain = forest.get("totalGain").and_then(Value::as_f64).unwrap_or(0.0);
                ForestSummary::Live {
                    total_loss,
                    total_gain,
                    net_change: total_loss - total_gain,
                    years: forest
                        .get("years")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default(),
                    source: "Global Forest Watch",
                }
            }
            None => Self::reference(),
        }
    }

    fn reference() -> Self {
        ForestSummary::Reference {
            total_loss_ha: 411_000_000,
            annual_loss_ha: 25_600_000,
            primary_forest_loss_2021: 3_750_000,
            reference: "Reference: Global Forest Watch reports approximately 411 million hectares of tree cover loss globally from 2001 to 2021",
            source: "Global Forest Watch (Static Reference)",
            disclaimer: "These are static reference values. For real-time data, please refer to globalforestwatch.org",
        }
    }
}
