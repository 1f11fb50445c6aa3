//! Environmental news boundary.
//!
//! Scraping a news page is a collaborator concern hidden behind
//! [`ArticleSource`]; what this module owns is the contract the rest of the
//! system relies on: a bounded, deduplicated article list that never fails.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{error, info};

use crate::model::Article;

/// Articles surfaced per invocation.
const MAX_ARTICLES: usize = 10;

/// An upstream article feed (news page scrape, observatory listing, ...).
/// Implementations stamp `date` at fetch time and are allowed to fail; the
/// services wrapping a source decide what failure means.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self) -> anyhow::Result<Vec<Article>>;
}

pub struct NewsService {
    source: Box<dyn ArticleSource>,
}

impl NewsService {
    pub fn new(source: Box<dyn ArticleSource>) -> Self {
        Self { source }
    }

    /// Latest articles: at most ten, deduplicated by link, records without a
    /// title or link dropped. A failing source yields an empty list, never an
    /// error.
    pub async fn latest(&self) -> Vec<Article> {
        let articles = match self.source.fetch_articles().await {
            Ok(articles) => articles,
            Err(err) => {
                error!("news source failed: {err:#}");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let articles: Vec<Article> = articles
            .into_iter()
            .filter(|article| !article.title.is_empty() && !article.link.is_empty())
            .filter(|article| seen.insert(article.link.clone()))
            .take(MAX_ARTICLES)
            .collect();

        info!("found {} articles", articles.len());
        articles
    }
}
