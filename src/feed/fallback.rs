use super::samples::sample_articles;
use super::types::Article;
use super::{FeedCapabilities, FeedError, NewsFeed};
use crate::filter::{self, FilterPlan, FilterState};
use crate::notify::Notifier;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Samples carry votes but are not pre-sorted. Their dates are fixed, so a
/// period window would empty the batch; it is never applied to them.
const SAMPLE_CAPABILITIES: FeedCapabilities = FeedCapabilities {
    native_period: true,
    native_order: false,
    votes: true,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOrigin {
    Provider(String),
    Samples,
}

impl BatchOrigin {
    pub fn label(&self) -> &str {
        match self {
            BatchOrigin::Provider(name) => name,
            BatchOrigin::Samples => "samples",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    pub origin: BatchOrigin,
}

/// Tries each feed in priority order and keeps the first non-empty batch.
/// Falls back to bundled samples; never fails.
pub struct NewsAggregator {
    feeds: Vec<Box<dyn NewsFeed>>,
    timeout: Duration,
    samples: Vec<Article>,
    notifier: Notifier,
}

impl NewsAggregator {
    pub fn new(feeds: Vec<Box<dyn NewsFeed>>, timeout: Duration, notifier: Notifier) -> Self {
        Self {
            feeds,
            timeout,
            samples: sample_articles(),
            notifier,
        }
    }

    pub fn with_samples(mut self, samples: Vec<Article>) -> Self {
        self.samples = samples;
        self
    }

    pub fn feed_names(&self) -> Vec<&str> {
        self.feeds.iter().map(|f| f.name()).collect()
    }

    pub async fn fetch(&self, filters: &FilterState) -> FetchOutcome {
        self.fetch_at(filters, Utc::now()).await
    }

    /// `now` anchors the local period window.
    pub async fn fetch_at(&self, filters: &FilterState, now: DateTime<Utc>) -> FetchOutcome {
        for feed in &self.feeds {
            let name = feed.name();
            let result = match tokio::time::timeout(self.timeout, feed.fetch_news(filters)).await {
                Ok(result) => result,
                Err(_) => Err(FeedError::Timeout(self.timeout)),
            };

            match result {
                Ok(articles) if !articles.is_empty() => {
                    tracing::info!(provider = name, count = articles.len(), "news batch received");
                    let articles = narrow(articles, feed.capabilities(), filters, now);
                    return FetchOutcome {
                        articles,
                        origin: BatchOrigin::Provider(name.to_string()),
                    };
                }
                Ok(_) => {
                    tracing::warn!(provider = name, "provider returned no articles, trying next");
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "news fetch failed, trying next");
                }
            }
        }

        tracing::warn!(providers = self.feeds.len(), "all news providers failed, using samples");
        self.notifier.warning("notice.samples", None);
        FetchOutcome {
            articles: narrow(self.samples.clone(), SAMPLE_CAPABILITIES, filters, now),
            origin: BatchOrigin::Samples,
        }
    }
}

/// Apply only the predicates the batch's provider did not already apply.
fn narrow(
    mut articles: Vec<Article>,
    caps: FeedCapabilities,
    filters: &FilterState,
    now: DateTime<Utc>,
) -> Vec<Article> {
    if !caps.native_order {
        filter::sort_recent_first(&mut articles);
    }
    let plan = FilterPlan {
        period: !caps.native_period,
        sentiment: caps.votes,
    };
    filter::apply(articles, filters, plan, now)
}
