pub mod cryptocompare;
pub mod cryptopanic;
pub mod fallback;
pub mod newsapi;
pub mod samples;
pub mod types;

use crate::filter::FilterState;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use types::Article;

const USER_AGENT: &str = concat!("crypto-vibe/", env!("CARGO_PKG_VERSION"));

/// What a provider does on its own side, so the orchestrator knows which
/// filter predicates still need to run locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCapabilities {
    /// The `period` filter is sent to the provider and applied server-side.
    pub native_period: bool,
    /// Results come back newest-first; no local sort needed.
    pub native_order: bool,
    /// Articles carry vote counts, so sentiment filtering is meaningful.
    pub votes: bool,
}

/// Every way a provider fetch can fail. The orchestrator treats them all alike.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider rejected request: {0}")]
    Rejected(String),

    #[error("provider returned no articles")]
    Empty,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    fn name(&self) -> &str;
    fn capabilities(&self) -> FeedCapabilities;
    async fn fetch_news(&self, filters: &FilterState) -> Result<Vec<Article>, FeedError>;
}

pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn fetch_body(req: RequestBuilder) -> Result<String, FeedError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Status {
            status: status.as_u16(),
            body: truncate(&body, 200),
        });
    }
    Ok(resp.text().await?)
}

/// Treat a successful but empty batch as a failure.
pub(crate) fn non_empty(articles: Vec<Article>) -> Result<Vec<Article>, FeedError> {
    if articles.is_empty() {
        Err(FeedError::Empty)
    } else {
        Ok(articles)
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

pub(crate) fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
