use super::types::*;
use super::{fetch_body, non_blank, non_empty, FeedCapabilities, FeedError, NewsFeed};
use crate::config::CryptoCompareConfig;
use crate::filter::FilterState;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// min-api.cryptocompare.com `/data/v2/news/` response.
/// Errors come back as HTTP 200 with `"Response": "Error"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NewsResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    id: Value,
    #[serde(default)]
    published_on: Option<i64>,
    #[serde(default)]
    imageurl: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    upvotes: Option<Value>,
    #[serde(default)]
    downvotes: Option<Value>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    source_info: Option<SourceInfo>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceInfo {
    #[serde(default)]
    name: Option<String>,
}

pub struct CryptoCompare {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    lang: String,
}

/// Vote counts arrive as either numbers or numeric strings.
fn count(v: Option<&Value>) -> u32 {
    match v {
        Some(Value::Number(n)) => n.as_u64().map(|n| n.min(u32::MAX as u64) as u32).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// "BTC|ETH|Trading" -> ["BTC", "ETH"]
fn coin_codes(categories: &str) -> Vec<String> {
    categories
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty() && c.len() <= 6)
        .filter(|c| c.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

impl CryptoCompare {
    pub fn new(api_key: Option<String>, config: &CryptoCompareConfig) -> Self {
        Self {
            client: super::http_client(),
            api_key,
            base_url: config.base_url.clone(),
            lang: config.lang.clone(),
        }
    }
}

fn normalize_item(item: NewsItem) -> Option<Article> {
    let id = id_string(&item.id)?;
    let title = item.title.trim().to_string();
    if title.is_empty() || item.url.is_empty() {
        return None;
    }

    let source_label = item
        .source_info
        .and_then(|s| non_blank(s.name))
        .or_else(|| non_blank(item.source));
    let domain = domain_from_url(&item.url, source_label.as_deref());
    let published_at = item
        .published_on
        .and_then(epoch_to_rfc3339)
        .unwrap_or_default();

    let votes = Votes {
        positive: count(item.upvotes.as_ref()),
        negative: count(item.downvotes.as_ref()),
        ..Default::default()
    };

    Some(
        Article {
            id,
            title,
            published_at,
            url: item.url,
            source_name: source_label.unwrap_or_else(|| domain.clone()),
            domain,
            description: non_blank(item.body),
            votes: None,
            sentiment: None,
            image_url: non_blank(item.imageurl),
            currencies: item.categories.as_deref().map(coin_codes).unwrap_or_default(),
        }
        .with_votes(votes),
    )
}

pub fn parse_news(json: &str) -> Result<Vec<Article>, FeedError> {
    let resp: NewsResponse = serde_json::from_str(json)?;
    if resp.response.as_deref() == Some("Error") {
        return Err(FeedError::Rejected(resp.message.unwrap_or_default()));
    }
    let items: Vec<NewsItem> = match resp.data {
        Some(data) => serde_json::from_value(data)?,
        None => Vec::new(),
    };
    Ok(items.into_iter().filter_map(normalize_item).collect())
}

#[async_trait]
impl NewsFeed for CryptoCompare {
    fn name(&self) -> &str {
        "cryptocompare"
    }

    fn capabilities(&self) -> FeedCapabilities {
        FeedCapabilities { native_period: false, native_order: false, votes: true }
    }

    async fn fetch_news(&self, _filters: &FilterState) -> Result<Vec<Article>, FeedError> {
        let mut params = vec![("lang", self.lang.clone())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let req = self.client.get(&self.base_url).query(&params);
        let body = fetch_body(req).await?;
        non_empty(parse_news(&body)?)
    }
}
