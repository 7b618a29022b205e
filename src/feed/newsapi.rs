use super::types::*;
use super::{fetch_body, non_blank, non_empty, FeedCapabilities, FeedError, NewsFeed};
use crate::config::NewsApiConfig;
use crate::filter::FilterState;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::Deserialize;

/// Title NewsAPI substitutes for articles pulled by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

/// newsapi.org `/v2/everything` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

pub struct NewsApi {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    query: String,
    language: String,
    page_size: u32,
}

impl NewsApi {
    pub fn new(api_key: Option<String>, config: &NewsApiConfig) -> Self {
        Self {
            client: super::http_client(),
            api_key,
            base_url: config.base_url.clone(),
            query: config.query.clone(),
            language: config.language.clone(),
            page_size: config.page_size,
        }
    }
}

/// NewsAPI has no article ids; the url is unique within a batch.
fn normalize_article(raw: NewsApiArticle) -> Option<Article> {
    let title = non_blank(raw.title)?;
    if title == REMOVED_TITLE {
        return None;
    }
    let url = non_blank(raw.url)?;

    let source_label = raw.source.and_then(|s| non_blank(s.name));
    let domain = domain_from_url(&url, source_label.as_deref());
    let published_at = raw.published_at.unwrap_or_default();
    let published_at = parse_timestamp(&published_at)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or(published_at);

    Some(Article {
        id: url.clone(),
        title,
        published_at,
        url,
        source_name: source_label.unwrap_or_else(|| domain.clone()),
        domain,
        description: non_blank(raw.description),
        votes: None,
        sentiment: None,
        image_url: non_blank(raw.url_to_image),
        currencies: Vec::new(),
    })
}

pub fn parse_everything(json: &str) -> Result<Vec<Article>, FeedError> {
    let resp: EverythingResponse = serde_json::from_str(json)?;
    if resp.status != "ok" {
        return Err(FeedError::Rejected(format!(
            "{}: {}",
            resp.code.unwrap_or_else(|| resp.status.clone()),
            resp.message.unwrap_or_default()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    Ok(resp
        .articles
        .into_iter()
        .filter_map(normalize_article)
        .filter(|a| seen.insert(a.id.clone()))
        .collect())
}

#[async_trait]
impl NewsFeed for NewsApi {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn capabilities(&self) -> FeedCapabilities {
        FeedCapabilities { native_period: false, native_order: true, votes: false }
    }

    async fn fetch_news(&self, _filters: &FilterState) -> Result<Vec<Article>, FeedError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FeedError::MissingCredential("NEWSAPI_API_KEY"))?;

        let req = self
            .client
            .get(&self.base_url)
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", self.query.clone()),
                ("language", self.language.clone()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", self.page_size.to_string()),
            ]);
        let body = fetch_body(req).await?;
        non_empty(parse_everything(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Example News"},
                "author": "Jane Roe",
                "title": "Miners brace for halving",
                "description": "Hashrate keeps climbing ahead of the event.",
                "url": "https://news.example.com/a/b",
                "urlToImage": "https://news.example.com/a/b.jpg",
                "publishedAt": "2024-03-10T09:15:00Z",
                "content": "..."
            },
            {
                "source": {"id": null, "name": "[Removed]"},
                "title": "[Removed]",
                "url": "https://removed.com",
                "publishedAt": "1970-01-01T00:00:00Z"
            },
            {
                "source": {"id": null, "name": "Example News"},
                "title": "Miners brace for halving (updated)",
                "url": "https://news.example.com/a/b",
                "publishedAt": "2024-03-10T09:20:00Z"
            }
        ]
    }"#;

    #[test]
    fn test_parse_everything() {
        let articles = parse_everything(SAMPLE).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.id, "https://news.example.com/a/b");
        assert_eq!(a.domain, "news.example.com");
        assert_eq!(a.source_name, "Example News");
        assert_eq!(a.image_url.as_deref(), Some("https://news.example.com/a/b.jpg"));
        assert_eq!(a.sentiment, None);
    }

    #[test]
    fn test_www_host_matches_bare_source() {
        let json = r#"{
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": "coindesk", "name": "CoinDesk"},
                "title": "ETF flows turn positive",
                "url": "https://www.coindesk.com/x",
                "publishedAt": "2024-03-10T09:15:00Z"
            }]
        }"#;
        let articles = parse_everything(json).unwrap();
        assert_eq!(articles[0].domain, "coindesk.com");
        assert!(crate::filter::matches_source(&articles[0], "coindesk.com"));
    }

    #[test]
    fn test_parse_everything_error_status() {
        let json = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;
        match parse_everything(json) {
            Err(FeedError::Rejected(msg)) => assert!(msg.starts_with("apiKeyInvalid")),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let feed = NewsApi::new(None, &NewsApiConfig::default());
        let err = feed.fetch_news(&FilterState::default()).await.unwrap_err();
        assert!(matches!(err, FeedError::MissingCredential("NEWSAPI_API_KEY")));
    }
}
