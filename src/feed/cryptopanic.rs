use super::types::*;
use super::{fetch_body, non_blank, non_empty, FeedCapabilities, FeedError, NewsFeed};
use crate::config::CryptoPanicConfig;
use crate::filter::FilterState;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::Deserialize;

/// cryptopanic.com `/api/v1/posts/` response
#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    published_at_unix: Option<i64>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: Option<PostSource>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    votes: Option<Votes>,
    #[serde(default)]
    currencies: Option<Vec<PostCurrency>>,
    #[serde(default)]
    metadata: Option<PostMetadata>,
}

#[derive(Debug, Deserialize)]
struct PostSource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostCurrency {
    code: String,
}

#[derive(Debug, Deserialize)]
struct PostMetadata {
    #[serde(default)]
    image: Option<String>,
}

pub struct CryptoPanic {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    currencies: String,
    regions: String,
    kind: String,
}

impl CryptoPanic {
    pub fn new(api_key: Option<String>, config: &CryptoPanicConfig) -> Self {
        Self {
            client: super::http_client(),
            api_key,
            base_url: config.base_url.clone(),
            currencies: config.currencies.clone(),
            regions: config.regions.clone(),
            kind: config.kind.clone(),
        }
    }

    fn query(&self, api_key: &str, filters: &FilterState) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("auth_token", api_key.to_string()),
            ("public", "true".to_string()),
            ("currencies", self.currencies.clone()),
            ("regions", self.regions.clone()),
            ("kind", self.kind.clone()),
        ];
        if let Some(period) = filters.period() {
            params.push(("filter", period.as_str().to_string()));
        }
        params
    }
}

fn normalize_post(post: Post) -> Option<Article> {
    let title = post.title.trim().to_string();
    if title.is_empty() || post.url.is_empty() {
        return None;
    }

    let source_title = post.source.as_ref().and_then(|s| non_blank(s.title.clone()));
    let domain = non_blank(post.domain)
        .or_else(|| post.source.as_ref().and_then(|s| non_blank(s.domain.clone())))
        .unwrap_or_else(|| domain_from_url(&post.url, source_title.as_deref()));

    let published_at = match parse_timestamp(&post.published_at) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => post
            .published_at_unix
            .and_then(epoch_to_rfc3339)
            .unwrap_or(post.published_at),
    };

    let article = Article {
        id: post.id.to_string(),
        title,
        published_at,
        url: post.url,
        source_name: source_title.unwrap_or_else(|| domain.clone()),
        domain,
        description: non_blank(post.description),
        votes: None,
        sentiment: None,
        image_url: post.metadata.and_then(|m| non_blank(m.image)),
        currencies: post
            .currencies
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.code)
            .collect(),
    };

    Some(match post.votes {
        Some(votes) => article.with_votes(votes),
        None => article,
    })
}

pub fn parse_posts(json: &str) -> Result<Vec<Article>, FeedError> {
    let resp: PostsResponse = serde_json::from_str(json)?;
    Ok(resp.results.into_iter().filter_map(normalize_post).collect())
}

#[async_trait]
impl NewsFeed for CryptoPanic {
    fn name(&self) -> &str {
        "cryptopanic"
    }

    fn capabilities(&self) -> FeedCapabilities {
        FeedCapabilities { native_period: true, native_order: true, votes: true }
    }

    async fn fetch_news(&self, filters: &FilterState) -> Result<Vec<Article>, FeedError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FeedError::MissingCredential("CRYPTOPANIC_API_KEY"))?;

        let req = self.client.get(&self.base_url).query(&self.query(api_key, filters));
        let body = fetch_body(req).await?;
        non_empty(parse_posts(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {
                "kind": "news",
                "domain": "coindesk.com",
                "source": {"title": "CoinDesk", "region": "en", "domain": "coindesk.com"},
                "title": "Bitcoin Tops $70K",
                "published_at": "2024-03-10T10:00:00Z",
                "slug": "Bitcoin-Tops-70K",
                "currencies": [{"code": "BTC", "title": "Bitcoin", "slug": "bitcoin", "url": "https://cryptopanic.com/news/bitcoin/"}],
                "id": 19384721,
                "url": "https://cryptopanic.com/news/19384721/Bitcoin-Tops-70K",
                "created_at": "2024-03-10T10:00:05Z",
                "votes": {"negative": 1, "positive": 7, "important": 2, "liked": 3, "disliked": 0, "lol": 0, "toxic": 0, "saved": 1, "comments": 4},
                "metadata": {"image": "https://img.example.com/btc.png"}
            },
            {
                "kind": "news",
                "source": {"title": "Decrypt", "region": "en"},
                "title": "Ethereum devs set Dencun date",
                "published_at": "2024-03-09T08:30:00+02:00",
                "id": 19384000,
                "url": "https://decrypt.co/1234/ethereum-dencun",
                "created_at": "2024-03-09T06:30:00Z"
            },
            {
                "kind": "news",
                "title": "   ",
                "published_at": "2024-03-09T08:30:00Z",
                "id": 3,
                "url": "https://example.com/empty"
            }
        ]
    }"#;

    #[test]
    fn test_parse_posts() {
        let articles = parse_posts(SAMPLE).unwrap();
        assert_eq!(articles.len(), 2);

        let a = &articles[0];
        assert_eq!(a.id, "19384721");
        assert_eq!(a.title, "Bitcoin Tops $70K");
        assert_eq!(a.domain, "coindesk.com");
        assert_eq!(a.source_name, "CoinDesk");
        assert_eq!(a.sentiment, Some(Sentiment::Positive));
        assert_eq!(a.votes.as_ref().map(|v| v.comments), Some(4));
        assert_eq!(a.image_url.as_deref(), Some("https://img.example.com/btc.png"));
        assert_eq!(a.currencies, vec!["BTC".to_string()]);
    }

    #[test]
    fn test_parse_posts_derives_domain_and_normalizes_time() {
        let articles = parse_posts(SAMPLE).unwrap();
        let b = &articles[1];
        assert_eq!(b.domain, "decrypt.co");
        assert_eq!(b.published_at, "2024-03-09T06:30:00Z");
        assert_eq!(b.votes, None);
        assert_eq!(b.sentiment, None);
        assert_eq!(b.image_url, None);
    }

    #[test]
    fn test_parse_posts_rejects_bad_shape() {
        assert!(matches!(parse_posts("{\"results\": 5}"), Err(FeedError::Parse(_))));
        assert!(matches!(parse_posts("<html>"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_query_includes_period() {
        let feed = CryptoPanic::new(Some("k".to_string()), &CryptoPanicConfig::default());
        let filters = FilterState { period: Some("24h".to_string()), ..Default::default() };
        let params = feed.query("k", &filters);
        assert!(params.contains(&("filter", "24h".to_string())));
        assert!(params.contains(&("auth_token", "k".to_string())));

        let latest = feed.query("k", &FilterState::default());
        assert!(latest.iter().all(|(k, _)| *k != "filter"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let feed = CryptoPanic::new(None, &CryptoPanicConfig::default());
        let err = feed.fetch_news(&FilterState::default()).await.unwrap_err();
        assert!(matches!(err, FeedError::MissingCredential("CRYPTOPANIC_API_KEY")));
    }
}
