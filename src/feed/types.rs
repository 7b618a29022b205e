use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Normalized article record shared by every provider (provider-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub published_at: String, // RFC 3339
    pub url: String,
    pub source_name: String,
    pub domain: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub votes: Option<Votes>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub currencies: Vec<String>,
}

impl Article {
    /// Parsed publication time, `None` when the provider sent something unparseable.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at)
    }

    /// Attach vote counts and derive the sentiment label from them.
    pub fn with_votes(mut self, votes: Votes) -> Self {
        self.sentiment = Some(calculate_sentiment(&votes));
        self.votes = Some(votes);
        self
    }
}

/// Aggregate engagement counts. Only `positive`/`negative` drive sentiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Votes {
    pub positive: u32,
    pub negative: u32,
    pub important: u32,
    pub liked: u32,
    pub disliked: u32,
    pub lol: u32,
    pub toxic: u32,
    pub saved: u32,
    pub comments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

pub fn calculate_sentiment(votes: &Votes) -> Sentiment {
    if votes.positive > votes.negative {
        Sentiment::Positive
    } else if votes.negative > votes.positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Resolve an article's domain: the url host without a leading `www.` when it
/// parses, else the provider's source label, else "unknown".
pub fn domain_from_url(raw_url: &str, fallback: Option<&str>) -> String {
    url::Url::parse(raw_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .map(|h| match h.strip_prefix("www.") {
            Some(bare) if !bare.is_empty() => bare.to_string(),
            _ => h,
        })
        .filter(|h| !h.is_empty())
        .or_else(|| {
            fallback
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Epoch seconds to an RFC 3339 UTC string (`2024-03-01T12:00:00Z`).
pub fn epoch_to_rfc3339(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
