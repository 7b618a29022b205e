use crate::feed::types::{Article, Sentiment};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// User-selected narrowing of the feed. Empty strings behave like `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub source: Option<String>,
    pub period: Option<String>,
    pub search: Option<String>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Day, Period::Week];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "24h" => Some(Period::Day),
            "week" => Some(Period::Week),
            _ => None,
        }
    }

    /// Value sent to providers that filter by period themselves.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "24h",
            Period::Week => "week",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Period::Day => Duration::hours(24),
            Period::Week => Duration::days(7),
        }
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FilterState {
    pub fn source(&self) -> Option<&str> {
        active(&self.source)
    }

    /// The term as typed; blank counts as no search.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn period(&self) -> Option<Period> {
        active(&self.period).and_then(Period::parse)
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        active(&self.sentiment).and_then(Sentiment::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.source().is_none()
            && self.search().is_none()
            && self.period().is_none()
            && self.sentiment().is_none()
    }
}

/// Which optional predicates apply to a batch. Search and source always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPlan {
    pub period: bool,
    pub sentiment: bool,
}

impl FilterPlan {
    pub const ALL: FilterPlan = FilterPlan { period: true, sentiment: true };
}

pub fn matches_search(article: &Article, term: &str) -> bool {
    let needle = term.to_lowercase();
    article.title.to_lowercase().contains(&needle)
        || article
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

pub fn matches_source(article: &Article, source: &str) -> bool {
    article.domain == source
}

/// Articles with an unparseable timestamp are kept.
pub fn within_period(article: &Article, period: Period, now: DateTime<Utc>) -> bool {
    match article.published() {
        Some(published) => published >= now - period.window(),
        None => true,
    }
}

pub fn matches(article: &Article, filters: &FilterState, plan: FilterPlan, now: DateTime<Utc>) -> bool {
    if let Some(term) = filters.search() {
        if !matches_search(article, term) {
            return false;
        }
    }
    if let Some(source) = filters.source() {
        if !matches_source(article, source) {
            return false;
        }
    }
    if plan.period {
        if let Some(period) = filters.period() {
            if !within_period(article, period, now) {
                return false;
            }
        }
    }
    if plan.sentiment {
        if let Some(wanted) = filters.sentiment() {
            if article.sentiment != Some(wanted) {
                return false;
            }
        }
    }
    true
}

/// Stable: surviving articles keep their relative order.
pub fn apply(
    articles: Vec<Article>,
    filters: &FilterState,
    plan: FilterPlan,
    now: DateTime<Utc>,
) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| matches(a, filters, plan, now))
        .collect()
}

/// Newest first, stable for equal timestamps, unparseable timestamps last.
pub fn sort_recent_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published().cmp(&a.published()));
}
