// Integration tests for the provider fallback chain

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crypto_vibe::config::{CryptoPanicConfig, NewsApiConfig};
    use crypto_vibe::feed::cryptopanic::CryptoPanic;
    use crypto_vibe::feed::fallback::{BatchOrigin, NewsAggregator};
    use crypto_vibe::feed::newsapi::NewsApi;
    use crypto_vibe::feed::samples::sample_articles;
    use crypto_vibe::feed::types::Article;
    use crypto_vibe::feed::{FeedCapabilities, FeedError, NewsFeed};
    use crypto_vibe::filter::FilterState;
    use crypto_vibe::notify::{NoticeLevel, Notifier};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct FakeFeed {
        name: String,
        result: Option<Vec<Article>>,
        calls: CallLog,
    }

    #[async_trait]
    impl NewsFeed for FakeFeed {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> FeedCapabilities {
            FeedCapabilities { native_period: true, native_order: true, votes: false }
        }

        async fn fetch_news(&self, _filters: &FilterState) -> Result<Vec<Article>, FeedError> {
            self.calls.lock().unwrap().push(self.name.clone());
            match &self.result {
                Some(articles) => Ok(articles.clone()),
                None => Err(FeedError::Rejected("scripted failure".to_string())),
            }
        }
    }

    fn fake(name: &str, result: Option<Vec<Article>>, calls: &CallLog) -> Box<dyn NewsFeed> {
        Box::new(FakeFeed { name: name.to_string(), result, calls: calls.clone() })
    }

    fn article_a() -> Article {
        Article {
            id: "a".to_string(),
            title: "Article A".to_string(),
            published_at: "2024-03-10T10:00:00Z".to_string(),
            url: "https://news.example.com/a".to_string(),
            source_name: "Example".to_string(),
            domain: "news.example.com".to_string(),
            description: None,
            votes: None,
            sentiment: None,
            image_url: None,
            currencies: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_third_provider_wins_after_two_failures() {
        let calls: CallLog = Arc::default();
        let aggregator = NewsAggregator::new(
            vec![
                fake("first", None, &calls),
                fake("second", None, &calls),
                fake("third", Some(vec![article_a()]), &calls),
            ],
            Duration::from_secs(1),
            Notifier::silent(),
        );

        let outcome = aggregator.fetch(&FilterState::default()).await;
        assert_eq!(outcome.articles, vec![article_a()]);
        assert_eq!(outcome.origin, BatchOrigin::Provider("third".to_string()));
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_total_failure_yields_samples_and_one_warning() {
        let calls: CallLog = Arc::default();
        let (notifier, mut rx) = Notifier::channel();
        let aggregator = NewsAggregator::new(
            vec![fake("first", None, &calls), fake("second", Some(Vec::new()), &calls)],
            Duration::from_secs(1),
            notifier,
        );

        let outcome = aggregator.fetch(&FilterState::default()).await;
        assert_eq!(outcome.origin, BatchOrigin::Samples);

        let mut got: Vec<_> = outcome.articles.iter().map(|a| a.id.clone()).collect();
        let mut want: Vec<_> = sample_articles().iter().map(|a| a.id.clone()).collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.key, "notice.samples");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_keyless_providers_fall_through_to_samples() {
        let aggregator = NewsAggregator::new(
            vec![
                Box::new(CryptoPanic::new(None, &CryptoPanicConfig::default())),
                Box::new(NewsApi::new(None, &NewsApiConfig::default())),
            ],
            Duration::from_secs(1),
            Notifier::silent(),
        );
        assert_eq!(aggregator.feed_names(), vec!["cryptopanic", "newsapi"]);

        let outcome = aggregator.fetch(&FilterState::default()).await;
        assert_eq!(outcome.origin, BatchOrigin::Samples);
        assert!(!outcome.articles.is_empty());
    }

    #[tokio::test]
    async fn test_search_applies_to_fallback_batch() {
        let aggregator = NewsAggregator::new(Vec::new(), Duration::from_secs(1), Notifier::silent());
        let filters = FilterState { search: Some("bitcoin".to_string()), ..Default::default() };

        let outcome = aggregator.fetch(&filters).await;
        assert_eq!(outcome.articles.len(), 2);
        assert!(outcome.articles.iter().all(|a| {
            a.title.to_lowercase().contains("bitcoin")
                || a.description.as_deref().unwrap_or("").to_lowercase().contains("bitcoin")
        }));
    }

    #[tokio::test]
    async fn test_period_filter_keeps_fallback_batch_populated() {
        let calls: CallLog = Arc::default();
        let aggregator = NewsAggregator::new(
            vec![fake("first", None, &calls)],
            Duration::from_secs(1),
            Notifier::silent(),
        );
        let filters = FilterState { period: Some("24h".to_string()), ..Default::default() };

        let outcome = aggregator.fetch(&filters).await;
        assert_eq!(outcome.origin, BatchOrigin::Samples);
        assert_eq!(outcome.articles.len(), sample_articles().len());
    }
}
