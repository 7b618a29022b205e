use crate::bookmarks::BookmarkStore;
use crate::feed::fallback::NewsAggregator;
use crate::filter::FilterState;
use crate::notify::{NoticeLevel, Notifier};
use crate::prefs::Preferences;
use crate::tui::state::AppState;
use crate::tui::TuiCommand;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Starts news fetches in the background and publishes their batches.
///
/// Each request takes the next generation number. A batch is published only
/// if no newer request was made in the meantime, so a slow fetch for old
/// filters can never replace the results of a newer one.
#[derive(Clone)]
pub struct NewsRefresher {
    aggregator: Arc<NewsAggregator>,
    state_tx: watch::Sender<AppState>,
    latest: Arc<AtomicU64>,
    runtime: Handle,
}

impl NewsRefresher {
    /// Must be called from inside a tokio runtime; fetches are spawned onto it.
    pub fn new(aggregator: Arc<NewsAggregator>, state_tx: watch::Sender<AppState>) -> Self {
        Self {
            aggregator,
            state_tx,
            latest: Arc::new(AtomicU64::new(0)),
            runtime: Handle::current(),
        }
    }

    pub fn feed_names(&self) -> Vec<&str> {
        self.aggregator.feed_names()
    }

    /// Resolves to whether the batch was published.
    pub fn refresh(&self, filters: FilterState) -> JoinHandle<bool> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_modify(|s| s.loading = true);

        let aggregator = self.aggregator.clone();
        let state_tx = self.state_tx.clone();
        let latest = self.latest.clone();
        self.runtime.spawn(async move {
            let outcome = aggregator.fetch(&filters).await;
            let origin = outcome.origin.label().to_string();
            let count = outcome.articles.len();

            // Compare under the watch lock so a newer batch cannot land in between.
            let published = state_tx.send_if_modified(|s| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                s.articles = outcome.articles;
                s.origin = Some(outcome.origin);
                s.loading = false;
                s.last_updated = Some(chrono::Utc::now());
                true
            });

            if published {
                tracing::debug!(generation, origin, count, "news refresh published");
            } else {
                tracing::debug!(generation, origin, count, "stale news refresh dropped");
            }
            published
        })
    }
}

/// Sole owner of bookmarks and preferences. Applies UI commands and mirrors
/// the results into the shared state.
pub struct Engine {
    bookmarks: BookmarkStore,
    prefs: Preferences,
    refresher: NewsRefresher,
    state_tx: watch::Sender<AppState>,
    notifier: Notifier,
}

impl Engine {
    pub fn new(
        bookmarks: BookmarkStore,
        prefs: Preferences,
        refresher: NewsRefresher,
        state_tx: watch::Sender<AppState>,
        notifier: Notifier,
    ) -> Self {
        Self { bookmarks, prefs, refresher, state_tx, notifier }
    }

    /// Returns false once the UI asked to quit.
    pub fn handle(&mut self, cmd: TuiCommand) -> bool {
        match cmd {
            TuiCommand::Quit => return false,
            TuiCommand::Refresh => {
                self.notifier.notify(NoticeLevel::Info, "notice.refreshing", None);
                self.refresher.refresh(self.prefs.filters().clone());
            }
            TuiCommand::SetFilters(filters) => {
                self.prefs.set_filters(filters.clone());
                self.state_tx.send_modify(|s| s.filters = filters.clone());
                self.refresher.refresh(filters);
            }
            TuiCommand::ToggleBookmark(article) => {
                self.bookmarks.toggle(&article);
                let snapshot = self.bookmarks.bookmarks().to_vec();
                self.state_tx.send_modify(|s| s.bookmarks = snapshot);
            }
            TuiCommand::ClearBookmarks => {
                self.bookmarks.clear();
                self.state_tx.send_modify(|s| s.bookmarks.clear());
            }
            TuiCommand::SetLanguage(language) => {
                self.prefs.set_language(language);
                self.state_tx.send_modify(|s| s.language = language);
            }
            TuiCommand::ToggleTheme => {
                let theme = self.prefs.toggle_theme();
                self.state_tx.send_modify(|s| s.theme = theme);
            }
        }
        true
    }

    /// Blocking command loop. Bookmark and preference writes hit the disk, so
    /// this runs on `spawn_blocking` rather than on a runtime worker.
    pub fn run(mut self, mut cmd_rx: mpsc::Receiver<TuiCommand>) {
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if !self.handle(cmd) {
                break;
            }
        }
        tracing::debug!("engine loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::Article;
    use crate::feed::{FeedCapabilities, FeedError, NewsFeed};
    use crate::prefs::{Language, Theme};
    use crate::storage::{FileStore, MemoryStore};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers with one article whose domain is the requested source. The
    /// "slow.example" source takes much longer than the others.
    struct EchoFeed;

    #[async_trait]
    impl NewsFeed for EchoFeed {
        fn name(&self) -> &str {
            "echo"
        }

        fn capabilities(&self) -> FeedCapabilities {
            FeedCapabilities { native_period: true, native_order: true, votes: false }
        }

        async fn fetch_news(&self, filters: &FilterState) -> Result<Vec<Article>, FeedError> {
            let source = filters.source().unwrap_or("any.example").to_string();
            let delay = if source == "slow.example" { 300 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![article(&source)])
        }
    }

    fn article(domain: &str) -> Article {
        Article {
            id: domain.to_string(),
            title: format!("News from {}", domain),
            published_at: "2024-03-10T10:00:00Z".to_string(),
            url: format!("https://{}/1", domain),
            source_name: domain.to_string(),
            domain: domain.to_string(),
            description: None,
            votes: None,
            sentiment: None,
            image_url: None,
            currencies: Vec::new(),
        }
    }

    fn by_source(source: &str) -> FilterState {
        FilterState { source: Some(source.to_string()), ..Default::default() }
    }

    fn channel() -> (watch::Sender<AppState>, watch::Receiver<AppState>) {
        watch::channel(AppState::new(Language::En, Theme::Dark, FilterState::default(), Vec::new()))
    }

    fn refresher(state_tx: watch::Sender<AppState>) -> NewsRefresher {
        let aggregator = NewsAggregator::new(vec![Box::new(EchoFeed)], Duration::from_secs(5), Notifier::silent());
        NewsRefresher::new(Arc::new(aggregator), state_tx)
    }

    #[tokio::test]
    async fn test_older_refresh_finishing_last_is_dropped() {
        let (state_tx, state_rx) = channel();
        let refresher = refresher(state_tx);

        let older = refresher.refresh(by_source("slow.example"));
        let newer = refresher.refresh(by_source("fast.example"));
        assert!(newer.await.unwrap());
        assert!(!older.await.unwrap());

        let state = state_rx.borrow();
        assert_eq!(state.articles.len(), 1);
        assert_eq!(state.articles[0].domain, "fast.example");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_refreshes_in_order_both_publish() {
        let (state_tx, state_rx) = channel();
        let refresher = refresher(state_tx);

        assert!(refresher.refresh(by_source("a.example")).await.unwrap());
        assert!(refresher.refresh(by_source("b.example")).await.unwrap());
        assert_eq!(state_rx.borrow().articles[0].domain, "b.example");
    }

    #[tokio::test]
    async fn test_loading_stays_set_until_latest_lands() {
        let (state_tx, state_rx) = channel();
        let refresher = refresher(state_tx);

        let first = refresher.refresh(by_source("a.example"));
        let second = refresher.refresh(by_source("slow.example"));
        assert!(!first.await.unwrap());
        assert!(state_rx.borrow().loading);
        assert!(second.await.unwrap());
        assert!(!state_rx.borrow().loading);
    }

    #[tokio::test]
    async fn test_engine_runs_off_the_runtime_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let (state_tx, state_rx) = channel();
        let bookmarks = BookmarkStore::load(Box::new(FileStore::new(tmp.path())), Notifier::silent());
        let prefs = Preferences::load(Box::new(MemoryStore::new()), Notifier::silent());
        let engine = Engine::new(bookmarks, prefs, refresher(state_tx.clone()), state_tx, Notifier::silent());

        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let worker = tokio::task::spawn_blocking(move || engine.run(cmd_rx));

        cmd_tx.send(TuiCommand::ToggleBookmark(article("coindesk.com"))).await.unwrap();
        cmd_tx.send(TuiCommand::ToggleTheme).await.unwrap();
        cmd_tx.send(TuiCommand::SetLanguage(Language::Tr)).await.unwrap();
        cmd_tx.send(TuiCommand::Quit).await.unwrap();
        worker.await.unwrap();

        let state = state_rx.borrow();
        assert_eq!(state.bookmarks, vec![article("coindesk.com")]);
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(state.language, Language::Tr);
        assert!(tmp.path().join("crypto-news-bookmarks.json").exists());
    }

    #[tokio::test]
    async fn test_set_filters_persists_and_publishes() {
        let (state_tx, mut state_rx) = channel();
        let bookmarks = BookmarkStore::load(Box::new(MemoryStore::new()), Notifier::silent());
        let prefs = Preferences::load(Box::new(MemoryStore::new()), Notifier::silent());
        let mut engine = Engine::new(bookmarks, prefs, refresher(state_tx.clone()), state_tx, Notifier::silent());

        assert!(engine.handle(TuiCommand::SetFilters(by_source("fast.example"))));
        assert_eq!(engine.prefs.filters(), &by_source("fast.example"));
        assert_eq!(state_rx.borrow().filters, by_source("fast.example"));

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                state_rx.changed().await.unwrap();
                if !state_rx.borrow_and_update().loading {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(state_rx.borrow().articles[0].domain, "fast.example");

        assert!(!engine.handle(TuiCommand::Quit));
    }
}
