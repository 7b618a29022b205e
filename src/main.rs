use anyhow::{Context, Result};
use crypto_vibe::bookmarks::BookmarkStore;
use crypto_vibe::config::Config;
use crypto_vibe::engine::{Engine, NewsRefresher};
use crypto_vibe::feed::fallback::NewsAggregator;
use crypto_vibe::notify::Notifier;
use crypto_vibe::prefs::Preferences;
use crypto_vibe::storage::{FileStore, KvStore, MemoryStore};
use crypto_vibe::ticker::PriceTicker;
use crypto_vibe::tui::{self, state::AppState, TuiCommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

/// `--config <path>` or `--config=<path>`; `None` means the default location.
fn config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// One store per owner; both point at the same directory when it is usable.
fn open_store(data_dir: Option<&Path>) -> Box<dyn KvStore> {
    match data_dir {
        Some(dir) => Box::new(FileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("crypto-vibe.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crypto_vibe=info")),
        )
        .with_ansi(false)
        .with_writer(log_file)
        .init();

    let config = match config_arg() {
        Some(path) => Config::load(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(Path::new(DEFAULT_CONFIG))?,
        None => Config::default(),
    };

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    println!();
    println!("  Crypto Vibe v{}", env!("CARGO_PKG_VERSION"));
    println!("  ==================");
    println!();

    let feeds = config.build_feeds().context("Invalid [news] providers")?;
    for (name, key) in [
        ("cryptopanic", Config::cryptopanic_api_key()),
        ("cryptocompare", Config::cryptocompare_api_key()),
        ("newsapi", Config::newsapi_api_key()),
    ] {
        if config.news.providers.iter().any(|p| p.eq_ignore_ascii_case(name)) {
            let status = if key.is_some() { "key loaded" } else { "no key" };
            println!("  {:<14} {}", name, status);
        }
    }

    let data_dir = match config.storage.data_dir.clone() {
        Some(dir) => Some(dir),
        None => match FileStore::default_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                tracing::warn!(error = %e, "no data directory, bookmarks will not persist");
                None
            }
        },
    };
    match &data_dir {
        Some(dir) => println!("  Data: {}", dir.display()),
        None => println!("  Data: in-memory only"),
    }
    println!();

    let (notifier, mut notice_rx) = Notifier::channel();
    let load_notifier = notifier.clone();
    let (bookmarks, prefs) = tokio::task::spawn_blocking(move || {
        let bookmarks = BookmarkStore::load(open_store(data_dir.as_deref()), load_notifier.clone());
        let prefs = Preferences::load(open_store(data_dir.as_deref()), load_notifier);
        (bookmarks, prefs)
    })
    .await
    .context("Failed to load saved data")?;

    // Channels
    let (state_tx, state_rx) = watch::channel(AppState::new(
        prefs.language(),
        prefs.theme(),
        prefs.filters().clone(),
        bookmarks.bookmarks().to_vec(),
    ));
    let (cmd_tx, cmd_rx) = mpsc::channel::<TuiCommand>(16);

    let aggregator = Arc::new(NewsAggregator::new(
        feeds,
        Duration::from_secs(config.news.request_timeout_s),
        notifier.clone(),
    ));
    let refresher = NewsRefresher::new(aggregator, state_tx.clone());
    let ticker = Arc::new(PriceTicker::new(
        Config::coingecko_api_key(),
        &config.ticker,
        notifier.clone(),
    ));
    tracing::info!(providers = ?refresher.feed_names(), "starting");

    // --- Notices -> state ---
    let state_tx_notices = state_tx.clone();
    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            state_tx_notices.send_modify(|s| s.push_notice(notice));
        }
    });

    // --- News refresh loop (first tick fires immediately) ---
    let news_every = Duration::from_secs(config.news.refresh_interval_s.max(1));
    let refresher_poll = refresher.clone();
    let state_rx_news = state_rx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(news_every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let filters = state_rx_news.borrow().filters.clone();
            refresher_poll.refresh(filters);
        }
    });

    // --- Price ticker loop ---
    let ticker_every = Duration::from_secs(config.ticker.refresh_interval_s.max(1));
    let state_tx_ticker = state_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ticker_every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let ticker = ticker.clone();
            let state_tx = state_tx_ticker.clone();
            tokio::spawn(async move {
                let outcome = ticker.refresh().await;
                state_tx.send_modify(|s| {
                    s.coins = outcome.coins;
                    s.ticker_live = outcome.live;
                });
            });
        }
    });

    // --- Engine: sole owner of bookmarks and preferences, on a blocking thread ---
    let engine = Engine::new(bookmarks, prefs, refresher, state_tx.clone(), notifier.clone());
    tokio::task::spawn_blocking(move || engine.run(cmd_rx));

    // --- Run TUI (blocks until quit) ---
    tui::run_tui(state_rx, cmd_tx).await?;

    tracing::debug!("shutting down");
    Ok(())
}
