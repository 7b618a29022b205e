use crate::feed::cryptocompare::CryptoCompare;
use crate::feed::cryptopanic::CryptoPanic;
use crate::feed::newsapi::NewsApi;
use crate::feed::NewsFeed;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub cryptopanic: CryptoPanicConfig,
    #[serde(default)]
    pub cryptocompare: CryptoCompareConfig,
    #[serde(default)]
    pub newsapi: NewsApiConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsConfig {
    /// Provider names in fallback order.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_s: u64,
    #[serde(default = "default_news_refresh")]
    pub refresh_interval_s: u64,
}

fn default_providers() -> Vec<String> {
    vec!["cryptopanic".to_string(), "cryptocompare".to_string(), "newsapi".to_string()]
}
fn default_request_timeout() -> u64 { 10 }
fn default_news_refresh() -> u64 { 900 }

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            request_timeout_s: default_request_timeout(),
            refresh_interval_s: default_news_refresh(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CryptoPanicConfig {
    pub base_url: String,
    /// Comma-separated CryptoPanic currency codes or slugs.
    pub currencies: String,
    pub regions: String,
    pub kind: String,
}

impl Default for CryptoPanicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cryptopanic.com/api/v1/posts/".to_string(),
            currencies: "bitcoin,ethereum,litecoin,ripple".to_string(),
            regions: "en,tr".to_string(),
            kind: "news".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CryptoCompareConfig {
    pub base_url: String,
    pub lang: String,
}

impl Default for CryptoCompareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://min-api.cryptocompare.com/data/v2/news/".to_string(),
            lang: "EN".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub query: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/everything".to_string(),
            query: "bitcoin OR ethereum OR crypto".to_string(),
            language: "en".to_string(),
            page_size: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TickerConfig {
    pub base_url: String,
    pub vs_currency: String,
    pub per_page: u32,
    pub refresh_interval_s: u64,
    pub request_timeout_s: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3/coins/markets".to_string(),
            vs_currency: "usd".to_string(),
            per_page: 10,
            refresh_interval_s: 60,
            request_timeout_s: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    pub fn cryptopanic_api_key() -> Option<String> {
        env_key("CRYPTOPANIC_API_KEY")
    }

    pub fn cryptocompare_api_key() -> Option<String> {
        env_key("CRYPTOCOMPARE_API_KEY")
    }

    pub fn newsapi_api_key() -> Option<String> {
        env_key("NEWSAPI_API_KEY")
    }

    pub fn coingecko_api_key() -> Option<String> {
        env_key("COINGECKO_API_KEY")
    }

    /// Instantiate the configured providers in fallback order. A provider
    /// without its key is still built; it fails fast and the chain moves on.
    pub fn build_feeds(&self) -> Result<Vec<Box<dyn NewsFeed>>> {
        let mut feeds: Vec<Box<dyn NewsFeed>> = Vec::with_capacity(self.news.providers.len());
        for name in &self.news.providers {
            let feed: Box<dyn NewsFeed> = match name.trim().to_ascii_lowercase().as_str() {
                "cryptopanic" => Box::new(CryptoPanic::new(Self::cryptopanic_api_key(), &self.cryptopanic)),
                "cryptocompare" => Box::new(CryptoCompare::new(Self::cryptocompare_api_key(), &self.cryptocompare)),
                "newsapi" => Box::new(NewsApi::new(Self::newsapi_api_key(), &self.newsapi)),
                other => anyhow::bail!("Unknown news provider in config: {:?}", other),
            };
            feeds.push(feed);
        }
        Ok(feeds)
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| sanitize_key(&raw))
        .filter(|key| !key.is_empty())
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.news.providers, vec!["cryptopanic", "cryptocompare", "newsapi"]);
        assert_eq!(config.news.refresh_interval_s, 900);
        assert_eq!(config.ticker.refresh_interval_s, 60);
        assert_eq!(config.cryptopanic.regions, "en,tr");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[news]\nrequest_timeout_s = 3\n").unwrap();
        assert_eq!(config.news.request_timeout_s, 3);
        assert_eq!(config.news.providers.len(), 3);
        assert_eq!(config.newsapi.page_size, 50);
        assert_eq!(config.ticker.vs_currency, "usd");
    }

    #[test]
    fn test_build_feeds_follows_provider_order() {
        let mut config = Config::default();
        config.news.providers = vec!["newsapi".to_string(), "CryptoPanic".to_string()];
        let feeds = config.build_feeds().unwrap();
        let names: Vec<_> = feeds.iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["newsapi", "cryptopanic"]);

        config.news.providers = vec!["bloomberg".to_string()];
        assert!(config.build_feeds().is_err());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("\u{feff}abc123\r\n"), "abc123");
        assert_eq!(sanitize_key(" a\u{200b}b "), "ab");
    }
}
