use crate::config::TickerConfig;
use crate::feed::{fetch_body, http_client, FeedError};
use crate::notify::Notifier;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One row of the CoinGecko `/coins/markets` response (only the fields we show).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price_change_percentage_24h: f64,
}

/// CoinGecko sends `null` for coins without a recent trade.
fn null_as_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(0.0))
}

#[derive(Debug, Clone)]
pub struct TickerOutcome {
    pub coins: Vec<Coin>,
    pub live: bool,
}

pub struct PriceTicker {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    vs_currency: String,
    per_page: u32,
    timeout: Duration,
    degraded: AtomicBool,
    notifier: Notifier,
}

impl PriceTicker {
    pub fn new(api_key: Option<String>, config: &TickerConfig, notifier: Notifier) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: config.base_url.clone(),
            vs_currency: config.vs_currency.clone(),
            per_page: config.per_page,
            timeout: Duration::from_secs(config.request_timeout_s),
            degraded: AtomicBool::new(false),
            notifier,
        }
    }

    pub async fn fetch_coins(&self) -> Result<Vec<Coin>, FeedError> {
        if self.base_url.trim().is_empty() {
            return Err(FeedError::Rejected("ticker base_url is not configured".to_string()));
        }

        let mut req = self.client.get(&self.base_url).query(&[
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
        ]);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key.as_str());
        }

        let body = match tokio::time::timeout(self.timeout, fetch_body(req)).await {
            Ok(body) => body?,
            Err(_) => return Err(FeedError::Timeout(self.timeout)),
        };
        let coins = parse_markets(&body)?;
        if coins.is_empty() {
            return Err(FeedError::Empty);
        }
        Ok(coins)
    }

    /// Live prices, or the bundled list when the endpoint is unusable.
    /// Warns once per transition into the degraded state.
    pub async fn refresh(&self) -> TickerOutcome {
        match self.fetch_coins().await {
            Ok(coins) => {
                self.degraded.store(false, Ordering::Relaxed);
                TickerOutcome { coins, live: true }
            }
            Err(e) => {
                tracing::warn!(error = %e, "price ticker fetch failed, using fallback list");
                if !self.degraded.swap(true, Ordering::Relaxed) {
                    self.notifier.warning("notice.ticker_fallback", Some(e.to_string()));
                }
                TickerOutcome { coins: fallback_coins(), live: false }
            }
        }
    }
}

pub fn parse_markets(json: &str) -> Result<Vec<Coin>, FeedError> {
    Ok(serde_json::from_str(json)?)
}

pub fn fallback_coins() -> Vec<Coin> {
    [
        ("bitcoin", "btc", "Bitcoin", 67_250.00, 1.85),
        ("ethereum", "eth", "Ethereum", 3_480.50, 2.40),
        ("tether", "usdt", "Tether", 1.00, 0.01),
        ("binancecoin", "bnb", "BNB", 585.20, -0.75),
        ("solana", "sol", "Solana", 148.90, 4.10),
        ("ripple", "xrp", "XRP", 0.62, -1.30),
        ("usd-coin", "usdc", "USDC", 1.00, 0.00),
        ("cardano", "ada", "Cardano", 0.71, -2.05),
        ("dogecoin", "doge", "Dogecoin", 0.16, 3.20),
        ("litecoin", "ltc", "Litecoin", 92.40, 0.55),
    ]
    .into_iter()
    .map(|(id, symbol, name, price, change)| Coin {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        image: String::new(),
        current_price: price,
        price_change_percentage_24h: change,
    })
    .collect()
}

/// `$67,250.00`
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// `+1.85%` / `-0.75%`
pub fn format_change(change: f64) -> String {
    format!("{:+.2}%", change)
}
