use super::types::{Article, Votes};

struct Sample {
    id: &'static str,
    title: &'static str,
    published_at: &'static str,
    url: &'static str,
    source_name: &'static str,
    domain: &'static str,
    description: &'static str,
    positive: u32,
    negative: u32,
    currencies: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "sample-1",
        title: "Bitcoin holds above key support as ETF inflows continue",
        published_at: "2024-03-12T14:30:00Z",
        url: "https://www.coindesk.com/markets/bitcoin-holds-key-support",
        source_name: "CoinDesk",
        domain: "coindesk.com",
        description: "Spot bitcoin ETFs recorded another day of net inflows while BTC consolidated.",
        positive: 12,
        negative: 3,
        currencies: &["BTC"],
    },
    Sample {
        id: "sample-2",
        title: "Ethereum developers confirm next network upgrade timeline",
        published_at: "2024-03-12T11:05:00Z",
        url: "https://cointelegraph.com/news/ethereum-upgrade-timeline",
        source_name: "CoinTelegraph",
        domain: "cointelegraph.com",
        description: "Core developers agreed on testnet dates ahead of the mainnet fork.",
        positive: 6,
        negative: 1,
        currencies: &["ETH"],
    },
    Sample {
        id: "sample-3",
        title: "Exchange outage leaves traders unable to close positions",
        published_at: "2024-03-11T22:45:00Z",
        url: "https://decrypt.co/news/exchange-outage-traders",
        source_name: "Decrypt",
        domain: "decrypt.co",
        description: "A two-hour outage during peak volatility drew complaints from users.",
        positive: 1,
        negative: 9,
        currencies: &[],
    },
    Sample {
        id: "sample-4",
        title: "Lightning Network capacity reaches new high",
        published_at: "2024-03-11T16:20:00Z",
        url: "https://bitcoinmagazine.com/technical/lightning-capacity-high",
        source_name: "Bitcoin Magazine",
        domain: "bitcoinmagazine.com",
        description: "Public channel capacity grew steadily over the past quarter.",
        positive: 4,
        negative: 4,
        currencies: &["BTC"],
    },
    Sample {
        id: "sample-5",
        title: "Stablecoin supply climbs for the fifth straight week",
        published_at: "2024-03-10T09:00:00Z",
        url: "https://www.theblockcrypto.com/data/stablecoin-supply",
        source_name: "The Block",
        domain: "theblockcrypto.com",
        description: "Aggregate stablecoin market cap rose as on-chain activity picked up.",
        positive: 0,
        negative: 0,
        currencies: &["USDT", "USDC"],
    },
    Sample {
        id: "sample-6",
        title: "XRP and LTC lead altcoin rebound",
        published_at: "2024-03-09T18:10:00Z",
        url: "https://www.coindesk.com/markets/altcoin-rebound",
        source_name: "CoinDesk",
        domain: "coindesk.com",
        description: "Large-cap altcoins outperformed bitcoin over the weekend.",
        positive: 5,
        negative: 2,
        currencies: &["XRP", "LTC"],
    },
];

/// Bundled articles shown when every live provider fails.
pub fn sample_articles() -> Vec<Article> {
    SAMPLES
        .iter()
        .map(|s| {
            Article {
                id: s.id.to_string(),
                title: s.title.to_string(),
                published_at: s.published_at.to_string(),
                url: s.url.to_string(),
                source_name: s.source_name.to_string(),
                domain: s.domain.to_string(),
                description: Some(s.description.to_string()),
                votes: None,
                sentiment: None,
                image_url: None,
                currencies: s.currencies.iter().map(|c| c.to_string()).collect(),
            }
            .with_votes(Votes {
                positive: s.positive,
                negative: s.negative,
                ..Default::default()
            })
        })
        .collect()
}
