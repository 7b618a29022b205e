use crate::prefs::Language;
use chrono::{DateTime, Utc};

type Table = &'static [(&'static str, &'static str)];

const EN: Table = &[
    ("app.name", "CryptoVibe"),
    ("nav.dashboard", "Dashboard"),
    ("nav.bookmarks", "Bookmarks"),
    ("index.title", "Crypto News"),
    ("index.subtitle", "The latest updates from the crypto world"),
    ("bookmarks.title", "Bookmarked News"),
    ("bookmarks.subtitle", "Your saved crypto news articles"),
    ("search.placeholder", "Search news..."),
    ("search.button", "Search"),
    ("filter.sentiment", "Sentiment"),
    ("filter.source", "Source"),
    ("filter.time", "Time"),
    ("filter.filters", "Filters"),
    ("filter.clearAll", "Clear All"),
    ("filter.reset", "Reset All"),
    ("sentiment.all", "All"),
    ("sentiment.positive", "Positive"),
    ("sentiment.neutral", "Neutral"),
    ("sentiment.negative", "Negative"),
    ("time.latest", "Latest"),
    ("time.24h", "Past 24 Hours"),
    ("time.week", "Past Week"),
    ("source.all", "All Sources"),
    ("button.refresh", "Refresh"),
    ("button.retry", "Retry"),
    ("button.bookmark", "Bookmark"),
    ("button.bookmarked", "Bookmarked"),
    ("button.read", "Read"),
    ("button.theme", "Theme"),
    ("button.language", "Language"),
    ("button.quit", "Quit"),
    ("button.clear", "Clear"),
    ("empty.bookmarks.title", "No bookmarks yet"),
    ("empty.bookmarks.description", "You haven't bookmarked any articles yet. Go to the dashboard and bookmark articles to see them here."),
    ("empty.news.title", "No Results Found"),
    ("empty.news.description", "No news found matching your criteria. Please adjust your filters."),
    ("loading.news", "Loading News..."),
    ("crypto.loading", "Loading prices..."),
    ("error.loading", "Error loading news data. Please try again later."),
    ("status.source", "Source"),
    ("status.samples", "sample data"),
    ("notice.samples", "Live news is unavailable, showing sample articles"),
    ("notice.bookmark_added", "Article bookmarked"),
    ("notice.bookmark_removed", "Bookmark removed"),
    ("notice.bookmarks_cleared", "Bookmarks cleared"),
    ("notice.storage_failed", "Could not save your data; changes last until exit"),
    ("notice.refreshing", "Refreshing news..."),
    ("notice.ticker_fallback", "Price data unavailable, showing last known prices"),
    ("time.just_now", "just now"),
    ("time.minutes_ago", "{n} minutes ago"),
    ("time.hours_ago", "{n} hours ago"),
    ("time.days_ago", "{n} days ago"),
];

const TR: Table = &[
    ("app.name", "KriptoVibe"),
    ("nav.dashboard", "Ana Sayfa"),
    ("nav.bookmarks", "Kaydedilenler"),
    ("index.title", "Kripto Haberleri"),
    ("index.subtitle", "Kripto dünyasından son gelişmeler"),
    ("bookmarks.title", "Kaydedilen Haberler"),
    ("bookmarks.subtitle", "Kaydettiğiniz kripto haber makaleleri"),
    ("search.placeholder", "Haberlerde ara..."),
    ("search.button", "Ara"),
    ("filter.sentiment", "Duygu"),
    ("filter.source", "Kaynak"),
    ("filter.time", "Zaman"),
    ("filter.filters", "Filtreler"),
    ("filter.clearAll", "Hepsini Temizle"),
    ("filter.reset", "Tümünü Sıfırla"),
    ("sentiment.all", "Tümü"),
    ("sentiment.positive", "Olumlu"),
    ("sentiment.neutral", "Nötr"),
    ("sentiment.negative", "Olumsuz"),
    ("time.latest", "En Yeni"),
    ("time.24h", "Son 24 Saat"),
    ("time.week", "Geçen Hafta"),
    ("source.all", "Tüm Kaynaklar"),
    ("button.refresh", "Yenile"),
    ("button.retry", "Tekrar Dene"),
    ("button.bookmark", "Kaydet"),
    ("button.bookmarked", "Kaydedildi"),
    ("button.read", "Oku"),
    ("button.theme", "Tema"),
    ("button.language", "Dil"),
    ("button.quit", "Çıkış"),
    ("button.clear", "Temizle"),
    ("empty.bookmarks.title", "Henüz kaydedilmiş haber yok"),
    ("empty.bookmarks.description", "Henüz hiç makale kaydetmediniz. Ana sayfaya giderek haberleri kaydedebilirsiniz."),
    ("empty.news.title", "Sonuç Bulunamadı"),
    ("empty.news.description", "Aramanıza uygun haber bulunamadı. Lütfen filtrelerinizi değiştirin."),
    ("loading.news", "Haberler Yükleniyor..."),
    ("crypto.loading", "Fiyatlar yükleniyor..."),
    ("error.loading", "Haber verileri yüklenirken hata oluştu. Lütfen daha sonra tekrar deneyin."),
    ("status.source", "Kaynak"),
    ("status.samples", "örnek veri"),
    ("notice.samples", "Canlı haberlere ulaşılamıyor, örnek haberler gösteriliyor"),
    ("notice.bookmark_added", "Haber kaydedildi"),
    ("notice.bookmark_removed", "Kayıt kaldırıldı"),
    ("notice.bookmarks_cleared", "Kaydedilenler temizlendi"),
    ("notice.storage_failed", "Verileriniz kaydedilemedi; değişiklikler çıkışa kadar geçerli"),
    ("notice.refreshing", "Haberler yenileniyor..."),
    ("notice.ticker_fallback", "Fiyat verisi alınamadı, son bilinen fiyatlar gösteriliyor"),
    ("time.just_now", "az önce"),
    ("time.minutes_ago", "{n} dakika önce"),
    ("time.hours_ago", "{n} saat önce"),
    ("time.days_ago", "{n} gün önce"),
];

/// Known news sources: (domain, display label).
pub const NEWS_SOURCES: &[(&str, &str)] = &[
    ("coindesk.com", "CoinDesk"),
    ("cointelegraph.com", "CoinTelegraph"),
    ("decrypt.co", "Decrypt"),
    ("bitcoinmagazine.com", "Bitcoin Magazine"),
    ("theblockcrypto.com", "The Block"),
];

fn table(language: Language) -> Table {
    match language {
        Language::En => EN,
        Language::Tr => TR,
    }
}

/// Translate `key`; unknown keys come back unchanged.
pub fn t<'a>(language: Language, key: &'a str) -> &'a str {
    table(language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

pub fn source_label(domain: &str) -> &str {
    NEWS_SOURCES
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, label)| *label)
        .unwrap_or(domain)
}

/// "5 minutes ago" / "5 dakika önce". Future timestamps read as "just now".
pub fn time_ago(language: Language, published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - published).num_seconds();
    let (key, n) = if secs < 60 {
        return t(language, "time.just_now").to_string();
    } else if secs < 3600 {
        ("time.minutes_ago", secs / 60)
    } else if secs < 86_400 {
        ("time.hours_ago", secs / 3600)
    } else {
        ("time.days_ago", secs / 86_400)
    };
    t(language, key).replace("{n}", &n.to_string())
}
