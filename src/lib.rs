pub mod bookmarks;
pub mod config;
pub mod engine;
pub mod feed;
pub mod filter;
pub mod i18n;
pub mod notify;
pub mod prefs;
pub mod storage;
pub mod ticker;
pub mod tui;
