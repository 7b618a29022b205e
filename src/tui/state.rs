use crate::feed::fallback::BatchOrigin;
use crate::feed::types::Article;
use crate::filter::FilterState;
use crate::notify::{Notice, NoticeLevel};
use crate::prefs::{Language, Theme};
use crate::ticker::Coin;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

const MAX_NOTICES: usize = 50;

/// Everything the engine publishes for the UI. Written through `watch::Sender::send_modify`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub articles: Vec<Article>,
    pub origin: Option<BatchOrigin>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub filters: FilterState,
    pub bookmarks: Vec<Article>,
    pub coins: Vec<Coin>,
    pub ticker_live: bool,
    pub notices: VecDeque<NoticeRow>,
    pub language: Language,
    pub theme: Theme,
}

#[derive(Debug, Clone)]
pub struct NoticeRow {
    pub time: String,
    pub level: NoticeLevel,
    pub key: &'static str,
    pub detail: Option<String>,
}

impl AppState {
    pub fn new(language: Language, theme: Theme, filters: FilterState, bookmarks: Vec<Article>) -> Self {
        Self {
            articles: Vec::new(),
            origin: None,
            loading: true,
            last_updated: None,
            filters,
            bookmarks,
            coins: Vec::new(),
            ticker_live: false,
            notices: VecDeque::with_capacity(MAX_NOTICES),
            language,
            theme,
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(NoticeRow {
            time,
            level: notice.level,
            key: notice.key,
            detail: notice.detail,
        });
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|b| b.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Bookmarks,
}

/// UI-local state: never leaves the TUI task.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub view: View,
    pub selected: usize,
    /// `Some` while the search box has focus.
    pub search_input: Option<String>,
}

impl ViewState {
    /// The list the current view is showing.
    pub fn rows<'a>(&self, state: &'a AppState) -> &'a [Article] {
        match self.view {
            View::Feed => &state.articles,
            View::Bookmarks => &state.bookmarks,
        }
    }

    pub fn selected_article<'a>(&self, state: &'a AppState) -> Option<&'a Article> {
        self.rows(state).get(self.selected)
    }

    /// Keep the cursor inside the list after it shrinks.
    pub fn clamp(&mut self, state: &AppState) {
        let len = self.rows(state).len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::samples::sample_articles;

    #[test]
    fn test_notice_ring_is_bounded() {
        let mut state = AppState::new(Language::En, Theme::Dark, FilterState::default(), Vec::new());
        for _ in 0..(MAX_NOTICES + 5) {
            state.push_notice(Notice { level: NoticeLevel::Info, key: "notice.refreshing", detail: None });
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
    }

    #[test]
    fn test_clamp_after_list_shrinks() {
        let mut state = AppState::new(Language::En, Theme::Dark, FilterState::default(), Vec::new());
        state.articles = sample_articles();
        let mut view = ViewState { selected: 5, ..Default::default() };
        assert_eq!(view.selected_article(&state).map(|a| a.id.as_str()), Some("sample-6"));

        state.articles.truncate(2);
        view.clamp(&state);
        assert_eq!(view.selected, 1);

        view.view = View::Bookmarks;
        view.clamp(&state);
        assert_eq!(view.selected, 0);
        assert!(view.selected_article(&state).is_none());
    }
}
