use crate::filter::FilterState;
use crate::notify::Notifier;
use crate::storage::{read_json, write_json, KvStore, FILTERS_KEY, LANGUAGE_KEY, THEME_KEY};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Tr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::En => Language::Tr,
            Language::Tr => Language::En,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// UI preferences persisted across runs. Owned by the engine task and handed
/// to the UI by value; there is no process-wide instance.
pub struct Preferences {
    language: Language,
    theme: Theme,
    filters: FilterState,
    store: Box<dyn KvStore>,
    notifier: Notifier,
}

impl Preferences {
    pub fn load(mut store: Box<dyn KvStore>, notifier: Notifier) -> Self {
        let language = load_or_default(store.as_mut(), LANGUAGE_KEY, &notifier);
        let theme = load_or_default(store.as_mut(), THEME_KEY, &notifier);
        let filters = load_or_default(store.as_mut(), FILTERS_KEY, &notifier);
        Self { language, theme, filters, store, notifier }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.save(LANGUAGE_KEY, &language);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        let theme = self.theme;
        self.save(THEME_KEY, &theme);
        theme
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        let filters = self.filters.clone();
        self.save(FILTERS_KEY, &filters);
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) {
        if let Err(e) = write_json(self.store.as_mut(), key, value) {
            tracing::warn!(key, error = %e, "failed to persist preference");
            self.notifier.warning("notice.storage_failed", Some(format!("{:#}", e)));
        }
    }
}

fn load_or_default<T: DeserializeOwned + Default>(
    store: &mut dyn KvStore,
    key: &str,
    notifier: &Notifier,
) -> T {
    match read_json(store, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read preference");
            notifier.warning("notice.storage_failed", Some(format!("{:#}", e)));
            T::default()
        }
    }
}
