use crate::feed::types::Article;
use crate::notify::Notifier;
use crate::storage::{read_json, write_json, KvStore, BOOKMARKS_KEY};

/// What the durable entry currently holds. "No entry" and "entry with an empty
/// list" are different: `clear()` deletes the entry, removing the last bookmark
/// writes an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistedState {
    Absent,
    Empty,
    Populated,
}

/// Saved article snapshots, in the order they were bookmarked.
/// The in-memory list is authoritative for the session even when storage fails.
pub struct BookmarkStore {
    bookmarks: Vec<Article>,
    persisted: PersistedState,
    store: Box<dyn KvStore>,
    notifier: Notifier,
    /// Set when the entry could not be read. The medium may still hold valid
    /// bookmarks, so nothing is written or deleted for the rest of the session.
    detached: bool,
}

impl BookmarkStore {
    pub fn load(mut store: Box<dyn KvStore>, notifier: Notifier) -> Self {
        let mut detached = false;
        let (bookmarks, persisted) = match read_json::<Vec<Article>>(store.as_mut(), BOOKMARKS_KEY) {
            Ok(None) => (Vec::new(), PersistedState::Absent),
            Ok(Some(list)) if list.is_empty() => (list, PersistedState::Empty),
            Ok(Some(list)) => (list, PersistedState::Populated),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load bookmarks, not persisting this session");
                notifier.warning("notice.storage_failed", Some(format!("{:#}", e)));
                detached = true;
                (Vec::new(), PersistedState::Absent)
            }
        };
        tracing::debug!(count = bookmarks.len(), state = ?persisted, "bookmarks loaded");

        Self { bookmarks, persisted, store, notifier, detached }
    }

    pub fn bookmarks(&self) -> &[Article] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn persisted_state(&self) -> PersistedState {
        self.persisted
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn is_bookmarked(&self, id: &str) -> bool {
        self.bookmarks.iter().any(|b| b.id == id)
    }

    /// Returns false when the article was already saved.
    pub fn add(&mut self, article: &Article) -> bool {
        if self.is_bookmarked(&article.id) {
            return false;
        }
        self.bookmarks.push(article.clone());
        self.persist();
        self.notifier.success("notice.bookmark_added");
        true
    }

    /// Returns false when nothing was saved under `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        if self.bookmarks.len() == before {
            return false;
        }
        self.persist();
        self.notifier.success("notice.bookmark_removed");
        true
    }

    /// Returns whether the article is bookmarked afterwards.
    pub fn toggle(&mut self, article: &Article) -> bool {
        if self.is_bookmarked(&article.id) {
            self.remove(&article.id);
            false
        } else {
            self.add(article);
            true
        }
    }

    /// Drop every bookmark and delete the durable entry itself.
    pub fn clear(&mut self) {
        self.bookmarks.clear();
        if !self.detached {
            match self.store.remove(BOOKMARKS_KEY) {
                Ok(()) => self.persisted = PersistedState::Absent,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to delete bookmark entry");
                    self.notifier.warning("notice.storage_failed", Some(format!("{:#}", e)));
                }
            }
        }
        self.notifier.success("notice.bookmarks_cleared");
    }

    fn persist(&mut self) {
        if self.detached {
            return;
        }
        match write_json(self.store.as_mut(), BOOKMARKS_KEY, &self.bookmarks) {
            Ok(()) => {
                self.persisted = if self.bookmarks.is_empty() {
                    PersistedState::Empty
                } else {
                    PersistedState::Populated
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist bookmarks");
                self.notifier.warning("notice.storage_failed", Some(format!("{:#}", e)));
            }
        }
    }
}
