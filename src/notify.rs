use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

impl NoticeLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Success => "OK",
            NoticeLevel::Warning => "WARN",
        }
    }
}

/// A transient user-facing message (the terminal equivalent of a toast).
/// `key` is a translation key so the text follows the active language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub key: &'static str,
    pub detail: Option<String>,
}

/// Cheap-to-clone handle for emitting notices. A silent notifier drops them.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn notify(&self, level: NoticeLevel, key: &'static str, detail: Option<String>) {
        match level {
            NoticeLevel::Warning => tracing::warn!(key, detail = ?detail, "user notice"),
            _ => tracing::debug!(key, detail = ?detail, "user notice"),
        }
        if let Some(tx) = &self.tx {
            let _ = tx.send(Notice { level, key, detail });
        }
    }

    pub fn success(&self, key: &'static str) {
        self.notify(NoticeLevel::Success, key, None);
    }

    pub fn warning(&self, key: &'static str, detail: Option<String>) {
        self.notify(NoticeLevel::Warning, key, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_in_order() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.success("notice.bookmark_added");
        notifier.warning("notice.storage_failed", Some("disk full".to_string()));

        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NoticeLevel::Warning);
        assert_eq!(second.key, "notice.storage_failed");
        assert_eq!(second.detail.as_deref(), Some("disk full"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_silent_notifier_is_a_no_op() {
        Notifier::silent().warning("notice.samples", None);
    }
}
