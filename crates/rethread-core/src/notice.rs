//! Non-blocking notifications for the rendering layer.
//!
//! Failures are handled where they happen and reported here instead of
//! escaping as errors: the caller keeps rendering and drains the receiver
//! whenever it wants to show the user what went wrong.

use crate::error::CycleError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    UnknownReference,
    PersistenceUnavailable,
    RemoteSyncFailed,
    RemoteSynced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Map an error from the taxonomy to the notice shown for it. Errors
    /// outside the taxonomy (I/O, parse) have no notice form.
    pub fn from_error(err: &CycleError) -> Option<Self> {
        let (level, kind) = match err {
            e if e.is_unknown_reference() => (NoticeLevel::Error, NoticeKind::UnknownReference),
            CycleError::PersistenceUnavailable(_) => {
                (NoticeLevel::Warning, NoticeKind::PersistenceUnavailable)
            }
            CycleError::RemoteSyncFailed(_) => (NoticeLevel::Warning, NoticeKind::RemoteSyncFailed),
            _ => return None,
        };
        Some(Self::new(level, kind, err.to_string()))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Sending half of the notice channel. Cheap to clone; every store holds one.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<Sender<Notice>>,
}

/// Create a connected notifier/receiver pair.
pub fn channel() -> (Notifier, Receiver<Notice>) {
    let (tx, rx) = mpsc::channel();
    (Notifier { tx: Some(tx) }, rx)
}

impl Notifier {
    /// A notifier nobody listens to.
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, notice: Notice) {
        if let Some(tx) = &self.tx {
            // A dropped receiver means the UI stopped listening.
            let _ = tx.send(notice);
        }
    }

    pub fn info(&self, kind: NoticeKind, message: impl Into<String>) {
        self.send(Notice::new(NoticeLevel::Info, kind, message));
    }

    pub fn warn(&self, kind: NoticeKind, message: impl Into<String>) {
        self.send(Notice::new(NoticeLevel::Warning, kind, message));
    }

    /// Report `err` if it belongs to the taxonomy. Returns `err` unchanged.
    pub fn report(&self, err: CycleError) -> CycleError {
        if let Some(notice) = Notice::from_error(&err) {
            self.send(notice);
        }
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_forwards_taxonomy_errors() {
        let (notifier, rx) = channel();
        let err = notifier.report(CycleError::UnknownPhase("p9".into()));
        assert!(matches!(err, CycleError::UnknownPhase(_)));

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::UnknownReference);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("p9"));
    }

    #[test]
    fn report_skips_io_errors() {
        let (notifier, rx) = channel();
        notifier.report(CycleError::Io(std::io::Error::other("disk")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn remote_failures_are_warnings() {
        let notice = Notice::from_error(&CycleError::RemoteSyncFailed("503".into())).unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.kind, NoticeKind::RemoteSyncFailed);
    }

    #[test]
    fn silent_and_dropped_receivers_do_not_panic() {
        Notifier::silent().warn(NoticeKind::PersistenceUnavailable, "nobody listens");
        let (notifier, rx) = channel();
        drop(rx);
        notifier.info(NoticeKind::RemoteSynced, "still fine");
    }
}
