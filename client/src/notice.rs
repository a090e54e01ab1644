use std::time::{Duration, Instant};

/// How long a non-error notice stays up.
pub const AUTO_DISMISS: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Ok,
    Warn,
    Error,
}

/// A message banner. Errors stay until dismissed or replaced, everything else fades out after
/// [`AUTO_DISMISS`].
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    shown_at: Instant,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        self.kind == NoticeKind::Error || now.saturating_duration_since(self.shown_at) < AUTO_DISMISS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_persist_and_others_fade() {
        let error = Notice::new(NoticeKind::Error, "boom");
        assert!(error.is_visible_at(error.shown_at + AUTO_DISMISS * 10));
        for kind in [NoticeKind::Info, NoticeKind::Ok, NoticeKind::Warn] {
            let notice = Notice::new(kind, "hi");
            assert!(notice.is_visible_at(notice.shown_at));
            assert!(!notice.is_visible_at(notice.shown_at + AUTO_DISMISS));
        }
    }
}
