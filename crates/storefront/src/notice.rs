//! Transient feedback messages.
//!
//! A notice is a short message with a kind and an optional lifetime. Timed
//! notices (checkout result, admin feedback) disappear after
//! [`FEEDBACK_TTL`]; blocking notices (admin session expiry) stay until the
//! user acknowledges them.

use std::time::Duration;

use tokio::time::Instant;

/// How long feedback stays visible.
pub const FEEDBACK_TTL: Duration = Duration::from_secs(3);

/// Visual tone of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
    raised_at: Instant,
    ttl: Option<Duration>,
}

impl Notice {
    /// A notice that expires after [`FEEDBACK_TTL`].
    pub fn timed(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Instant::now(),
            ttl: Some(FEEDBACK_TTL),
        }
    }

    /// A notice that stays until dismissed.
    pub fn blocking(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Instant::now(),
            ttl: None,
        }
    }

    /// Shorthand for a timed success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self::timed(NoticeKind::Success, message)
    }

    /// Shorthand for a timed error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self::timed(NoticeKind::Error, message)
    }

    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the notice stays until dismissed.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.ttl.is_none()
    }

    /// Whether a timed notice has run out at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.raised_at) >= ttl)
    }
}

/// The notices currently on screen.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Show a notice.
    pub fn push(&mut self, notice: Notice) {
        self.items.push(notice);
    }

    /// Notices that are still live. Expired timed notices are dropped.
    pub fn active(&mut self) -> &[Notice] {
        let now = Instant::now();
        self.items.retain(|n| !n.is_expired_at(now));
        &self.items
    }

    /// The most recent live notice.
    pub fn latest(&mut self) -> Option<&Notice> {
        self.active().last()
    }

    /// Acknowledge every blocking notice.
    pub fn dismiss_blocking(&mut self) {
        self.items.retain(|n| !n.is_blocking());
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
