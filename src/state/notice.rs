//! Transient on-screen notices.

use std::time::Duration;

use strum::{AsRefStr, Display};
use tokio::time::Instant;

/// Notice severity; doubles as the `alert-*` style suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message shown until it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Notices currently on screen, each dismissed automatically after `ttl`.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            notices: Vec::new(),
        }
    }

    /// Post a notice at `now`.
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            level,
            message: message.into(),
            expires_at: now + self.ttl,
        });
        id
    }

    /// Drop expired notices and return the ones still visible at `now`.
    pub fn visible(&mut self, now: Instant) -> &[Notice] {
        self.notices.retain(|n| n.expires_at > now);
        &self.notices
    }

    /// Most recent notice regardless of expiry.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Remove and return every notice.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
