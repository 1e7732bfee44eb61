//! Confirmation and notification overlays.
//!
//! These are view models only. They are derived from the deletion
//! coordinator's state and hold nothing of their own; a closed overlay is
//! `None`.

use std::time::{Duration, Instant};

use serde::Serialize;

use super::ItemId;

/// Outcome shown by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Result notification opened when a request completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip)]
    pub opened_at: Instant,
    /// Dismiss automatically after this long
    #[serde(skip)]
    pub auto_dismiss: Option<Duration>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            opened_at: Instant::now(),
            auto_dismiss: None,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    pub fn with_auto_dismiss(mut self, timeout: Option<Duration>) -> Self {
        self.auto_dismiss = timeout;
        self
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }

    /// Whether the auto-dismiss timeout has run out at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.auto_dismiss
            .is_some_and(|timeout| now.saturating_duration_since(self.opened_at) >= timeout)
    }

    /// Whole seconds left before auto-dismissal.
    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        let timeout = self.auto_dismiss?;
        let elapsed = now.saturating_duration_since(self.opened_at);
        Some(timeout.saturating_sub(elapsed).as_secs())
    }
}

/// Confirm-before-delete dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmDialogView {
    pub item_id: ItemId,
    pub title: String,
    pub message: String,
    /// Both buttons are disabled while the request is in flight
    pub confirm_enabled: bool,
    pub cancel_enabled: bool,
    pub in_flight: bool,
}

impl ConfirmDialogView {
    pub fn new(item_id: ItemId, label: &str, in_flight: bool) -> Self {
        Self {
            item_id,
            title: "Confirm deletion".to_string(),
            message: format!("Delete {label}? This cannot be undone."),
            confirm_enabled: !in_flight,
            cancel_enabled: !in_flight,
            in_flight,
        }
    }
}
