//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use lampshade_core::{Device, ErrorKind, ToggleRequest};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,

    // ── Refresh ───────────────────────────────────────────────────
    /// Timer fired or the user pressed `r`.
    RefreshRequested,
    LightsLoaded(Arc<Vec<Device>>),
    RefreshFailed { kind: ErrorKind, message: String },

    // ── Toggle ────────────────────────────────────────────────────
    /// The screen already applied the optimistic flip; send it to the hub.
    ToggleRequested(ToggleRequest),
    ToggleCompleted(ToggleRequest),
    ToggleFailed {
        request: ToggleRequest,
        message: String,
    },

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
