//! Error types used by the taglet core.
//!
//! This module defines two enums:
//!
//! - [`EventDrop`] — reasons an incoming [`DomainEvent`](crate::DomainEvent)
//!   was rejected without touching the registry.
//! - [`IconError`] — failures of an individual icon fetch attempt.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Neither is ever raised across the public API as a panic:
//! rejected events are reported back to the caller as an `Err` it may log,
//! and icon failures collapse into the fallback marker inside the resolver.
//!
//! Two failure modes from the design deliberately have **no** error type:
//! a timer firing for a key that was already removed, and a second
//! dismiss/evict for the same key. Both are idempotent no-ops by contract.

use std::time::Duration;
use thiserror::Error;

/// # Reasons an incoming event was dropped.
///
/// Dropping is informational, not exceptional: the registry is untouched and
/// no directive is published. Callers may log the label and move on.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDrop {
    /// The event carried an empty base domain and cannot be keyed.
    #[error("event has an empty base domain")]
    MalformedEvent,

    /// The feature is globally disabled; events are ignored.
    #[error("tag display is disabled by configuration")]
    Disabled,
}

impl EventDrop {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taglet::EventDrop;
    ///
    /// assert_eq!(EventDrop::MalformedEvent.as_label(), "event_malformed");
    /// assert_eq!(EventDrop::Disabled.as_label(), "event_disabled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventDrop::MalformedEvent => "event_malformed",
            EventDrop::Disabled => "event_disabled",
        }
    }
}

/// # Errors produced by icon fetch attempts.
///
/// These never propagate past the [`IconResolver`](crate::IconResolver):
/// any of them settles the domain's cache entry to the fallback marker.
/// Fetch implementations construct these directly.
#[derive(Error, Debug)]
pub enum IconError {
    /// The fetch mechanism reported a failure (network, decode, missing icon).
    #[error("icon fetch failed: {error}")]
    Fetch {
        /// The underlying error message.
        error: String,
    },

    /// The fetch did not settle within the bounded wait.
    #[error("icon fetch timed out after {timeout:?}")]
    Timeout {
        /// The bounded wait that was exceeded.
        timeout: Duration,
    },
}

impl IconError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            IconError::Fetch { .. } => "icon_fetch_failed",
            IconError::Timeout { .. } => "icon_fetch_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            IconError::Fetch { error } => format!("fetch failed: {error}"),
            IconError::Timeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }
}
