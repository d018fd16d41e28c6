//! # Tag record: per-domain registry entry.
//!
//! One [`TagRecord`] exists per currently-displayed base domain. The record
//! owns the expiry handle (cancellation token for the armed timer) and the
//! generation stamp that guards against stale timer fires.
//!
//! ## Rules
//! - `base_domain` and `color` are immutable for the record's lifetime
//! - `count` counts merged events, not distinct subdomains
//! - at most one armed expiry timer per record; re-arming cancels first
//! - the generation is bumped on every arm, so a timer that fired for an
//!   older arm can be recognized and ignored

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;

use crate::icons::{IconOutcome, IconRef};
use crate::visual::ColorClass;

/// Icon display state of a tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IconState {
    /// Resolution is still in flight; render a placeholder.
    Pending,
    /// A concrete icon reference is available.
    Resolved(IconRef),
    /// Resolution failed or timed out; render the generic marker.
    Fallback,
}

impl From<IconOutcome> for IconState {
    fn from(outcome: IconOutcome) -> Self {
        match outcome {
            IconOutcome::Resolved(icon) => IconState::Resolved(icon),
            IconOutcome::Fallback => IconState::Fallback,
        }
    }
}

/// Handle to an armed expiry timer.
///
/// Dropping the handle does not cancel the timer; disarming cancels the
/// token, which makes the spawned timer task exit without firing.
pub(crate) struct ExpiryHandle {
    /// Cancellation token for the timer task.
    pub(crate) cancel: CancellationToken,
}

/// Registry entry for one live base domain.
pub(crate) struct TagRecord {
    /// Registry key, immutable.
    base_domain: std::sync::Arc<str>,
    /// Number of events merged into this record since creation.
    count: u32,
    /// Distinct full domains observed since creation.
    seen_subdomains: HashSet<String>,
    /// Assigned once at creation, immutable.
    color: ColorClass,
    /// Recomputed whenever `count` changes.
    width: f32,
    /// Mutated asynchronously by the icon continuation.
    icon: IconState,
    /// Present iff an expiry timer is armed.
    expiry: Option<ExpiryHandle>,
    /// Arm stamp; a fired timer must match this to evict.
    generation: u64,
}

impl TagRecord {
    /// Creates a fresh record for the first event of a base domain.
    pub(crate) fn new(
        base_domain: std::sync::Arc<str>,
        first_subdomain: String,
        color: ColorClass,
        width: f32,
    ) -> Self {
        let mut seen_subdomains = HashSet::new();
        seen_subdomains.insert(first_subdomain);
        Self {
            base_domain,
            count: 1,
            seen_subdomains,
            color,
            width,
            icon: IconState::Pending,
            expiry: None,
            generation: 0,
        }
    }

    /// Merges one more event: bump the counter and record the subdomain.
    ///
    /// The counter increments on every event, including repeats of an
    /// already-seen full domain; the subdomain set is informational.
    pub(crate) fn merge(&mut self, full_domain: String) {
        self.count = self.count.saturating_add(1);
        self.seen_subdomains.insert(full_domain);
    }

    /// Installs a new expiry handle, cancelling any previous one first.
    pub(crate) fn arm(&mut self, handle: ExpiryHandle, generation: u64) {
        self.disarm();
        self.expiry = Some(handle);
        self.generation = generation;
    }

    /// Cancels and removes the expiry handle, if armed.
    pub(crate) fn disarm(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.cancel.cancel();
        }
    }

    pub(crate) fn base_domain(&self) -> std::sync::Arc<str> {
        std::sync::Arc::clone(&self.base_domain)
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn seen_subdomains(&self) -> &HashSet<String> {
        &self.seen_subdomains
    }

    pub(crate) fn color(&self) -> ColorClass {
        self.color
    }

    pub(crate) fn width(&self) -> f32 {
        self.width
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub(crate) fn icon(&self) -> &IconState {
        &self.icon
    }

    pub(crate) fn set_icon(&mut self, outcome: IconOutcome) {
        self.icon = outcome.into();
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.expiry.is_some()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
