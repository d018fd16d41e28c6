//! # Input event: one observed third-party network resource.
//!
//! [`DomainEvent`] is produced by the upstream classification component (out
//! of scope for this crate) and pushed into
//! [`TagManager::handle_event`](crate::TagManager::handle_event). Events are
//! transient: nothing of the event survives a dispatch except what is merged
//! into the tag record (counter, subdomain set).
//!
//! ## Example
//! ```rust
//! use taglet::DomainEvent;
//!
//! let ev = DomainEvent::new("tracker.example", "cdn.tracker.example")
//!     .with_resource_type("script");
//!
//! assert_eq!(ev.base_domain, "tracker.example");
//! assert_eq!(ev.resource_type.as_deref(), Some("script"));
//! ```

use std::time::SystemTime;

/// One observation of a third-party network resource.
///
/// - `base_domain`: the registrable domain used as the dedup key
///   (e.g. `example.co.uk`). An empty value is rejected by the manager.
/// - `full_domain`: the complete observed hostname, possibly a subdomain
///   of `base_domain`.
/// - `resource_type`: optional classifier hint (`"script"`, `"image"`, ...).
///   Carried for observability; the lifecycle does not branch on it.
/// - `observed_at`: wall-clock timestamp of the observation.
#[derive(Clone, Debug)]
pub struct DomainEvent {
    /// Registrable domain, the registry key.
    pub base_domain: String,
    /// Fully-qualified observed hostname.
    pub full_domain: String,
    /// Optional resource classification from the upstream component.
    pub resource_type: Option<String>,
    /// When the resource was observed.
    pub observed_at: SystemTime,
}

impl DomainEvent {
    /// Creates a new event timestamped now.
    pub fn new(base_domain: impl Into<String>, full_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            full_domain: full_domain.into(),
            resource_type: None,
            observed_at: SystemTime::now(),
        }
    }

    /// Attaches a resource type hint.
    #[inline]
    pub fn with_resource_type(mut self, rt: impl Into<String>) -> Self {
        self.resource_type = Some(rt.into());
        self
    }

    /// Overrides the observation timestamp.
    #[inline]
    pub fn with_observed_at(mut self, at: SystemTime) -> Self {
        self.observed_at = at;
        self
    }
}
