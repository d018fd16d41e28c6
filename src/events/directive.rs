//! # Render directives emitted by the tag lifecycle manager.
//!
//! The [`DirectiveKind`] enum classifies outbound instructions to the render
//! surface:
//! - **Creation/merge**: a tag appeared or its counter changed
//! - **Icon settlement**: an asynchronously resolved icon became available
//! - **Teardown**: a single tag or every tag disappeared
//!
//! The [`Directive`] struct carries additional metadata such as timestamps,
//! the base domain, occurrence count, display width and color class.
//!
//! ## Ordering guarantees
//! Each directive has a globally unique sequence number (`seq`) that
//! increases monotonically. A `Remove` for a domain is always published
//! *after* the registry no longer contains it, so at every observable
//! instant the directive stream agrees with the registry.
//!
//! ## Example
//! ```rust
//! use taglet::{ColorClass, Directive, DirectiveKind};
//!
//! let d = Directive::new(DirectiveKind::Create)
//!     .with_domain("tracker.example")
//!     .with_count(1)
//!     .with_width(296.0)
//!     .with_color(ColorClass::Teal);
//!
//! assert_eq!(d.kind, DirectiveKind::Create);
//! assert_eq!(d.domain.as_deref(), Some("tracker.example"));
//! assert_eq!(d.count, Some(1));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::icons::IconOutcome;
use crate::visual::ColorClass;

/// Global sequence counter for directive ordering.
static DIRECTIVE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of render directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// A tag for a previously-absent base domain must be shown.
    ///
    /// Sets:
    /// - `domain`: base domain
    /// - `count`: always 1
    /// - `width`: initial display width
    /// - `color`: assigned color class (immutable for the tag's lifetime)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Create,

    /// An existing tag absorbed another event; counter and width changed.
    ///
    /// Sets:
    /// - `domain`: base domain
    /// - `count`: new occurrence count
    /// - `width`: recomputed display width
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Update,

    /// Icon resolution settled for a live tag.
    ///
    /// Sets:
    /// - `domain`: base domain
    /// - `icon`: concrete reference or the fallback marker
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    IconReady,

    /// A tag was removed (TTL expiry or manual dismissal).
    ///
    /// The registry entry is already gone when this is published. Any
    /// removal animation is the render surface's concern, sequenced after.
    ///
    /// Sets:
    /// - `domain`: base domain
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Remove,

    /// Every tag was removed (global clear, e.g. feature disabled).
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RemoveAll,
}

/// Render directive with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`DirectiveKind`]
#[derive(Clone, Debug)]
pub struct Directive {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Directive classification.
    pub kind: DirectiveKind,

    /// Base domain of the affected tag, if applicable.
    pub domain: Option<Arc<str>>,
    /// Occurrence count carried by `Create`/`Update`.
    pub count: Option<u32>,
    /// Display width carried by `Create`/`Update`.
    pub width: Option<f32>,
    /// Color class carried by `Create`.
    pub color: Option<ColorClass>,
    /// Settled icon carried by `IconReady`.
    pub icon: Option<IconOutcome>,
}

impl Directive {
    /// Creates a new directive of the given kind with current timestamp and
    /// next sequence number.
    pub fn new(kind: DirectiveKind) -> Self {
        Self {
            seq: DIRECTIVE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            domain: None,
            count: None,
            width: None,
            color: None,
            icon: None,
        }
    }

    /// Attaches the base domain.
    #[inline]
    pub fn with_domain(mut self, domain: impl Into<Arc<str>>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Attaches an occurrence count.
    #[inline]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a display width.
    #[inline]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Attaches a color class.
    #[inline]
    pub fn with_color(mut self, color: ColorClass) -> Self {
        self.color = Some(color);
        self
    }

    /// Attaches a settled icon outcome.
    #[inline]
    pub fn with_icon(mut self, icon: IconOutcome) -> Self {
        self.icon = Some(icon);
        self
    }
}
