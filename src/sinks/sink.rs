//! # Core sink trait
//!
//! `RenderSink` is the extension point for plugging render surfaces (and
//! anything else that wants the directive stream) into the manager. Each
//! sink is driven by a dedicated worker loop fed by a bounded queue owned by
//! the [`SinkSet`](crate::sinks::SinkSet).
//!
//! ## Contract
//! - Implementations may be slow (painting, animation scheduling, I/O) —
//!   they do **not** block the publisher nor other sinks.
//! - Each sink **declares** its preferred queue capacity via
//!   [`RenderSink::queue_capacity`]. If a queue overflows, directives for
//!   that sink are **dropped** (warn).

use async_trait::async_trait;

use crate::events::Directive;

/// Contract for directive consumers.
///
/// Called from a sink-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait RenderSink: Send + Sync + 'static {
    /// Handle a single directive for this sink.
    ///
    /// # Parameters
    /// - `directive`: Reference to the directive (does not transfer ownership)
    async fn on_directive(&self, directive: &Directive);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this sink's queue.
    ///
    /// On overflow, directives for this sink are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
