//! # Directive bus for broadcasting render instructions.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking directive publishing from the tag lifecycle manager.
//!
//! ## Architecture
//! ```text
//! Publisher (one):                    Subscribers (many):
//!   TagManager ──────► Bus ───────► sink listener ────► SinkSet
//!                 (broadcast chan)└► direct Bus::subscribe receivers
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls
//!   `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent directives for
//!   all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   `n` oldest items.
//! - **No persistence**: directives are lost if there are no active
//!   subscribers at send time.

use tokio::sync::broadcast;

use super::directive::Directive;

/// Broadcast channel for render directives.
///
/// Thin wrapper over [`tokio::sync::broadcast`] with a `publish`/`subscribe`
/// API. Subscribers receive clones of each directive.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Directive>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all receivers (not per-subscriber).
    /// - When receivers lag, they will observe `RecvError::Lagged`.
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Directive>(capacity);
        Self { tx }
    }

    /// Publishes a directive to all active subscribers.
    ///
    /// If there are no receivers, the directive is dropped (this function
    /// still returns immediately).
    pub fn publish(&self, d: Directive) {
        let _ = self.tx.send(d);
    }

    /// Publishes a borrowed directive by cloning it.
    pub fn publish_ref(&self, d: &Directive) {
        let _ = self.tx.send(d.clone());
    }

    /// Creates a new receiver that will observe subsequent directives.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets directives **sent after** it subscribes.
    /// - Slow receivers get `RecvError::Lagged(n)` and skip missed items.
    pub fn subscribe(&self) -> broadcast::Receiver<Directive> {
        self.tx.subscribe()
    }
}
