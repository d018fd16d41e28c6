//! # SinkSet: non-blocking fan-out over multiple render sinks
//!
//! [`SinkSet`] distributes each [`Directive`](crate::Directive) to multiple
//! sinks **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Directive)` returns immediately.
//! - Per-sink FIFO (queue order).
//! - Panics inside sinks are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different sinks.
//! - No retries on per-sink queue overflow (directives are dropped for that
//!   sink).
//!
//! ## Diagram
//! ```text
//!    emit(&Directive)
//!        │                        (Arc-clone per sink)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_directive()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_directive()
//!        └────────────────► [queue SN] ─► worker SN ─► on_directive()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Directive;

use super::RenderSink;

/// Per-sink channel with metadata
struct SinkChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Directive>>,
}

/// Composite fan-out with per-sink bounded queues and worker tasks.
pub struct SinkSet {
    channels: Vec<SinkChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SinkSet {
    /// Creates a new set and spawns one worker per sink.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn RenderSink>>) -> Self {
        let mut channels = Vec::with_capacity(sinks.len());
        let mut workers = Vec::with_capacity(sinks.len());

        for sink in sinks {
            let cap = sink.queue_capacity().max(1);
            let name = sink.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Directive>>(cap);
            let s = Arc::clone(&sink);

            let handle = tokio::spawn(async move {
                while let Some(d) = rx.recv().await {
                    let fut = s.on_directive(d.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!("[taglet] sink '{}' panicked: {:?}", s.name(), panic_err);
                    }
                }
            });

            channels.push(SinkChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one directive to all sinks (non-blocking).
    ///
    /// If a sink's queue is **full** or **closed**, the directive is dropped
    /// for it and a warning is logged with the sink's name.
    pub fn emit(&self, directive: &Directive) {
        let d = Arc::new(directive.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&d)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[taglet] sink '{}' dropped directive: queue full",
                        channel.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[taglet] sink '{}' dropped directive: worker closed",
                        channel.name
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
