//! # Builder wiring for the tag lifecycle manager.
//!
//! Constructs the directive bus, the icon resolver around the injected
//! fetch mechanism, the sink fan-out and the runtime cancellation token,
//! then hands back the single shared [`TagManager`] handle. Construct once
//! and hold the handle; re-initialization guards are the application's
//! concern, not the manager's.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::manager::TagManager;
use crate::events::Bus;
use crate::icons::{FetchRef, IconResolver, NoFetch};
use crate::sinks::{RenderSink, SinkSet};
use crate::visual::{CharWidthMeasure, MeasureText, WidthPolicy};

/// Builder for constructing a [`TagManager`] with optional collaborators.
pub struct TagManagerBuilder {
    cfg: Config,
    sinks: Vec<Arc<dyn RenderSink>>,
    fetcher: Option<FetchRef>,
    measure: Option<Arc<dyn MeasureText>>,
    width_policy: WidthPolicy,
}

impl TagManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            sinks: Vec::new(),
            fetcher: None,
            measure: None,
            width_policy: WidthPolicy::default(),
        }
    }

    /// Sets the render sinks receiving the directive stream.
    ///
    /// Each sink gets a dedicated worker with a bounded queue; slow sinks
    /// never block the manager. Omitting sinks is fine — consumers may also
    /// subscribe directly via [`TagManager::subscribe`].
    pub fn with_sinks(mut self, sinks: Vec<Arc<dyn RenderSink>>) -> Self {
        self.sinks = sinks;
        self
    }

    /// Adds one render sink.
    pub fn with_sink(mut self, sink: Arc<dyn RenderSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Sets the icon fetch mechanism.
    ///
    /// Without one, every domain settles to the fallback marker.
    pub fn with_fetcher(mut self, fetcher: FetchRef) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the text measurement capability used for width estimation.
    ///
    /// Defaults to the embedded per-character approximation.
    pub fn with_measure(mut self, measure: Arc<dyn MeasureText>) -> Self {
        self.measure = Some(measure);
        self
    }

    /// Overrides the width budget/clamp policy.
    pub fn with_width_policy(mut self, policy: WidthPolicy) -> Self {
        self.width_policy = policy;
        self
    }

    /// Builds and returns the manager handle.
    ///
    /// Initializes the directive bus, the icon resolver and — when sinks
    /// were provided — the fan-out listener, which runs until the manager's
    /// [`shutdown`](TagManager::shutdown).
    pub fn build(self) -> TagManager {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let fetcher = self.fetcher.unwrap_or_else(|| Arc::new(NoFetch));
        let resolver = Arc::new(IconResolver::new(fetcher, self.cfg.icon_timeout));
        let measure = self
            .measure
            .unwrap_or_else(|| Arc::new(CharWidthMeasure));
        let runtime_token = CancellationToken::new();

        if !self.sinks.is_empty() {
            let set = SinkSet::new(self.sinks);
            spawn_sink_listener(bus.clone(), set, runtime_token.clone());
        }

        TagManager::new_internal(
            self.cfg,
            bus,
            resolver,
            measure,
            self.width_policy,
            runtime_token,
        )
    }
}

/// Subscribes to the bus and forwards directives to the sink set.
///
/// Runs until the runtime token is cancelled or the bus closes, then shuts
/// the workers down gracefully.
fn spawn_sink_listener(bus: Bus, set: SinkSet, runtime_token: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = runtime_token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(d) => set.emit(&d),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        eprintln!("[taglet] sink listener lagged, skipped {n} directives");
                        continue;
                    }
                }
            }
        }
        set.shutdown().await;
    });
}
