//! # taglet
//!
//! **Taglet** is an event-driven tag lifecycle library for Rust.
//!
//! It consumes a stream of "a third-party network resource was observed"
//! events and maintains short-lived, deduplicated visual indicators
//! ("tags"), one per base domain, each carrying a running occurrence count
//! and an icon, auto-expiring after a configurable TTL unless pinned by
//! activity or manually dismissed. The crate decides *what* tags exist and
//! which attributes they carry; painting them is the render surface's job.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  DomainEvent │   │  DomainEvent │   │  DomainEvent │
//!     │ (observation)│   │ (observation)│   │ (observation)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TagManager (lifecycle orchestrator)                              │
//! │  - Registry (one TagRecord per live base domain)                  │
//! │  - Expiry timers (one per record, generation-stamped)             │
//! │  - ColorClass / WidthPolicy (deterministic visual attributes)     │
//! │  - IconResolver (memo cache, bounded wait, single-flight)         │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ publishes Directives
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! │              (capacity: Config::bus_capacity)                     │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                      ┌──────────────────┐
//!                      │   sink listener  │
//!                      └───┬──────────┬───┘
//!                          ▼          ▼
//!                      SinkSet    direct subscribers
//!                   ┌─────┼─────┐
//!                   ▼     ▼     ▼
//!                 surface log  custom
//!                 .on_directive(&Directive)
//! ```
//!
//! ### Lifecycle
//! ```text
//! DomainEvent ──► TagManager::handle_event
//!
//! absent key:                          present key:
//!   ├─► assign ColorClass               ├─► cancel expiry timer
//!   ├─► estimate width (count=1)        ├─► count += 1, record subdomain
//!   ├─► insert TagRecord                ├─► recompute width
//!   ├─► arm expiry (if TTL)             ├─► re-arm expiry (if TTL)
//!   ├─► publish Create                  └─► publish Update
//!   └─► spawn icon resolution
//!         └─► on settle: still present? → publish IconReady
//!
//! expiry fires un-reset ──► generation match? ──► remove, publish Remove
//! dismiss(domain)       ──► remove if present  ──► publish Remove
//! clear_all()           ──► drain registry     ──► publish RemoveAll
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types / traits                     |
//! |-----------------|---------------------------------------------------------------|----------------------------------------|
//! | **Lifecycle**   | Create, merge and evict tags with TTL reset semantics.        | [`TagManager`], [`Config`]             |
//! | **Directives**  | Ordered outbound stream for the render surface.               | [`Directive`], [`DirectiveKind`]       |
//! | **Sink API**    | Hook into the directive stream (render, logging, custom).     | [`RenderSink`], [`SinkSet`]            |
//! | **Icons**       | Bounded-wait, single-flight icon resolution with memoization. | [`FetchIcon`], [`IconResolver`]        |
//! | **Visuals**     | Deterministic color classes and bounded width estimation.     | [`ColorClass`], [`WidthPolicy`]        |
//! | **Errors**      | Typed drop reasons and icon fetch failures.                   | [`EventDrop`], [`IconError`]           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogSink`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taglet::{Config, DirectiveKind, DomainEvent, TagManager};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.ttl = Duration::from_secs(5);
//!
//!     // Construct once, hold the handle.
//!     let manager = TagManager::builder(cfg).build();
//!     let mut directives = manager.subscribe();
//!
//!     manager
//!         .handle_event(DomainEvent::new("tracker.example", "cdn.tracker.example"))
//!         .await
//!         .unwrap();
//!
//!     let created = directives.recv().await.unwrap();
//!     assert_eq!(created.kind, DirectiveKind::Create);
//!     assert_eq!(created.count, Some(1));
//!
//!     manager.shutdown().await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod icons;
mod sinks;
mod visual;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{IconState, TagManager, TagManagerBuilder};
pub use error::{EventDrop, IconError};
pub use events::{Bus, Directive, DirectiveKind, DomainEvent};
pub use icons::{FetchFn, FetchIcon, FetchRef, IconOutcome, IconRef, IconResolver};
pub use sinks::{RenderSink, SinkSet};
pub use visual::{CharWidthMeasure, ColorClass, MeasureText, WidthPolicy};

// Optional: expose a simple built-in logging sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use sinks::LogSink;
