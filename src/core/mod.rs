//! Runtime core: registry and lifecycle orchestration.
//!
//! This module contains the embedded implementation of the tag lifecycle.
//! The public API from this module is [`TagManager`] (and its builder),
//! which orchestrates creation, merge and eviction of tags.
//!
//! Internal modules:
//! - [`record`]: per-domain registry entry with expiry handle and icon state;
//! - [`manager`]: registry ownership, expiry timers, icon continuation;
//! - [`builder`]: wiring of bus, resolver, sinks and cancellation.

pub(crate) mod builder;
mod manager;
mod record;

pub use builder::TagManagerBuilder;
pub use manager::TagManager;
pub use record::IconState;
