//! # Render sinks for the directive stream.
//!
//! This module provides the [`RenderSink`] trait and the fan-out machinery
//! that delivers [`Directive`](crate::Directive)s broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Directive flow:
//!   TagManager ── publish(Directive) ──► Bus ──► sink listener
//!                                                   │
//!                                                   ▼
//!                                               SinkSet::emit
//!                                          ┌────────┼────────┐
//!                                          ▼        ▼        ▼
//!                                       Surface   LogSink  Custom ...
//! ```
//!
//! ## Implementing custom sinks
//! ```no_run
//! use taglet::{Directive, DirectiveKind, RenderSink};
//! use async_trait::async_trait;
//!
//! struct Surface;
//!
//! #[async_trait]
//! impl RenderSink for Surface {
//!     async fn on_directive(&self, d: &Directive) {
//!         match d.kind {
//!             DirectiveKind::Create => { /* paint a new tag */ }
//!             DirectiveKind::Remove => { /* start dismiss animation */ }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod sink;

#[cfg(feature = "logging")]
pub use log::LogSink;
pub use set::SinkSet;
pub use sink::RenderSink;
