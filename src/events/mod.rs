//! Event and directive types, plus the broadcast bus.
//!
//! This module groups the **input** data model ([`DomainEvent`], consumed
//! from the upstream classifier), the **output** data model ([`Directive`],
//! published to render sinks) and the [`Bus`] used to broadcast directives.
//!
//! ## Contents
//! - [`DomainEvent`] one observation of a third-party network resource
//! - [`DirectiveKind`], [`Directive`] outbound render instructions
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `TagManager` (the only writer of directives).
//! - **Consumers**: the sink listener spawned by the builder (fans out to
//!   a `SinkSet`), plus any direct `Bus::subscribe` receivers.

mod bus;
mod directive;
mod event;

pub use bus::Bus;
pub use directive::{Directive, DirectiveKind};
pub use event::DomainEvent;
