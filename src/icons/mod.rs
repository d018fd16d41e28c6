//! Asynchronous icon resolution.
//!
//! The fetch mechanism is an injected dependency ([`FetchIcon`]); the
//! resolver owns the policy around it: a memo cache keyed by domain, a
//! bounded wait, a permanent fallback on failure or timeout, and
//! single-flight coalescing of concurrent callers.
//!
//! ## Contents
//! - [`FetchIcon`], [`FetchFn`] the fetch seam and its closure adapter
//! - [`IconResolver`], [`IconOutcome`], [`IconRef`] the resolution pipeline

mod fetch;
mod resolver;

pub(crate) use fetch::NoFetch;
pub use fetch::{FetchFn, FetchIcon, FetchRef};
pub use resolver::{IconOutcome, IconRef, IconResolver};
