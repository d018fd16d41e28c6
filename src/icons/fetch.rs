//! # Icon fetch seam (`FetchIcon`) and its closure adapter (`FetchFn`)
//!
//! The actual transport for icons (favicon HTTP fetch, bundled lookup,
//! platform API) lives outside this crate. [`FetchIcon`] is the contract the
//! [`IconResolver`](crate::IconResolver) drives; [`FetchFn`] wraps a closure
//! `F: Fn(String) -> Fut`, producing a fresh future per call, so no shared
//! mutable state is needed between fetches.
//!
//! ## Example
//! ```rust
//! use taglet::{FetchFn, FetchRef, IconError};
//!
//! let fetch: FetchRef = FetchFn::arc(|domain: String| async move {
//!     if domain.ends_with(".example") {
//!         Ok(format!("https://{domain}/favicon.ico").into())
//!     } else {
//!         Err(IconError::Fetch { error: "no icon".into() })
//!     }
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IconError;
use crate::icons::resolver::IconRef;

/// Shared handle to a fetch implementation.
pub type FetchRef = Arc<dyn FetchIcon>;

/// Contract for icon fetch implementations.
///
/// Called from the resolver's in-flight future. Implementations may take
/// real wall-clock time; the resolver bounds the wait and maps any error to
/// the fallback marker. A fetch that outlives the bounded wait is cancelled.
#[async_trait]
pub trait FetchIcon: Send + Sync + 'static {
    /// Fetches the icon reference for a domain.
    async fn fetch(&self, domain: &str) -> Result<IconRef, IconError>;
}

/// Function-backed fetch implementation.
///
/// Wraps a closure that *creates* a new future per call. The closure takes
/// an owned `String` so the produced future does not borrow the argument.
pub struct FetchFn<F> {
    f: F,
}

impl<F> FetchFn<F> {
    /// Creates a new function-backed fetcher.
    ///
    /// Prefer [`FetchFn::arc`] when you immediately need a [`FetchRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the fetcher and returns it as a shared handle.
    pub fn arc<Fut>(f: F) -> FetchRef
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<IconRef, IconError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> FetchIcon for FetchFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<IconRef, IconError>> + Send + 'static,
{
    async fn fetch(&self, domain: &str) -> Result<IconRef, IconError> {
        (self.f)(domain.to_string()).await
    }
}

/// Fetcher that never produces an icon.
///
/// The builder's default when no fetch mechanism is wired in: every domain
/// settles to the fallback marker immediately.
#[derive(Debug, Default)]
pub(crate) struct NoFetch;

#[async_trait]
impl FetchIcon for NoFetch {
    async fn fetch(&self, _domain: &str) -> Result<IconRef, IconError> {
        Err(IconError::Fetch {
            error: "no fetch mechanism configured".to_string(),
        })
    }
}
