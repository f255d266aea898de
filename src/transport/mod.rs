//! Transports: "perform one HTTP exchange" as a composable capability.
//!
//! ## Core types
//!
//! - [`Transport`]: trait implemented by everything that can answer a
//!   [`Request`] with a [`Response`].
//! - [`TransportError`]: the error surface shared by all transports.
//! - [`transport_fn`]: adapts an async closure into a [`Transport`].
//! - [`HttpTransport`]: the default network transport.
//! - [`CachingTransport`]: a decorator that answers GETs from an in-memory
//!   cache.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::http::body::BoxError;
use crate::http::{BodyError, Request, Response, ResponseHead};

pub mod caching;
pub mod http;

pub use caching::{CachingTransport, CachingTransportBuilder, NO_CACHE_HEADER};
pub use http::{HttpTransport, HttpTransportConfig};

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    #[error("invalid request: {0}")]
    InvalidRequest(#[source] BoxError),

    #[error("HTTP exchange failed: {0}")]
    Exchange(#[source] BoxError),

    /// The exchange succeeded but its body could not be read in full.
    /// `head` is the metadata of the response whose body failed.
    #[error("failed to read response body (status {}): {source}", .head.status)]
    BodyRead {
        head: Box<ResponseHead>,
        #[source]
        source: BodyError,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] BoxError),
}

/// The core trait for everything that performs HTTP exchanges.
///
/// # Contract
///
/// - Implementations **must** be `Send + Sync`; a transport is shared by every
///   task issuing requests through it.
/// - `round_trip` answers exactly one request. It returns either a response,
///   whose body the caller owns, or an error.
/// - Timeouts and cancellation belong to the implementation. Dropping the
///   returned future abandons the exchange.
pub trait Transport: Send + Sync {
    /// Performs one exchange.
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>>;
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        (**self).round_trip(request)
    }
}

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        (**self).round_trip(request)
    }
}

/// A [`Transport`] backed by an async closure. Built by [`transport_fn`].
pub struct FnTransport<F> {
    f: F,
}

/// Converts an async closure into a [`Transport`].
///
/// Handy for stubbing an origin or for adapting another client library.
///
/// # Examples
///
/// ```
/// use roundcache::http::{Request, Response, StatusCode};
/// use roundcache::transport::{Transport, transport_fn};
///
/// # futures::executor::block_on(async {
/// let origin = transport_fn(|_req: Request| async {
///     Ok(Response::new(StatusCode::OK).body("hi"))
/// });
///
/// let response = origin
///     .round_trip(Request::get("http://localhost/").unwrap())
///     .await
///     .unwrap();
/// assert_eq!(response.text().await.unwrap(), "hi");
/// # });
/// ```
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    FnTransport { f }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin((self.f)(request))
    }
}

impl<F> fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnTransport")
    }
}
