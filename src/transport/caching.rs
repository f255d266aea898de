//! A transport decorator that answers GET requests from an in-memory cache.
//!
//! [`CachingTransport`] wraps any other [`Transport`]. For each request it
//! either materializes a response from a stored [`CacheEntry`] or forwards
//! the request and captures the result:
//!
//! | Request                                   | Behavior                                |
//! |-------------------------------------------|-----------------------------------------|
//! | not `GET`                                 | forwarded verbatim, cache untouched     |
//! | `GET`, fresh entry, no bypass header      | served from cache, no network call      |
//! | `GET`, missing/expired entry, or bypassed | forwarded; `2xx` bodies captured/stored |
//!
//! Every entry lives for the same fixed TTL. Expired entries are not removed;
//! they are replaced by the next successful fetch for their key.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::{HttpTransport, Transport, TransportError};
use crate::cache::{CacheEntry, CacheStore, Flight};
use crate::http::{Method, Request, Response, StatusCode};

/// Request header that forces a live fetch when set to a non-empty value.
///
/// The fresh response still replaces the cached entry.
pub const NO_CACHE_HEADER: &str = "X-No-Cache";

/// The caching transport. See the [module docs](self) for the decision table.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
/// use roundcache::http::Request;
/// use roundcache::transport::{CachingTransport, Transport};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let transport = CachingTransport::new(Duration::from_secs(60))?;
///
///     let first = transport.round_trip(Request::get("https://example.com/")?).await?;
///     let second = transport.round_trip(Request::get("https://example.com/")?).await?;
///     assert_eq!(first.bytes().await?, second.bytes().await?);
///     Ok(())
/// }
/// ```
pub struct CachingTransport<T = HttpTransport> {
    inner: T,
    ttl: Duration,
    bypass_header: String,
    store: CacheStore,
    flight: Flight,
}

/// Builder for [`CachingTransport`].
///
/// Finish with [`build`](Self::build) to wrap a default [`HttpTransport`], or
/// with [`wrap`](Self::wrap) to decorate a transport of your own.
#[derive(Debug)]
pub struct CachingTransportBuilder {
    ttl: Duration,
    bypass_header: String,
    store: Option<CacheStore>,
}

impl CachingTransportBuilder {
    /// Starts a builder for entries that live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            bypass_header: NO_CACHE_HEADER.to_owned(),
            store: None,
        }
    }

    /// Uses `name` instead of [`NO_CACHE_HEADER`] as the bypass signal.
    #[must_use]
    pub fn bypass_header(mut self, name: impl Into<String>) -> Self {
        self.bypass_header = name.into();
        self
    }

    /// Starts from a caller-provided store instead of an empty one.
    #[must_use]
    pub fn store(mut self, store: CacheStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Decorates `inner`.
    pub fn wrap<T: Transport>(self, inner: T) -> CachingTransport<T> {
        CachingTransport {
            inner,
            ttl: self.ttl,
            bypass_header: self.bypass_header,
            store: self.store.unwrap_or_default(),
            flight: Flight::new(),
        }
    }

    /// Decorates a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<CachingTransport<HttpTransport>, TransportError> {
        Ok(self.wrap(HttpTransport::new()?))
    }
}

impl CachingTransport<HttpTransport> {
    /// Creates a caching transport over a default [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] if the HTTP client cannot be created.
    pub fn new(ttl: Duration) -> Result<Self, TransportError> {
        CachingTransportBuilder::new(ttl).build()
    }

    /// Starts a [`CachingTransportBuilder`].
    pub fn builder(ttl: Duration) -> CachingTransportBuilder {
        CachingTransportBuilder::new(ttl)
    }
}

impl<T: Transport> CachingTransport<T> {
    /// Lifetime applied to every stored entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Name of the header that forces a live fetch.
    pub fn bypass_header(&self) -> &str {
        &self.bypass_header
    }

    /// The store backing this transport.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn bypass_requested(&self, request: &Request) -> bool {
        request
            .headers()
            .get(&self.bypass_header)
            .is_some_and(|value| !value.is_empty())
    }

    // Forwards the request and captures a storable response.
    async fn fetch(&self, key: &str, request: Request) -> Result<Response, TransportError> {
        let response = self.inner.round_trip(request).await?;

        let status = response.status();
        if !is_storable(status) {
            debug!(key = %key, status = status.as_u16(), "response not cacheable");
            return Ok(response);
        }

        let (head, body) = response.into_parts();
        let bytes = match body.collect().await {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!(key = %key, error = %source, "failed to capture response body");
                return Err(TransportError::BodyRead {
                    head: Box::new(head),
                    source,
                });
            }
        };

        let entry = Arc::new(CacheEntry::captured(head, bytes, Instant::now(), self.ttl));
        self.store.store(key, Arc::clone(&entry));
        debug!(key = %key, bytes = entry.body().len(), ttl = ?self.ttl, "response cached");

        Ok(entry.materialize())
    }
}

impl<T: Transport> Transport for CachingTransport<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(async move {
            if *request.method() != Method::Get {
                trace!(method = %request.method(), url = %request.url(), "not cacheable, forwarding");
                return self.inner.round_trip(request).await;
            }

            let key = request.cache_key();
            if self.bypass_requested(&request) {
                debug!(key = %key, header = %self.bypass_header, "cache bypass requested");
            } else {
                match self.store.lookup(&key) {
                    Some(entry) if entry.is_fresh(Instant::now()) => {
                        debug!(key = %key, "cache hit");
                        return Ok(entry.materialize());
                    }
                    Some(_) => debug!(key = %key, "cache entry expired"),
                    None => debug!(key = %key, "cache miss"),
                }
            }

            self.flight.run(&key, self.fetch(&key, request)).await
        })
    }
}

// Any status up to 299 is replayed, informational ones included.
fn is_storable(status: StatusCode) -> bool {
    status.as_u16() <= 299
}
