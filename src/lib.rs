//! # roundcache
//!
//! A transparent, TTL-based response cache for async HTTP client transports.
//!
//! [`CachingTransport`] wraps any [`Transport`] and answers repeated `GET`
//! requests from memory until their entries expire. Everything else about the
//! exchange (request shape, response shape, errors) is exactly what the
//! wrapped transport would have produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use roundcache::{CachingTransport, NO_CACHE_HEADER, Request, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = CachingTransport::new(Duration::from_secs(30))?;
//!
//!     // Live fetch, captured for 30 seconds.
//!     let response = transport.round_trip(Request::get("https://example.com/")?).await?;
//!     println!("{}", response.text().await?);
//!
//!     // Served from memory.
//!     let cached = transport.round_trip(Request::get("https://example.com/")?).await?;
//!
//!     // Forces a live fetch and refreshes the entry.
//!     let refreshed = transport
//!         .round_trip(Request::get("https://example.com/")?.header(NO_CACHE_HEADER, "1"))
//!         .await?;
//!     # let _ = (cached, refreshed);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod http;
pub mod transport;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{CacheEntry, CacheStore};
pub use http::{Body, BodyError, Headers, Method, Request, Response, StatusCode};
pub use transport::{
    CachingTransport, HttpTransport, NO_CACHE_HEADER, Transport, TransportError, transport_fn,
};
