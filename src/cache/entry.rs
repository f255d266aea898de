//! Captured responses.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::http::{Body, Response, ResponseHead};

// Fallback horizon when `capture time + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// One captured response: metadata, body bytes and an absolute expiry.
///
/// Nothing about an entry changes once it is built. Refreshing a key means
/// storing a new entry in its place.
#[derive(Debug)]
pub struct CacheEntry {
    head: ResponseHead,
    body: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates an entry that expires at `expires_at`.
    pub fn new(head: ResponseHead, body: Bytes, expires_at: Instant) -> Self {
        Self {
            head,
            body,
            expires_at,
        }
    }

    /// Creates an entry captured at `captured_at` that lives for `ttl`.
    pub fn captured(head: ResponseHead, body: Bytes, captured_at: Instant, ttl: Duration) -> Self {
        let expires_at = captured_at
            .checked_add(ttl)
            .unwrap_or_else(|| captured_at + FAR_FUTURE);
        Self::new(head, body, expires_at)
    }

    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns `true` while the expiry lies strictly after `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }

    /// Builds a caller-owned response from this entry.
    ///
    /// Headers, trailers and the rest of the metadata are cloned, and the body
    /// is a new read-once stream over the shared immutable bytes, so whatever
    /// the caller does to the response never reaches the entry.
    pub fn materialize(&self) -> Response {
        Response::from_parts(self.head.clone(), Body::from(self.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn head() -> ResponseHead {
        Response::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .into_parts()
            .0
    }

    #[test]
    fn freshness_is_strict() {
        let now = Instant::now();
        let entry = CacheEntry::captured(head(), Bytes::new(), now, Duration::from_secs(10));

        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + Duration::from_secs(9)));
        assert!(!entry.is_fresh(now + Duration::from_secs(10)));
        assert!(!entry.is_fresh(now + Duration::from_secs(11)));
    }

    #[test]
    fn zero_ttl_is_never_fresh() {
        let now = Instant::now();
        let entry = CacheEntry::captured(head(), Bytes::new(), now, Duration::ZERO);
        assert!(!entry.is_fresh(now));
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = CacheEntry::captured(head(), Bytes::new(), now, Duration::MAX);
        assert!(entry.is_fresh(now + Duration::from_secs(86_400 * 365)));
    }

    #[tokio::test]
    async fn materialized_responses_are_independent() {
        let entry = CacheEntry::captured(
            head(),
            Bytes::from_static(b"payload"),
            Instant::now(),
            Duration::from_secs(60),
        );

        let mut first = entry.materialize();
        first.headers_mut().set("Content-Type", "application/octet-stream");
        first.body_mut().close();

        let second = entry.materialize();
        assert_eq!(second.headers().get("content-type"), Some("text/plain"));
        assert_eq!(&second.bytes().await.unwrap()[..], b"payload");
        assert_eq!(entry.head().headers.get("content-type"), Some("text/plain"));
        assert_eq!(&entry.body()[..], b"payload");
    }
}
