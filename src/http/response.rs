//! HTTP responses as received by a client.
//!
//! A [`Response`] is split into its metadata ([`ResponseHead`]) and a
//! read-once [`Body`]. The split is what lets a cache keep the metadata and
//! the captured bytes while handing each caller its own readable body.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::{Body, BodyError, Headers, RequestHead, StatusCode, Version};

/// TLS connection state observed while receiving a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsInfo {
    /// DER-encoded leaf certificate presented by the server, if any.
    pub peer_certificate: Option<Bytes>,
}

/// Everything about a response except its body.
#[derive(Debug, Clone, Default)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub version: Version,
    pub headers: Headers,
    pub trailers: Headers,
    /// Declared body length, when the server announced one.
    pub content_length: Option<u64>,
    /// The server asked for the connection to be closed after this exchange.
    pub close: bool,
    /// The transport transparently decoded a compressed body.
    pub uncompressed: bool,
    /// The request this response answers.
    pub request: Option<Arc<RequestHead>>,
    pub tls: Option<TlsInfo>,
}

/// An HTTP response.
///
/// # Examples
///
/// ```
/// use roundcache::http::{Response, StatusCode};
///
/// # futures::executor::block_on(async {
/// let response = Response::new(StatusCode::OK)
///     .header("Content-Type", "application/json")
///     .body(r#"{"status":"ok"}"#);
///
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.content_length(), Some(15));
/// assert_eq!(response.text().await.unwrap(), r#"{"status":"ok"}"#);
/// # });
/// ```
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: Body,
}

impl Response {
    /// Creates a new HTTP/1.1 response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            head: ResponseHead {
                status,
                content_length: Some(0),
                ..ResponseHead::default()
            },
            body: Body::empty(),
        }
    }

    /// Reassembles a response from its metadata and a body.
    pub fn from_parts(head: ResponseHead, body: Body) -> Self {
        Self { head, body }
    }

    /// Splits the response into its metadata and its body.
    pub fn into_parts(self) -> (ResponseHead, Body) {
        (self.head, self.body)
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.head.headers.insert(name, value);
        self
    }

    /// Appends a trailer field.
    #[must_use]
    pub fn trailer(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.head.trailers.insert(name, value);
        self
    }

    /// Sets the body. Buffered bodies also set the content length.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self.head.content_length = self.body.exact_len();
        self
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn version(mut self, version: Version) -> Self {
        self.head.version = version;
        self
    }

    /// Marks whether the connection is closed after this response.
    #[must_use]
    pub fn close(mut self, close: bool) -> Self {
        self.head.close = close;
        self
    }

    /// Records the request this response answers.
    #[must_use]
    pub fn request(mut self, request: RequestHead) -> Self {
        self.head.request = Some(Arc::new(request));
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    /// Returns the protocol version the response was received over.
    pub fn protocol_version(&self) -> Version {
        self.head.version
    }

    pub fn headers(&self) -> &Headers {
        &self.head.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.head.headers
    }

    pub fn trailers(&self) -> &Headers {
        &self.head.trailers
    }

    pub fn content_length(&self) -> Option<u64> {
        self.head.content_length
    }

    /// Returns `true` if the server closed the connection after this response.
    pub fn is_close(&self) -> bool {
        self.head.close
    }

    pub fn is_uncompressed(&self) -> bool {
        self.head.uncompressed
    }

    /// Returns the request this response answers, when the transport recorded it.
    pub fn originating_request(&self) -> Option<&RequestHead> {
        self.head.request.as_deref()
    }

    pub fn tls_info(&self) -> Option<&TlsInfo> {
        self.head.tls.as_ref()
    }

    /// Returns the response metadata.
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// Returns the body for chunk-by-chunk reading or closing.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Reads the full body.
    pub async fn bytes(self) -> Result<Bytes, BodyError> {
        self.body.collect().await
    }

    /// Reads the full body as UTF-8 text.
    pub async fn text(self) -> Result<String, BodyError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Reads the full body and deserializes it as JSON.
    pub async fn json<T>(self) -> Result<T, BodyError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
