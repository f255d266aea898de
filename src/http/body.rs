//! Read-once response bodies.
//!
//! A [`Body`] is either fully buffered in memory or a lazy stream of chunks
//! produced by a transport. Either way it can be consumed exactly once.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt};
use thiserror::Error;

/// Boxed error type used for failures originating in arbitrary transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while reading or decoding a body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("failed to read body stream: {0}")]
    Stream(#[source] BoxError),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl BodyError {
    /// Wraps any error raised by the underlying byte stream.
    pub fn stream(err: impl Into<BoxError>) -> Self {
        Self::Stream(err.into())
    }
}

/// A read-once HTTP body.
///
/// # Examples
///
/// ```
/// use roundcache::http::Body;
///
/// # futures::executor::block_on(async {
/// let body = Body::from("hello");
/// let bytes = body.collect().await.unwrap();
/// assert_eq!(&bytes[..], b"hello");
/// # });
/// ```
pub struct Body {
    kind: Kind,
}

enum Kind {
    Empty,
    Full(Bytes),
    Streaming(BoxStream<'static, Result<Bytes, BodyError>>),
}

impl Body {
    /// Creates an empty body.
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    /// Wraps a stream of byte chunks, such as the body of a live network response.
    pub fn wrap_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            kind: Kind::Streaming(stream.map(|chunk| chunk.map_err(BodyError::stream)).boxed()),
        }
    }

    /// Returns the exact length if the body is buffered in memory.
    pub fn exact_len(&self) -> Option<u64> {
        match &self.kind {
            Kind::Empty => Some(0),
            Kind::Full(bytes) => Some(bytes.len() as u64),
            Kind::Streaming(_) => None,
        }
    }

    /// Reads the next chunk, or `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, BodyError> {
        self.next().await.transpose()
    }

    /// Drains the whole body into one contiguous buffer.
    ///
    /// The underlying stream is dropped when this returns, whether or not the
    /// read succeeded.
    pub async fn collect(self) -> Result<Bytes, BodyError> {
        match self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Full(bytes) => Ok(bytes),
            Kind::Streaming(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.put(chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    /// Discards any unread content and releases the underlying stream.
    pub fn close(&mut self) {
        self.kind = Kind::Empty;
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BodyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match &mut this.kind {
            Kind::Empty => Poll::Ready(None),
            Kind::Full(bytes) => {
                let bytes = std::mem::take(bytes);
                this.kind = Kind::Empty;
                if bytes.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(bytes)))
                }
            }
            Kind::Streaming(stream) => {
                let item = ready!(stream.poll_next_unpin(cx));
                if item.is_none() {
                    this.kind = Kind::Empty;
                }
                Poll::Ready(item)
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Empty => f.write_str("Body::Empty"),
            Kind::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
            Kind::Streaming(_) => f.write_str("Body::Streaming"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Full(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}
