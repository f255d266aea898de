//! The default network transport, backed by [`reqwest`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::Client;
use tracing::{debug, trace};

use super::{Transport, TransportError};
use crate::http::{
    Body, Headers, Request, RequestHead, Response, ResponseHead, StatusCode, TlsInfo, Version,
};

/// TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS handshake budget, added on top of the connect timeout.
pub const DEFAULT_TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between TCP keep-alive probes.
pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// How long an idle pooled connection is kept for reuse.
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Idle connections kept per host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Pick proxies from `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY`.
    pub use_env_proxy: bool,
    pub connect_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub tcp_keepalive: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Negotiate HTTP/2 over ALPN when the server offers it. When `false`
    /// only HTTP/1.1 is spoken.
    pub http2: bool,
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            use_env_proxy: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tls_handshake_timeout: DEFAULT_TLS_HANDSHAKE_TIMEOUT,
            tcp_keepalive: DEFAULT_TCP_KEEPALIVE,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            http2: true,
            user_agent: Some(concat!("roundcache/", env!("CARGO_PKG_VERSION")).to_owned()),
        }
    }
}

/// A general-purpose HTTP transport with connection pooling, TLS and
/// environment-aware proxy selection.
///
/// Redirects are returned to the caller as-is; following them is a client
/// concern, not a transport one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with [`HttpTransportConfig::default`].
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&HttpTransportConfig::default())
    }

    /// Creates a transport with the given settings.
    pub fn with_config(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(connect_budget(config))
            .tcp_keepalive(config.tcp_keepalive)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .redirect(reqwest::redirect::Policy::none())
            .tls_info(true);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if !config.use_env_proxy {
            builder = builder.no_proxy();
            debug!("environment proxy selection disabled");
        }

        if !config.http2 {
            builder = builder.http1_only();
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Build(e.into()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn outgoing(&self, request: &Request) -> Result<reqwest::Request, TransportError> {
        let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.into()))?;

        let mut builder = self.client.request(method, request.url().clone());
        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.clone());
        }

        Ok(builder.build()?)
    }
}

impl Transport for HttpTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(async move {
            let outgoing = self.outgoing(&request)?;
            let origin = Arc::new(request.head());

            trace!(method = %origin.method, url = %origin.url, "sending request");
            let response = self.client.execute(outgoing).await?;
            trace!(url = %origin.url, status = response.status().as_u16(), "response received");

            Ok(incoming(response, origin))
        })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.into())
        } else if err.is_connect() {
            Self::Connect(err.into())
        } else if err.is_builder() {
            Self::InvalidRequest(err.into())
        } else {
            Self::Exchange(err.into())
        }
    }
}

// The connector dials and handshakes in one step, so both budgets share its
// timeout. `Duration::MAX` in either field means no limit.
fn connect_budget(config: &HttpTransportConfig) -> Duration {
    config
        .connect_timeout
        .saturating_add(config.tls_handshake_timeout)
}

// Values that are not UTF-8 are dropped rather than rewritten.
fn header_fields(map: &reqwest::header::HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| match std::str::from_utf8(value.as_bytes()) {
            Ok(text) => Some((name.as_str().to_owned(), text.to_owned())),
            Err(_) => {
                debug!(header = %name, "dropping response header with non-UTF-8 value");
                None
            }
        })
        .collect()
}

// Converts a live reqwest response; the body stays a lazy network stream.
fn incoming(response: reqwest::Response, origin: Arc<RequestHead>) -> Response {
    let headers = header_fields(response.headers());

    let close = headers
        .get_all("connection")
        .any(|value| value.eq_ignore_ascii_case("close"));

    let tls = response
        .extensions()
        .get::<reqwest::tls::TlsInfo>()
        .map(|info| TlsInfo {
            peer_certificate: info.peer_certificate().map(Bytes::copy_from_slice),
        });

    let head = ResponseHead {
        status: StatusCode::from_u16(response.status().as_u16()),
        version: version_of(response.version()),
        content_length: response.content_length(),
        headers,
        trailers: Headers::new(),
        close,
        uncompressed: false,
        request: Some(origin),
        tls,
    };

    Response::from_parts(head, Body::wrap_stream(response.bytes_stream()))
}

fn version_of(version: reqwest::Version) -> Version {
    if version == reqwest::Version::HTTP_09 {
        Version::Http09
    } else if version == reqwest::Version::HTTP_10 {
        Version::Http10
    } else if version == reqwest::Version::HTTP_2 {
        Version::Http2
    } else if version == reqwest::Version::HTTP_3 {
        Version::Http3
    } else {
        Version::Http11
    }
}
