//! End-to-end: `CachingTransport<HttpTransport>` against a local TCP origin.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use roundcache::http::Version;
use roundcache::transport::{CachingTransportBuilder, HttpTransportConfig};
use roundcache::{HttpTransport, NO_CACHE_HEADER, Request, StatusCode, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// A one-request-per-connection origin that counts the requests it answers.
struct Origin {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl Origin {
    async fn start(status_line: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let _ = answer(stream, counter, status_line, body).await;
                });
            }
        });

        Self { addr, requests }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn answer(
    mut stream: TcpStream,
    counter: Arc<AtomicUsize>,
    status_line: &str,
    body: &str,
) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    counter.fetch_add(1, Ordering::SeqCst);

    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn local_transport() -> HttpTransport {
    HttpTransport::with_config(&HttpTransportConfig {
        use_env_proxy: false,
        http2: false,
        ..HttpTransportConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn second_get_is_served_from_memory() {
    let origin = Origin::start("200 OK", "hello").await;
    let cache = CachingTransportBuilder::new(Duration::from_secs(60)).wrap(local_transport());

    let first = cache
        .round_trip(Request::get(&origin.url("/greeting")).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.protocol_version(), Version::Http11);
    assert!(first.is_close());
    assert_eq!(first.headers().get("content-type"), Some("text/plain"));
    assert_eq!(
        first.originating_request().map(|r| r.url.path()),
        Some("/greeting")
    );
    assert_eq!(first.text().await.unwrap(), "hello");

    let second = cache
        .round_trip(Request::get(&origin.url("/greeting")).unwrap())
        .await
        .unwrap();
    assert_eq!(second.text().await.unwrap(), "hello");
    assert_eq!(origin.requests(), 1);
}

#[tokio::test]
async fn bypass_and_post_reach_the_origin() {
    let origin = Origin::start("200 OK", "fresh").await;
    let cache = CachingTransportBuilder::new(Duration::from_secs(60)).wrap(local_transport());
    let url = origin.url("/item");

    cache.round_trip(Request::get(&url).unwrap()).await.unwrap();
    cache
        .round_trip(Request::get(&url).unwrap().header(NO_CACHE_HEADER, "1"))
        .await
        .unwrap();
    cache.round_trip(Request::post(&url).unwrap()).await.unwrap();

    assert_eq!(origin.requests(), 3);
    assert_eq!(cache.store().len(), 1);
}

#[tokio::test]
async fn not_found_is_never_cached() {
    let origin = Origin::start("404 Not Found", "missing").await;
    let cache = CachingTransportBuilder::new(Duration::from_secs(60)).wrap(local_transport());
    let url = origin.url("/nope");

    for _ in 0..2 {
        let response = cache.round_trip(Request::get(&url).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.text().await.unwrap(), "missing");
    }
    assert_eq!(origin.requests(), 2);
    assert!(cache.store().is_empty());
}

#[tokio::test]
async fn refused_connection_is_a_connect_error() {
    // Grab a free port, then close it again.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let cache = CachingTransportBuilder::new(Duration::from_secs(60)).wrap(local_transport());

    let err = cache
        .round_trip(Request::get(&format!("http://{addr}/")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    assert!(cache.store().is_empty());
}
