//! Fetches a URL twice through a caching transport and reports timings.
//!
//! ```text
//! RUST_LOG=roundcache=debug cargo run --example fetch_twice -- https://example.com/
//! ```

use std::time::{Duration, Instant};

use roundcache::{CachingTransport, Request, Transport};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roundcache=debug")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/".to_owned());
    let transport = CachingTransport::new(Duration::from_secs(60))?;

    for attempt in 1..=2 {
        let started = Instant::now();
        let response = transport.round_trip(Request::get(&url)?).await?;
        let status = response.status();
        let body = response.bytes().await?;
        println!(
            "#{attempt}: {status}, {} bytes in {:?}",
            body.len(),
            started.elapsed()
        );
    }

    Ok(())
}
