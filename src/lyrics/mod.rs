//! Lyrics providers and the fetch-and-store pipeline built on top of them.

mod extract;
mod fetcher;
mod genius;
mod musixmatch;

pub use extract::extract_quote_lines;
pub use fetcher::{default_tags, QuoteFetcher, MIN_FETCHED_QUOTES};
pub use genius::{GeniusProvider, DEFAULT_GENIUS_BASE_URL};
pub use musixmatch::{MusixmatchProvider, DEFAULT_MUSIXMATCH_BASE_URL};

use crate::quote_store::QuoteSource;
use anyhow::Result;
use async_trait::async_trait;

/// Number of songs or tracks looked up in detail per provider call.
pub const SONGS_PER_PROVIDER: usize = 5;

/// A quote proposed by a provider, not yet de-duplicated or stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuote {
    pub text: String,
    pub song: String,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub source: QuoteSource,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_candidates(&self) -> Result<Vec<CandidateQuote>>;
}

fn build_http_client(timeout_sec: u64) -> Result<reqwest::Client> {
    use anyhow::Context;

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_sec))
        .build()
        .context("Failed to create HTTP client")
}

/// Serves `router` on a random local port and returns its base URL.
#[cfg(test)]
pub(crate) async fn spawn_stub_api(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
