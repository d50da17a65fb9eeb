//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own quote store.

use super::constants::*;
use super::fixtures::{
    create_empty_sqlite_store, create_fallback_sqlite_store, spawn_stub_provider_api,
};
use lyric_quotes_server::lyrics::{
    default_tags, GeniusProvider, LyricsProvider, MusixmatchProvider, QuoteFetcher,
};
use lyric_quotes_server::quote_store::{InMemoryQuoteStore, QuoteStore};
use lyric_quotes_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated quote store
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The store behind the server, for direct access in tests
    pub store: Arc<dyn QuoteStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: Option<TempDir>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by a SQLite database holding the fallback set,
    /// with no lyrics provider configured.
    pub async fn spawn() -> Self {
        let (temp_dir, store) =
            create_fallback_sqlite_store().expect("Failed to create test database");
        Self::spawn_with(Arc::new(store), vec![], Some(temp_dir)).await
    }

    /// Spawns a server backed by the in-memory store pre-loaded with the fallback set.
    pub async fn spawn_in_memory() -> Self {
        let store = InMemoryQuoteStore::with_fallback(TEST_ARTIST, &default_tags(TEST_ARTIST));
        Self::spawn_with(Arc::new(store), vec![], None).await
    }

    /// Spawns a server with an empty SQLite database whose Genius and
    /// Musixmatch providers talk to a local stub API.
    pub async fn spawn_with_stub_providers() -> Self {
        let (temp_dir, store) =
            create_empty_sqlite_store().expect("Failed to create test database");
        let stub_url = spawn_stub_provider_api()
            .await
            .expect("Failed to start stub provider API");

        let providers: Vec<Arc<dyn LyricsProvider>> = vec![
            Arc::new(
                GeniusProvider::new(
                    &format!("{}/genius", stub_url),
                    STUB_GENIUS_TOKEN.to_string(),
                    TEST_ARTIST.to_string(),
                    REQUEST_TIMEOUT_SECS,
                )
                .expect("Failed to create Genius provider"),
            ),
            Arc::new(
                MusixmatchProvider::new(
                    &format!("{}/musixmatch", stub_url),
                    STUB_MUSIXMATCH_KEY.to_string(),
                    TEST_ARTIST.to_string(),
                    REQUEST_TIMEOUT_SECS,
                )
                .expect("Failed to create Musixmatch provider"),
            ),
        ];
        Self::spawn_with(Arc::new(store), providers, Some(temp_dir)).await
    }

    async fn spawn_with(
        store: Arc<dyn QuoteStore>,
        providers: Vec<Arc<dyn LyricsProvider>>,
        temp_db_dir: Option<TempDir>,
    ) -> Self {
        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            artist: TEST_ARTIST.to_string(),
            ..Default::default()
        };
        let fetcher = Arc::new(QuoteFetcher::new(providers, store.clone(), TEST_ARTIST));
        let app = make_app(config, store.clone(), fetcher);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /api/status endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/status", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
