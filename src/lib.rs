//! Lyric Quotes Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod lyrics;
pub mod quote_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use lyrics::{LyricsProvider, QuoteFetcher};
pub use quote_store::{InMemoryQuoteStore, QuoteStore, SqliteQuoteStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
