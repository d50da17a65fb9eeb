//! Quote persistence.
//!
//! Two backends implement [`QuoteStore`]: a SQLite database for production and
//! an in-memory list used when no database is configured.

mod fallback;
mod memory_store;
mod models;
mod schema;
mod sqlite_store;

pub use fallback::{fallback_quotes, FallbackQuote, FALLBACK_QUOTES};
pub use memory_store::InMemoryQuoteStore;
pub use models::{
    NewQuote, Quote, QuoteSource, QuoteStats, QuotesPage, SourceCount, YearCount,
};
pub use schema::QUOTES_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteQuoteStore;

use anyhow::Result;

/// Storage operations needed by the HTTP layer and the quote fetcher.
///
/// Every read only sees active quotes, except [`QuoteStore::count_all_quotes`].
pub trait QuoteStore: Send + Sync {
    /// Short name of the backend, reported by the status endpoint.
    fn kind(&self) -> &'static str;

    fn random_quote(&self) -> Result<Option<Quote>>;

    /// Returns page `page` (1-based) of quotes, newest first.
    fn list_quotes(&self, page: usize, limit: usize) -> Result<QuotesPage>;

    /// Case-insensitive substring match on the song title, most popular first.
    fn quotes_by_song(&self, song: &str) -> Result<Vec<Quote>>;

    fn search_quotes(&self, query: &str) -> Result<Vec<Quote>>;

    fn stats(&self) -> Result<QuoteStats>;

    fn insert_quote(&self, quote: NewQuote) -> Result<Quote>;

    /// Inserts the quote unless one with the same text and song already
    /// exists, active or not. Returns `None` when nothing was inserted.
    fn insert_quote_if_absent(&self, quote: NewQuote) -> Result<Option<Quote>>;

    fn increment_popularity(&self, id: &str) -> Result<Option<Quote>>;

    /// Soft-deletes a quote. Returns `None` if it is unknown or already inactive.
    fn deactivate_quote(&self, id: &str) -> Result<Option<Quote>>;

    fn count_all_quotes(&self) -> Result<usize>;
}
