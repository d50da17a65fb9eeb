use axum::extract::FromRef;

use crate::lyrics::QuoteFetcher;
use crate::quote_store::QuoteStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedQuoteStore = Arc<dyn QuoteStore>;
pub type GuardedQuoteFetcher = Arc<QuoteFetcher>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub quote_store: GuardedQuoteStore,
    pub quote_fetcher: GuardedQuoteFetcher,
}

impl FromRef<ServerState> for GuardedQuoteStore {
    fn from_ref(input: &ServerState) -> Self {
        input.quote_store.clone()
    }
}

impl FromRef<ServerState> for GuardedQuoteFetcher {
    fn from_ref(input: &ServerState) -> Self {
        input.quote_fetcher.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
