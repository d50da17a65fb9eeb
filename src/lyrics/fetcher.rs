use super::{CandidateQuote, LyricsProvider};
use crate::quote_store::{
    fallback_quotes, NewQuote, Quote, QuoteSource, QuoteStore, FALLBACK_QUOTES,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Below this many provider candidates the fallback set is added as well.
pub const MIN_FETCHED_QUOTES: usize = 5;

pub fn default_tags(artist: &str) -> Vec<String> {
    vec![
        "music".to_string(),
        artist.to_lowercase(),
        "lyrics".to_string(),
    ]
}

/// Collects candidate quotes from the configured providers and stores the
/// ones not seen before.
pub struct QuoteFetcher {
    providers: Vec<Arc<dyn LyricsProvider>>,
    store: Arc<dyn QuoteStore>,
    author: String,
    tags: Vec<String>,
}

impl QuoteFetcher {
    pub fn new(
        providers: Vec<Arc<dyn LyricsProvider>>,
        store: Arc<dyn QuoteStore>,
        artist: &str,
    ) -> Self {
        Self {
            providers,
            store,
            author: artist.to_string(),
            tags: default_tags(artist),
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    async fn collect_candidates(&self) -> Vec<CandidateQuote> {
        let mut candidates = vec![];
        for provider in &self.providers {
            match provider.fetch_candidates().await {
                Ok(found) => {
                    info!("Provider {} returned {} candidates", provider.name(), found.len());
                    candidates.extend(found);
                }
                Err(err) => warn!("Provider {} failed: {:#}", provider.name(), err),
            }
        }

        if candidates.len() < MIN_FETCHED_QUOTES {
            info!(
                "Only {} candidates from providers, adding the fallback set",
                candidates.len()
            );
            candidates.extend(FALLBACK_QUOTES.iter().map(|q| CandidateQuote {
                text: q.text.to_string(),
                song: q.song.to_string(),
                album: Some(q.album.to_string()),
                year: Some(q.year),
                source: QuoteSource::Fallback,
            }));
        }
        candidates
    }

    /// Stores `quote` unless it is already present. A store error is logged
    /// and reported back so the caller can carry on with the next quote.
    fn store_if_absent(&self, quote: NewQuote) -> Result<Option<Quote>> {
        let text = quote.text.clone();
        match self.store.insert_quote_if_absent(quote) {
            Ok(Some(quote)) => {
                debug!("Stored quote {}: {}", quote.id, quote.text);
                Ok(Some(quote))
            }
            Ok(None) => {
                debug!("Quote already exists: {}", text);
                Ok(None)
            }
            Err(err) => {
                warn!("Failed to store quote '{}': {:#}", text, err);
                Err(err)
            }
        }
    }

    /// Returns the quotes that were actually inserted.
    ///
    /// A failed insert is skipped. Only when every insert failed is the last
    /// error returned.
    pub async fn fetch_and_store(&self) -> Result<Vec<Quote>> {
        info!("Fetching new quotes for {}", self.author);
        let candidates = self.collect_candidates().await;

        let mut stored = vec![];
        let mut attempted = 0;
        let mut failures = 0;
        let mut last_error = None;
        for candidate in candidates {
            let quote = NewQuote::new(
                candidate.text,
                candidate.song,
                self.author.as_str(),
                candidate.source,
            )
            .with_album(candidate.album)
            .with_year(candidate.year)
            .with_tags(self.tags.clone());

            if quote.text.is_empty() || quote.song.is_empty() {
                continue;
            }
            attempted += 1;
            match self.store_if_absent(quote) {
                Ok(Some(quote)) => stored.push(quote),
                Ok(None) => {}
                Err(err) => {
                    failures += 1;
                    last_error = Some(err);
                }
            }
        }

        if let Some(err) = last_error {
            if failures == attempted {
                return Err(err.context("Every quote insert failed"));
            }
            warn!("{} of {} quote inserts failed", failures, attempted);
        }
        info!("Stored {} new quotes", stored.len());
        Ok(stored)
    }

    /// Fills an empty store, first from the providers then from the fallback
    /// set. Returns the number of quotes added.
    pub async fn seed_if_empty(&self) -> Result<usize> {
        let existing = self.store.count_all_quotes()?;
        if existing > 0 {
            info!("Store already has {} quotes, skipping seeding", existing);
            return Ok(0);
        }

        let mut added = self.fetch_and_store().await?.len();
        for quote in fallback_quotes(&self.author, &self.tags) {
            if let Ok(Some(_)) = self.store_if_absent(quote) {
                added += 1;
            }
        }
        info!("Seeded store with {} quotes", added);
        Ok(added)
    }
}
