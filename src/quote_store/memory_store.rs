use super::fallback::fallback_quotes;
use super::models::{
    NewQuote, Quote, QuoteSource, QuoteStats, QuotesPage, SourceCount, YearCount,
};
use super::QuoteStore;
use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use rand::seq::IndexedRandom;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Quotes kept in insertion order behind a single lock.
pub struct InMemoryQuoteStore {
    quotes: Mutex<Vec<Quote>>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self {
            quotes: Mutex::new(vec![]),
        }
    }

    pub fn with_quotes<I: IntoIterator<Item = NewQuote>>(quotes: I) -> Self {
        let now = Utc::now();
        Self {
            quotes: Mutex::new(quotes.into_iter().map(|q| q.into_quote(now)).collect()),
        }
    }

    /// A store pre-loaded with the fallback set.
    pub fn with_fallback(author: &str, tags: &[String]) -> Self {
        Self::with_quotes(fallback_quotes(author, tags))
    }

    fn quotes(&self) -> Result<MutexGuard<'_, Vec<Quote>>> {
        self.quotes
            .lock()
            .map_err(|_| anyhow!("In-memory quote store lock poisoned"))
    }

    fn update_active<F: FnOnce(&mut Quote)>(&self, id: &str, update: F) -> Result<Option<Quote>> {
        let mut quotes = self.quotes()?;
        Ok(quotes
            .iter_mut()
            .find(|q| q.id == id && q.is_active)
            .map(|quote| {
                update(quote);
                quote.updated_at = Utc::now();
                quote.clone()
            }))
    }
}

impl Default for InMemoryQuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_ignore_case(haystack: &str, needle_lowercase: &str) -> bool {
    haystack.to_lowercase().contains(needle_lowercase)
}

impl QuoteStore for InMemoryQuoteStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn random_quote(&self) -> Result<Option<Quote>> {
        let quotes = self.quotes()?;
        let active: Vec<&Quote> = quotes.iter().filter(|q| q.is_active).collect();
        Ok(active.choose(&mut rand::rng()).map(|q| (*q).clone()))
    }

    fn list_quotes(&self, page: usize, limit: usize) -> Result<QuotesPage> {
        if page == 0 || limit == 0 {
            bail!("Page and limit must be positive, got {} and {}", page, limit);
        }
        let quotes = self.quotes()?;
        // Reversed before the stable sort so equal timestamps keep newest insert first
        let mut active: Vec<&Quote> = quotes.iter().rev().filter(|q| q.is_active).collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = active.len();
        let quotes = active
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();
        Ok(QuotesPage { quotes, total })
    }

    fn quotes_by_song(&self, song: &str) -> Result<Vec<Quote>> {
        let needle = song.to_lowercase();
        let quotes = self.quotes()?;
        let mut matching: Vec<&Quote> = quotes
            .iter()
            .rev()
            .filter(|q| q.is_active && contains_ignore_case(&q.song, &needle))
            .collect();
        matching.sort_by(|a, b| {
            b.popularity
                .cmp(&a.popularity)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(matching.into_iter().cloned().collect())
    }

    fn search_quotes(&self, query: &str) -> Result<Vec<Quote>> {
        let needle = query.trim().to_lowercase();
        let quotes = self.quotes()?;
        Ok(quotes
            .iter()
            .filter(|q| {
                q.is_active
                    && (contains_ignore_case(&q.text, &needle)
                        || contains_ignore_case(&q.song, &needle)
                        || q
                            .album
                            .as_deref()
                            .is_some_and(|album| contains_ignore_case(album, &needle)))
            })
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<QuoteStats> {
        let quotes = self.quotes()?;
        let active: Vec<&Quote> = quotes.iter().filter(|q| q.is_active).collect();

        let songs: HashSet<&str> = active.iter().map(|q| q.song.as_str()).collect();
        let albums: HashSet<&str> = active.iter().filter_map(|q| q.album.as_deref()).collect();

        let mut by_source: HashMap<QuoteSource, usize> = HashMap::new();
        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        for quote in &active {
            *by_source.entry(quote.source).or_default() += 1;
            if let Some(year) = quote.year {
                *by_year.entry(year).or_default() += 1;
            }
        }

        let mut source_stats: Vec<SourceCount> = by_source
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect();
        source_stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.source.as_str().cmp(b.source.as_str()))
        });

        Ok(QuoteStats {
            total_quotes: active.len(),
            total_songs: songs.len(),
            total_albums: albums.len(),
            source_stats,
            year_stats: by_year
                .into_iter()
                .rev()
                .map(|(year, count)| YearCount { year, count })
                .collect(),
        })
    }

    fn insert_quote(&self, quote: NewQuote) -> Result<Quote> {
        let quote = quote.into_quote(Utc::now());
        self.quotes()?.push(quote.clone());
        Ok(quote)
    }

    fn insert_quote_if_absent(&self, quote: NewQuote) -> Result<Option<Quote>> {
        let mut quotes = self.quotes()?;
        if quotes
            .iter()
            .any(|q| q.text == quote.text && q.song == quote.song)
        {
            return Ok(None);
        }
        let quote = quote.into_quote(Utc::now());
        quotes.push(quote.clone());
        Ok(Some(quote))
    }

    fn increment_popularity(&self, id: &str) -> Result<Option<Quote>> {
        self.update_active(id, |quote| quote.popularity += 1)
    }

    fn deactivate_quote(&self, id: &str) -> Result<Option<Quote>> {
        self.update_active(id, |quote| quote.is_active = false)
    }

    fn count_all_quotes(&self) -> Result<usize> {
        Ok(self.quotes()?.len())
    }
}
