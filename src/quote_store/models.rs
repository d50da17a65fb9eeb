use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How a quote entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Manual,
    Scraped,
    Fallback,
    Api,
    Genius,
    Musixmatch,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::Manual => "manual",
            QuoteSource::Scraped => "scraped",
            QuoteSource::Fallback => "fallback",
            QuoteSource::Api => "api",
            QuoteSource::Genius => "genius",
            QuoteSource::Musixmatch => "musixmatch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(QuoteSource::Manual),
            "scraped" => Some(QuoteSource::Scraped),
            "fallback" => Some(QuoteSource::Fallback),
            "api" => Some(QuoteSource::Api),
            "genius" => Some(QuoteSource::Genius),
            "musixmatch" => Some(QuoteSource::Musixmatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: String,
    pub song: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub source: QuoteSource,
    pub tags: Vec<String>,
    pub popularity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quote that has not been stored yet.
///
/// Constructed through [`NewQuote::new`], which trims the text fields and
/// drops duplicate tags, so every store receives normalized input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuote {
    pub text: String,
    pub author: String,
    pub song: String,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub source: QuoteSource,
    pub tags: Vec<String>,
}

impl NewQuote {
    pub fn new<T: Into<String>, S: Into<String>, A: Into<String>>(
        text: T,
        song: S,
        author: A,
        source: QuoteSource,
    ) -> Self {
        NewQuote {
            text: text.into().trim().to_string(),
            author: author.into().trim().to_string(),
            song: song.into().trim().to_string(),
            album: None,
            year: None,
            source,
            tags: vec![],
        }
    }

    pub fn with_album<S: Into<String>>(mut self, album: Option<S>) -> Self {
        self.album = album
            .map(|a| a.into().trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_tags<I: IntoIterator<Item = String>>(mut self, tags: I) -> Self {
        let mut unique: Vec<String> = vec![];
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        self.tags = unique;
        self
    }

    pub(crate) fn into_quote(self, now: DateTime<Utc>) -> Quote {
        Quote {
            id: uuid::Uuid::new_v4().to_string(),
            text: self.text,
            author: self.author,
            song: self.song,
            album: self.album,
            year: self.year,
            source: self.source,
            tags: self.tags,
            popularity: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

pub struct QuotesPage {
    pub quotes: Vec<Quote>,
    /// Number of active quotes, regardless of the requested page.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: QuoteSource,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteStats {
    pub total_quotes: usize,
    pub total_songs: usize,
    pub total_albums: usize,
    pub source_stats: Vec<SourceCount>,
    pub year_stats: Vec<YearCount>,
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that their
/// lexicographic order matches chronological order.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
