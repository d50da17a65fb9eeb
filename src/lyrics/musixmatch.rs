//! Musixmatch API client.

use super::{
    build_http_client, extract_quote_lines, CandidateQuote, LyricsProvider, SONGS_PER_PROVIDER,
};
use crate::quote_store::QuoteSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_MUSIXMATCH_BASE_URL: &str = "https://api.musixmatch.com/ws/1.1";

const SEARCH_PAGE_SIZE: usize = 10;
const QUOTES_PER_TRACK: usize = 5;

/// Musixmatch wraps every payload in `message.header` / `message.body`, and
/// reports failures through `header.status_code` with an HTTP 200.
#[derive(Debug, Deserialize)]
struct MusixmatchEnvelope {
    message: MusixmatchMessage,
}

#[derive(Debug, Deserialize)]
struct MusixmatchMessage {
    header: MusixmatchHeader,
    #[serde(default)]
    body: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MusixmatchHeader {
    status_code: u16,
}

#[derive(Debug, Deserialize)]
struct TrackListBody {
    track_list: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    track: Track,
}

#[derive(Debug, Deserialize)]
struct Track {
    track_id: u64,
    track_name: String,
    #[serde(default)]
    album_name: Option<String>,
    #[serde(default)]
    first_release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LyricsBody {
    lyrics: Lyrics,
}

#[derive(Debug, Deserialize)]
struct Lyrics {
    lyrics_body: String,
}

pub struct MusixmatchProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    artist: String,
}

impl MusixmatchProvider {
    pub fn new(base_url: &str, api_key: String, artist: String, timeout_sec: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_sec)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            artist,
        })
    }

    /// Returns `None` when Musixmatch answers with a non-200 status code.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .context("Failed to connect to Musixmatch")?;

        if !response.status().is_success() {
            anyhow::bail!("Musixmatch {} failed with status {}", method, response.status());
        }

        let envelope: MusixmatchEnvelope = response
            .json()
            .await
            .context("Failed to parse Musixmatch response")?;
        if envelope.message.header.status_code != 200 {
            debug!(
                "Musixmatch {} returned status code {}",
                method, envelope.message.header.status_code
            );
            return Ok(None);
        }

        let body = serde_json::from_value(envelope.message.body)
            .with_context(|| format!("Unexpected Musixmatch {} body", method))?;
        Ok(Some(body))
    }

    async fn search_tracks(&self) -> Result<Vec<Track>> {
        let body: Option<TrackListBody> = self
            .call(
                "track.search",
                &[
                    ("q_artist", self.artist.clone()),
                    ("page_size", SEARCH_PAGE_SIZE.to_string()),
                    ("page", "1".to_string()),
                    ("s_track_rating", "desc".to_string()),
                ],
            )
            .await?;
        Ok(body
            .map(|b| b.track_list.into_iter().map(|item| item.track).collect())
            .unwrap_or_default())
    }

    async fn get_lyrics(&self, track_id: u64) -> Result<Option<String>> {
        let body: Option<LyricsBody> = self
            .call("track.lyrics.get", &[("track_id", track_id.to_string())])
            .await?;
        Ok(body.map(|b| b.lyrics.lyrics_body))
    }
}

fn release_year(date: &str) -> Option<i32> {
    date.split('-').next().and_then(|year| year.parse().ok())
}

#[async_trait]
impl LyricsProvider for MusixmatchProvider {
    fn name(&self) -> &'static str {
        "musixmatch"
    }

    async fn fetch_candidates(&self) -> Result<Vec<CandidateQuote>> {
        let tracks = self.search_tracks().await?;
        debug!("Found {} tracks on Musixmatch", tracks.len());

        let mut candidates = vec![];
        for track in tracks.into_iter().take(SONGS_PER_PROVIDER) {
            let lyrics = match self.get_lyrics(track.track_id).await {
                Ok(Some(lyrics)) => lyrics,
                Ok(None) => {
                    warn!("No Musixmatch lyrics for '{}'", track.track_name);
                    continue;
                }
                Err(err) => {
                    warn!(
                        "Could not get Musixmatch lyrics for '{}': {:#}",
                        track.track_name, err
                    );
                    continue;
                }
            };

            let year = track.first_release_date.as_deref().and_then(release_year);
            for line in extract_quote_lines(&lyrics, QUOTES_PER_TRACK) {
                candidates.push(CandidateQuote {
                    text: line,
                    song: track.track_name.clone(),
                    album: track.album_name.clone().filter(|a| !a.is_empty()),
                    year,
                    source: QuoteSource::Musixmatch,
                });
            }
        }
        Ok(candidates)
    }
}
