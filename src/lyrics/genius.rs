//! Genius API client.
//!
//! The public API exposes song metadata but no lyrics, so each song found
//! becomes a short tribute line built from its title.

use super::{build_http_client, CandidateQuote, LyricsProvider, SONGS_PER_PROVIDER};
use crate::quote_store::QuoteSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_GENIUS_BASE_URL: &str = "https://api.genius.com";

const SEARCH_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct GeniusEnvelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: GeniusSong,
}

#[derive(Debug, Deserialize)]
struct SongResponse {
    song: GeniusSong,
}

#[derive(Debug, Deserialize)]
struct GeniusSong {
    id: u64,
    title: String,
    #[serde(default)]
    album: Option<GeniusAlbum>,
    #[serde(default)]
    release_date_components: Option<ReleaseDate>,
}

#[derive(Debug, Deserialize)]
struct GeniusAlbum {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseDate {
    year: Option<i32>,
}

pub struct GeniusProvider {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    artist: String,
}

impl GeniusProvider {
    pub fn new(
        base_url: &str,
        access_token: String,
        artist: String,
        timeout_sec: u64,
    ) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_sec)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            artist,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .context("Failed to connect to Genius")?;

        if !response.status().is_success() {
            anyhow::bail!("Genius request to {} failed with status {}", url, response.status());
        }

        let envelope: GeniusEnvelope<T> = response
            .json()
            .await
            .context("Failed to parse Genius response")?;
        Ok(envelope.response)
    }

    async fn search_songs(&self) -> Result<Vec<GeniusSong>> {
        let url = format!("{}/search", self.base_url);
        let response: SearchResponse = self
            .get(
                &url,
                &[
                    ("q", self.artist.clone()),
                    ("per_page", SEARCH_PAGE_SIZE.to_string()),
                ],
            )
            .await?;
        Ok(response.hits.into_iter().map(|hit| hit.result).collect())
    }

    async fn get_song(&self, id: u64) -> Result<GeniusSong> {
        let url = format!("{}/songs/{}", self.base_url, id);
        let response: SongResponse = self.get(&url, &[]).await?;
        Ok(response.song)
    }

    fn to_candidate(&self, song: GeniusSong) -> CandidateQuote {
        CandidateQuote {
            text: format!("\"{}\" - A masterpiece by {}", song.title, self.artist),
            song: song.title,
            album: song.album.map(|a| a.name),
            year: song.release_date_components.and_then(|d| d.year),
            source: QuoteSource::Genius,
        }
    }
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    fn name(&self) -> &'static str {
        "genius"
    }

    async fn fetch_candidates(&self) -> Result<Vec<CandidateQuote>> {
        let songs = self.search_songs().await?;
        debug!("Found {} songs on Genius", songs.len());

        let mut candidates = vec![];
        for hit in songs.into_iter().take(SONGS_PER_PROVIDER) {
            match self.get_song(hit.id).await {
                Ok(song) => candidates.push(self.to_candidate(song)),
                Err(err) => warn!("Could not get Genius song '{}': {:#}", hit.title, err),
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::spawn_stub_api;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer secret-token")
    }

    fn stub_router() -> Router {
        Router::new()
            .route(
                "/search",
                get(
                    |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                        if !authorized(&headers) {
                            return Err(StatusCode::UNAUTHORIZED);
                        }
                        assert_eq!(params.get("q").map(String::as_str), Some("Michael Jackson"));
                        assert_eq!(params.get("per_page").map(String::as_str), Some("10"));
                        let hits: Vec<Value> = (1..=7)
                            .map(|id| {
                                json!({"result": {"id": id, "title": format!("Song {}", id)}})
                            })
                            .collect();
                        Ok(Json(json!({"response": {"hits": hits}})))
                    },
                ),
            )
            .route(
                "/songs/{id}",
                get(|headers: HeaderMap, Path(id): Path<u64>| async move {
                    if !authorized(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    if id == 3 {
                        return Err(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    let album = if id == 1 {
                        json!({"name": "Thriller"})
                    } else {
                        Value::Null
                    };
                    Ok(Json(json!({"response": {"song": {
                        "id": id,
                        "title": format!("Song {}", id),
                        "album": album,
                        "release_date_components": {"year": 1982},
                    }}})))
                }),
            )
    }

    #[tokio::test]
    async fn builds_candidates_from_first_songs() {
        let base_url = spawn_stub_api(stub_router()).await;
        let provider = GeniusProvider::new(
            &format!("{}/", base_url),
            "secret-token".to_string(),
            "Michael Jackson".to_string(),
            5,
        )
        .unwrap();

        let candidates = provider.fetch_candidates().await.unwrap();

        // Song 3 fails and is skipped, songs 6 and 7 are beyond the lookup limit
        let songs: Vec<_> = candidates.iter().map(|c| c.song.as_str()).collect();
        assert_eq!(songs, vec!["Song 1", "Song 2", "Song 4", "Song 5"]);
        assert_eq!(
            candidates[0],
            CandidateQuote {
                text: "\"Song 1\" - A masterpiece by Michael Jackson".to_string(),
                song: "Song 1".to_string(),
                album: Some("Thriller".to_string()),
                year: Some(1982),
                source: QuoteSource::Genius,
            }
        );
        assert_eq!(candidates[1].album, None);
    }

    #[tokio::test]
    async fn rejected_token_is_an_error() {
        let base_url = spawn_stub_api(stub_router()).await;
        let provider = GeniusProvider::new(
            &base_url,
            "wrong-token".to_string(),
            "Michael Jackson".to_string(),
            5,
        )
        .unwrap();

        assert!(provider.fetch_candidates().await.is_err());
    }
}
