//! Test fixtures: quote databases and a stub of the lyrics provider APIs.

use super::constants::*;
use anyhow::Result;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use lyric_quotes_server::lyrics::default_tags;
use lyric_quotes_server::quote_store::{fallback_quotes, QuoteStore, SqliteQuoteStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Creates an empty SQLite quotes database in a temporary directory.
pub fn create_empty_sqlite_store() -> Result<(TempDir, SqliteQuoteStore)> {
    let temp_dir = TempDir::new()?;
    let store = SqliteQuoteStore::new(temp_dir.path().join("quotes.db"))?;
    Ok((temp_dir, store))
}

/// Creates a SQLite quotes database holding the fallback set.
pub fn create_fallback_sqlite_store() -> Result<(TempDir, SqliteQuoteStore)> {
    let (temp_dir, store) = create_empty_sqlite_store()?;
    for quote in fallback_quotes(TEST_ARTIST, &default_tags(TEST_ARTIST)) {
        store.insert_quote(quote)?;
    }
    Ok((temp_dir, store))
}

fn genius_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", STUB_GENIUS_TOKEN))
}

fn musixmatch_status(code: u16) -> Value {
    json!({"message": {"header": {"status_code": code}, "body": []}})
}

fn stub_provider_router() -> Router {
    let genius = Router::new()
        .route(
            "/search",
            get(|headers: HeaderMap| async move {
                if !genius_authorized(&headers) {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                let hits: Vec<Value> = STUB_GENIUS_SONGS
                    .iter()
                    .enumerate()
                    .map(|(i, title)| json!({"result": {"id": i, "title": title}}))
                    .collect();
                Ok(Json(json!({"response": {"hits": hits}})))
            }),
        )
        .route(
            "/songs/{id}",
            get(|headers: HeaderMap, Path(id): Path<usize>| async move {
                if !genius_authorized(&headers) {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                let title = STUB_GENIUS_SONGS.get(id).ok_or(StatusCode::NOT_FOUND)?;
                Ok(Json(json!({"response": {"song": {
                    "id": id,
                    "title": title,
                    "album": {"name": *title},
                    "release_date_components": {"year": 1987}
                }}})))
            }),
        );

    let musixmatch = Router::new()
        .route(
            "/track.search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("apikey").map(String::as_str) != Some(STUB_MUSIXMATCH_KEY) {
                    return Json(musixmatch_status(401));
                }
                Json(json!({"message": {
                    "header": {"status_code": 200},
                    "body": {"track_list": [{"track": {
                        "track_id": 42,
                        "track_name": STUB_MUSIXMATCH_TRACK,
                        "album_name": "Thriller",
                        "first_release_date": "1983-07-04T00:00:00Z"
                    }}]}
                }}))
            }),
        )
        .route(
            "/track.lyrics.get",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("track_id").map(String::as_str) != Some("42") {
                    return Json(musixmatch_status(404));
                }
                let mut lyrics = vec!["[Verse 1]".to_string()];
                lyrics.extend(STUB_MUSIXMATCH_LINES.iter().map(|l| l.to_string()));
                lyrics.push("...".to_string());
                lyrics.push("******* This Lyrics is NOT for Commercial use *******".to_string());
                Json(json!({"message": {
                    "header": {"status_code": 200},
                    "body": {"lyrics": {"lyrics_body": lyrics.join("\n")}}
                }}))
            }),
        );

    Router::new()
        .nest("/genius", genius)
        .nest("/musixmatch", musixmatch)
}

/// Serves the stub provider APIs on a random port and returns their base URL.
/// Genius lives under `/genius` and Musixmatch under `/musixmatch`.
pub async fn spawn_stub_provider_api() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, stub_provider_router())
            .await
            .expect("Stub provider API failed");
    });
    Ok(format!("http://{}", addr))
}
