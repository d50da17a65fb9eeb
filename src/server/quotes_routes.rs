//! `/api/quotes` routes.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::api::{ApiError, ApiResponse, ApiResult, Pagination};
use super::state::*;
use super::ServerConfig;
use crate::lyrics::default_tags;
use crate::quote_store::{NewQuote, Quote, QuoteSource, QuoteStats};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Raw query values, so that garbage falls back to defaults instead of a 400.
#[derive(Deserialize, Debug, Default)]
pub struct ListQuotesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuotesQuery {
    /// Returns `(page, limit)`, both at least one.
    fn resolve(&self) -> (usize, usize) {
        let page = parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        (page, limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

#[derive(Deserialize, Debug)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AddQuoteBody {
    pub text: Option<String>,
    pub song: Option<String>,
    pub album: Option<String>,
    pub year: Option<YearValue>,
    pub tags: Option<Vec<String>>,
}

/// Form-driven clients send the year as a string.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum YearValue {
    Number(i32),
    Text(String),
}

impl YearValue {
    fn resolve(self) -> Result<Option<i32>, ApiError> {
        match self {
            YearValue::Number(year) => Ok(Some(year)),
            YearValue::Text(raw) if raw.trim().is_empty() => Ok(None),
            YearValue::Text(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ApiError::Validation(YEAR_NOT_A_NUMBER.to_string())),
        }
    }
}

const TEXT_AND_SONG_REQUIRED: &str = "Text and song are required";
const QUOTE_NOT_FOUND: &str = "Quote not found";
const YEAR_NOT_A_NUMBER: &str = "Year must be a number";
const INVALID_QUOTE_BODY: &str = "Invalid quote body";

async fn get_random_quote(
    State(store): State<GuardedQuoteStore>,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    match store.random_quote()? {
        Some(quote) => Ok(Json(ApiResponse::ok(quote))),
        None => Err(ApiError::NotFound("No quotes found".to_string())),
    }
}

async fn list_quotes(
    State(store): State<GuardedQuoteStore>,
    Query(query): Query<ListQuotesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let (page, limit) = query.resolve();
    let result = store.list_quotes(page, limit)?;
    Ok(Json(
        ApiResponse::ok(result.quotes).with_pagination(Pagination::new(page, limit, result.total)),
    ))
}

async fn get_quotes_by_song(
    State(store): State<GuardedQuoteStore>,
    Path(song_name): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let quotes = store.quotes_by_song(&song_name)?;
    Ok(Json(ApiResponse::ok(quotes)))
}

async fn search_quotes(
    State(store): State<GuardedQuoteStore>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Search query is required".to_string()))?;
    debug!("Searching quotes for '{}'", q);
    let quotes = store.search_quotes(&q)?;
    Ok(Json(ApiResponse::ok(quotes)))
}

async fn get_stats(
    State(store): State<GuardedQuoteStore>,
) -> ApiResult<Json<ApiResponse<QuoteStats>>> {
    Ok(Json(ApiResponse::ok(store.stats()?)))
}

async fn add_quote(
    State(store): State<GuardedQuoteStore>,
    State(config): State<ServerConfig>,
    body: Result<Json<AddQuoteBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Quote>>)> {
    let Json(body) = body.map_err(|rejection| {
        debug!("Rejected quote body: {}", rejection);
        match rejection {
            // Well-formed JSON with a field of the wrong type.
            JsonRejection::JsonDataError(_) => ApiError::Validation(INVALID_QUOTE_BODY.to_string()),
            _ => ApiError::Validation(TEXT_AND_SONG_REQUIRED.to_string()),
        }
    })?;

    let text = body.text.unwrap_or_default();
    let song = body.song.unwrap_or_default();
    if text.trim().is_empty() || song.trim().is_empty() {
        return Err(ApiError::Validation(TEXT_AND_SONG_REQUIRED.to_string()));
    }

    let year = body.year.map(YearValue::resolve).transpose()?.flatten();

    let new_quote = NewQuote::new(text, song, config.artist.as_str(), QuoteSource::Manual)
        .with_album(body.album)
        .with_year(year)
        .with_tags(body.tags.unwrap_or_else(|| default_tags(&config.artist)));
    let quote = store.insert_quote(new_quote)?;
    info!("Added quote {} from {}", quote.id, quote.song);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(quote))))
}

async fn increment_popularity(
    State(store): State<GuardedQuoteStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    store
        .increment_popularity(&id)?
        .map(|quote| Json(ApiResponse::ok(quote)))
        .ok_or_else(|| ApiError::NotFound(QUOTE_NOT_FOUND.to_string()))
}

async fn deactivate_quote(
    State(store): State<GuardedQuoteStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    let quote = store
        .deactivate_quote(&id)?
        .ok_or_else(|| ApiError::NotFound(QUOTE_NOT_FOUND.to_string()))?;
    info!("Deactivated quote {}", quote.id);
    Ok(Json(ApiResponse::ok(quote)))
}

async fn fetch_quotes(
    State(fetcher): State<GuardedQuoteFetcher>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let quotes = fetcher.fetch_and_store().await.map_err(ApiError::Fetch)?;
    let count = quotes.len();
    Ok(Json(
        ApiResponse::ok(quotes)
            .with_message(format!("Successfully fetched {} new quotes", count))
            .with_count(count),
    ))
}

pub fn make_quotes_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_quotes).post(add_quote))
        .route("/random", get(get_random_quote))
        .route("/stats", get(get_stats))
        .route("/search", get(search_quotes))
        .route("/fetch", post(fetch_quotes))
        .route("/song/{song_name}", get(get_quotes_by_song))
        .route("/{id}", delete(deactivate_quote))
        .route("/{id}/popularity", patch(increment_popularity))
        .with_state(state)
}
