use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use tower_http::services::{ServeDir, ServeFile};

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::api::{ApiResponse, ApiResult};
use super::quotes_routes::make_quotes_routes;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerStatus {
    pub uptime: String,
    pub store_kind: &'static str,
    pub providers: Vec<&'static str>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn get_status(
    State(state): State<ServerState>,
) -> ApiResult<Json<ApiResponse<ServerStatus>>> {
    let status = ServerStatus {
        uptime: format_uptime(state.start_time.elapsed()),
        store_kind: state.quote_store.kind(),
        providers: state.quote_fetcher.provider_names(),
    };
    Ok(Json(ApiResponse::ok(status)))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure("Not found")),
    )
}

pub fn make_app(
    config: ServerConfig,
    quote_store: GuardedQuoteStore,
    quote_fetcher: GuardedQuoteFetcher,
) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        quote_store,
        quote_fetcher,
    };

    let api_routes: Router = Router::new()
        .route("/status", get(get_status))
        .with_state(state.clone())
        .nest("/quotes", make_quotes_routes(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            // Unknown paths get index.html so client-side routing works
            let index = Path::new(&frontend_path).join("index.html");
            let static_files_service = ServeDir::new(&frontend_path)
                .append_index_html_on_directories(true)
                .fallback(ServeFile::new(index));
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().fallback(not_found),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_server(
    config: ServerConfig,
    quote_store: GuardedQuoteStore,
    quote_fetcher: GuardedQuoteFetcher,
) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, quote_store, quote_fetcher);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
