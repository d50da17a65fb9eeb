use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyric_quotes_server::config::{AppConfig, CliConfig, FileConfig};
use lyric_quotes_server::lyrics::{
    default_tags, GeniusProvider, LyricsProvider, MusixmatchProvider, QuoteFetcher,
};
use lyric_quotes_server::quote_store::{InMemoryQuoteStore, QuoteStore, SqliteQuoteStore};
use lyric_quotes_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite quotes database file. Without it, quotes are kept
    /// in memory and start from the built-in fallback set.
    #[clap(long, env = "QUOTES_DB_PATH", value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Artist whose quotes are fetched and credited.
    #[clap(long, default_value = "Michael Jackson")]
    pub artist: String,

    /// Genius API access token. The Genius provider is disabled without it.
    #[clap(long, env = "GENIUS_ACCESS_TOKEN", hide_env_values = true)]
    pub genius_access_token: Option<String>,

    /// Musixmatch API key. The Musixmatch provider is disabled without it.
    #[clap(long, env = "MUSIXMATCH_API_KEY", hide_env_values = true)]
    pub musixmatch_api_key: Option<String>,

    /// Timeout in seconds for lyrics provider requests.
    #[clap(long, default_value_t = 10)]
    pub provider_timeout_sec: u64,

    /// Fill an empty store before serving.
    #[clap(long)]
    pub seed: bool,

    /// Path to a TOML config file. Values in it override the CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            port: self.port,
            bind_address: self.bind_address.clone(),
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            artist: self.artist.clone(),
            genius_access_token: self.genius_access_token.clone(),
            musixmatch_api_key: self.musixmatch_api_key.clone(),
            provider_timeout_sec: self.provider_timeout_sec,
            seed: self.seed,
        }
    }
}

fn make_providers(config: &AppConfig) -> Result<Vec<Arc<dyn LyricsProvider>>> {
    let settings = &config.providers;
    let mut providers: Vec<Arc<dyn LyricsProvider>> = vec![];

    match &settings.genius_access_token {
        Some(token) => providers.push(Arc::new(GeniusProvider::new(
            &settings.genius_base_url,
            token.clone(),
            config.artist.clone(),
            settings.timeout_sec,
        )?)),
        None => warn!("Genius access token not configured, Genius provider disabled"),
    }

    match &settings.musixmatch_api_key {
        Some(key) => providers.push(Arc::new(MusixmatchProvider::new(
            &settings.musixmatch_base_url,
            key.clone(),
            config.artist.clone(),
            settings.timeout_sec,
        )?)),
        None => warn!("Musixmatch API key not configured, Musixmatch provider disabled"),
    }

    Ok(providers)
}

fn make_store(config: &AppConfig) -> Result<Arc<dyn QuoteStore>> {
    match &config.db_path {
        Some(db_path) => {
            info!("Opening SQLite quotes database at {:?}...", db_path);
            Ok(Arc::new(SqliteQuoteStore::new(db_path)?))
        }
        None => {
            info!("No database configured, serving the fallback quotes from memory");
            Ok(Arc::new(InMemoryQuoteStore::with_fallback(
                &config.artist,
                &default_tags(&config.artist),
            )))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let quote_store = make_store(&config)?;
    let providers = make_providers(&config)?;
    let quote_fetcher = Arc::new(QuoteFetcher::new(
        providers,
        quote_store.clone(),
        &config.artist,
    ));

    if config.seed {
        info!("Seeding quote store...");
        let added = quote_fetcher.seed_if_empty().await?;
        info!("Seeding added {} quotes", added);
    }

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        bind_address: config.bind_address.clone(),
        frontend_dir_path: config.frontend_dir_path.clone(),
        artist: config.artist.clone(),
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(server_config, quote_store, quote_fetcher).await
}
