mod file_config;

pub use file_config::{FileConfig, ProvidersConfig};

use crate::lyrics::{DEFAULT_GENIUS_BASE_URL, DEFAULT_MUSIXMATCH_BASE_URL};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub artist: String,
    pub genius_access_token: Option<String>,
    pub musixmatch_api_key: Option<String>,
    pub provider_timeout_sec: u64,
    pub seed: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            artist: "Michael Jackson".to_string(),
            genius_access_token: None,
            musixmatch_api_key: None,
            provider_timeout_sec: 10,
            seed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` selects the in-memory store.
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub artist: String,
    pub seed: bool,
    pub providers: ProvidersSettings,
}

#[derive(Debug, Clone)]
pub struct ProvidersSettings {
    pub genius_access_token: Option<String>,
    pub genius_base_url: String,
    pub musixmatch_api_key: Option<String>,
    pub musixmatch_base_url: String,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone());
        if let Some(parent) = db_path.as_ref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let artist = file.artist.unwrap_or_else(|| cli.artist.clone());
        if artist.trim().is_empty() {
            bail!("Artist must not be empty");
        }

        let seed = file.seed.unwrap_or(cli.seed);

        let provider_urls = file.providers.unwrap_or_default();
        let timeout_sec = file
            .provider_timeout_sec
            .unwrap_or(cli.provider_timeout_sec);
        if timeout_sec == 0 {
            bail!("Provider timeout must be at least one second");
        }
        let providers = ProvidersSettings {
            genius_access_token: non_blank(
                file.genius_access_token
                    .or_else(|| cli.genius_access_token.clone()),
            ),
            genius_base_url: provider_urls
                .genius_base_url
                .unwrap_or_else(|| DEFAULT_GENIUS_BASE_URL.to_string()),
            musixmatch_api_key: non_blank(
                file.musixmatch_api_key
                    .or_else(|| cli.musixmatch_api_key.clone()),
            ),
            musixmatch_base_url: provider_urls
                .musixmatch_base_url
                .unwrap_or_else(|| DEFAULT_MUSIXMATCH_BASE_URL.to_string()),
            timeout_sec,
        };

        Ok(Self {
            db_path,
            port,
            bind_address,
            logging_level,
            frontend_dir_path,
            artist,
            seed,
            providers,
        })
    }
}

/// An empty credential, e.g. `GENIUS_ACCESS_TOKEN=`, counts as missing.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
