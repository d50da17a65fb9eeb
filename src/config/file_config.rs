use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub artist: Option<String>,
    pub seed: Option<bool>,

    // Lyrics providers
    pub genius_access_token: Option<String>,
    pub musixmatch_api_key: Option<String>,
    pub provider_timeout_sec: Option<u64>,
    pub providers: Option<ProvidersConfig>,
}

/// `[providers]` section, mostly useful to point the clients at a stub API.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub genius_base_url: Option<String>,
    pub musixmatch_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 8080
artist = "The Jackson 5"

[providers]
genius_base_url = "http://localhost:9000"
"#
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.artist.as_deref(), Some("The Jackson 5"));
        assert!(config.db_path.is_none());
        let providers = config.providers.unwrap();
        assert_eq!(
            providers.genius_base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(providers.musixmatch_base_url.is_none());
    }

    #[test]
    fn rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
