use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub bind_address: String,
    pub frontend_dir_path: Option<String>,
    /// Author of manually added quotes.
    pub artist: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
            frontend_dir_path: None,
            artist: "Michael Jackson".to_string(),
        }
    }
}
