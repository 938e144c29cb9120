use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 3040)
    pub port: u16,
    /// Site root directory (default: .)
    pub site_root: PathBuf,
    /// Site config file (default: <site_root>/folio.toml)
    pub site_config: Option<PathBuf>,
    /// CORS allowed origins (comma-separated)
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT")
            .unwrap_or_else(|| "3040".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let site_root = PathBuf::from(var("FOLIO_ROOT").unwrap_or_else(|| ".".to_string()));
        if site_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptySiteRoot);
        }
        let site_config = var("FOLIO_CONFIG")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            host,
            port,
            site_root,
            site_config,
            cors_origins,
        })
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    EmptySiteRoot,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "Invalid PORT environment variable"),
            ConfigError::EmptySiteRoot => write!(f, "FOLIO_ROOT must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
