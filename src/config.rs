use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub google: GoogleConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            log_level: default_log_level(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Timeout configuration for outbound calls to Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            api_timeout_ms: default_api_timeout(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_api_timeout() -> u64 {
    600_000 // 10 minutes
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

/// Google OAuth client and API endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Base URL of the Photos Library API, without trailing slash
    #[serde(default = "default_photos_api_url")]
    pub photos_api_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    /// Configuration for the given OAuth client, using Google's public endpoints
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            photos_api_url: default_photos_api_url(),
            scopes: default_scopes(),
        }
    }
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_photos_api_url() -> String {
    "https://photoslibrary.googleapis.com/v1".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["https://www.googleapis.com/auth/photoslibrary.readonly".to_string()]
}

impl AppConfig {
    /// Get default config file path
    /// Returns ~/.photo-magic/config.toml (cross-platform)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Failed to get home directory")?;
        Ok(home.join(".photo-magic").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        // Check if file exists, if not create a default one
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse configuration from TOML text and resolve `$VAR` references
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)
            .context("Failed to parse config")?;

        config.resolve_env_vars()?;

        Ok(config)
    }

    /// Address the server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

        eprintln!("Created default config file at: {}", path.display());
        eprintln!("Set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI (or a .env file) before starting.");

        Ok(())
    }

    /// Generate default configuration content as TOML string
    fn default_config_content() -> String {
        r#"# Photo Magic Configuration
#
# Values starting with '$' are read from the environment (a .env file in the
# working directory is loaded first).

[server]
host = "127.0.0.1"
port = 3000
log_level = "info"

[server.timeouts]
api_timeout_ms = 600000      # 10 minutes
connect_timeout_ms = 10000   # 10 seconds

[google]
client_id = "$GOOGLE_CLIENT_ID"
client_secret = "$GOOGLE_CLIENT_SECRET"
redirect_uri = "$GOOGLE_REDIRECT_URI"

# Optional endpoint overrides
# auth_url = "https://accounts.google.com/o/oauth2/v2/auth"
# token_url = "https://oauth2.googleapis.com/token"
# photos_api_url = "https://photoslibrary.googleapis.com/v1"
# scopes = ["https://www.googleapis.com/auth/photoslibrary.readonly"]
"#.to_string()
    }

    /// Resolve environment variables in configuration
    fn resolve_env_vars(&mut self) -> Result<()> {
        let google = &mut self.google;
        for (field, value) in [
            ("google.client_id", &mut google.client_id),
            ("google.client_secret", &mut google.client_secret),
            ("google.redirect_uri", &mut google.redirect_uri),
            ("google.auth_url", &mut google.auth_url),
            ("google.token_url", &mut google.token_url),
            ("google.photos_api_url", &mut google.photos_api_url),
        ] {
            if let Some(env_var) = value.strip_prefix('$') {
                match std::env::var(env_var) {
                    Ok(resolved) => *value = resolved,
                    Err(_) => anyhow::bail!("Environment variable {} not found for {}", env_var, field),
                }
            }
        }

        Ok(())
    }
}
