use crate::auth::{OAuthClient, OAuthConfig, TokenStore};
use crate::config::AppConfig;
use crate::photos::PhotosClient;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub oauth: OAuthClient,
    pub photos: PhotosClient,
    pub token_store: TokenStore,
}

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let timeouts = &config.server.timeouts;
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect_timeout())
            .timeout(timeouts.api_timeout())
            .build()?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Build state around an existing HTTP client; both Google clients share it
    pub fn with_http_client(config: &AppConfig, http_client: reqwest::Client) -> Self {
        let token_store = TokenStore::new();

        let oauth = OAuthClient::new(
            OAuthConfig::from(&config.google),
            token_store.clone(),
            http_client.clone(),
        );

        let photos = PhotosClient::new(config.google.photos_api_url.clone(), oauth.clone(), http_client);

        Self {
            oauth,
            photos,
            token_store,
        }
    }
}
