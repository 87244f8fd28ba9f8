use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{AuthError, RemoteFailure};
use super::token_store::{Credential, TokenStore};
use crate::config::GoogleConfig;

/// OAuth provider configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl From<&GoogleConfig> for OAuthConfig {
    fn from(google: &GoogleConfig) -> Self {
        Self {
            client_id: google.client_id.clone(),
            client_secret: google.client_secret.clone(),
            auth_url: google.auth_url.clone(),
            token_url: google.token_url.clone(),
            redirect_uri: google.redirect_uri.clone(),
            scopes: google.scopes.clone(),
        }
    }
}

/// Google token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    fn into_credential(self, previous_refresh_token: Option<String>) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expires_at: Utc::now() + chrono::Duration::seconds(self.expires_in),
        }
    }
}

/// OAuth client for the Google authorization code flow.
///
/// Owns the exchange with Google's token endpoint and keeps the resulting
/// credential in the shared [`TokenStore`].
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    token_store: TokenStore,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Create a new OAuth client
    pub fn new(config: OAuthConfig, token_store: TokenStore, http_client: reqwest::Client) -> Self {
        Self {
            config,
            token_store,
            http_client,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Build the Google consent URL.
    ///
    /// Always asks for offline access and forces the consent screen so that
    /// Google issues a refresh token on every sign-in.
    pub fn consent_url(&self) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::ConfigError(format!("invalid auth_url '{}': {}", self.config.auth_url, e)))?;

        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("prompt", "consent")
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri);

        Ok(url)
    }

    /// Exchange authorization code for tokens and make them the active credential
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, AuthError> {
        #[derive(Serialize)]
        struct TokenRequest<'a> {
            code: &'a str,
            client_id: &'a str,
            client_secret: &'a str,
            redirect_uri: &'a str,
            grant_type: &'a str,
        }

        let request = TokenRequest {
            code,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            redirect_uri: &self.config.redirect_uri,
            grant_type: "authorization_code",
        };

        let token_response = self
            .request_token(&request)
            .await
            .map_err(|failure| AuthError::ExchangeError(failure.message))?;

        let credential = token_response.into_credential(None);
        self.set_active_credential(credential.clone());

        tracing::info!(
            "🔑 Signed in, access token valid until {} (refresh token: {})",
            credential.expires_at.to_rfc3339(),
            credential.refresh_token.is_some()
        );

        Ok(credential)
    }

    /// Replace the active credential without validating it
    pub fn set_active_credential(&self, credential: Credential) {
        self.token_store.set(credential);
    }

    /// Refresh the active credential using its refresh token
    pub async fn refresh(&self) -> Result<Credential, AuthError> {
        let existing = self.token_store.get().ok_or(AuthError::NotAuthenticated)?;
        let refresh_token = existing.refresh_token.clone().ok_or_else(|| {
            AuthError::RefreshError("credential has no refresh token".to_string())
        })?;

        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh_token: &'a str,
            client_id: &'a str,
            client_secret: &'a str,
            grant_type: &'a str,
        }

        let request = RefreshRequest {
            refresh_token: &refresh_token,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            grant_type: "refresh_token",
        };

        let token_response = self.request_token(&request).await.map_err(|failure| {
            if failure.credential_rejected {
                AuthError::CredentialRejected(failure.message)
            } else {
                AuthError::RefreshError(failure.message)
            }
        })?;

        let credential = token_response.into_credential(Some(refresh_token));
        self.set_active_credential(credential.clone());

        tracing::info!("✅ Access token refreshed, valid until {}", credential.expires_at.to_rfc3339());

        Ok(credential)
    }

    /// Get a usable access token (refreshing if needed)
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let credential = self.token_store.get().ok_or(AuthError::NotAuthenticated)?;

        if credential.needs_refresh() && credential.refresh_token.is_some() {
            tracing::info!("🔄 Access token expires at {}, refreshing...", credential.expires_at.to_rfc3339());
            let refreshed = self.refresh().await?;
            Ok(refreshed.access_token)
        } else {
            Ok(credential.access_token)
        }
    }

    /// POST a form to the token endpoint once
    async fn request_token<T: Serialize + ?Sized>(&self, form: &T) -> Result<TokenResponse, RemoteFailure> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| RemoteFailure {
                message: e.to_string(),
                credential_rejected: false,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let failure = RemoteFailure::classify(status, &body);
            tracing::warn!("Token endpoint returned {}: {}", status, failure.message);
            return Err(failure);
        }

        response.json().await.map_err(|e| RemoteFailure {
            message: format!("Failed to parse token response: {}", e),
            credential_rejected: false,
        })
    }
}
