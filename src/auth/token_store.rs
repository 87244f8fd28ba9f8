use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use chrono::{DateTime, Utc};

/// OAuth credential issued by Google
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// OAuth access token
    pub access_token: String,
    /// OAuth refresh token (only issued for offline access)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token expiration time (UTC)
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if token will expire soon (within 5 minutes)
    pub fn needs_refresh(&self) -> bool {
        let now = Utc::now();
        let buffer = chrono::Duration::minutes(5);
        now + buffer >= self.expires_at
    }
}

/// Holds the single active credential for the process.
///
/// Kept in memory only; a restart requires signing in again. Clones share the
/// same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    active: Arc<RwLock<Option<Credential>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the active credential
    pub fn get(&self) -> Option<Credential> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active credential
    pub fn set(&self, credential: Credential) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    /// Drop the active credential, returning it if there was one
    pub fn clear(&self) -> Option<Credential> {
        self.active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_authenticated(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
