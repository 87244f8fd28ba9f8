use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::photos::{PhotoRecord, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT};

use super::{AppError, AppState};

/// Capability listing
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Photo Magic Server - Google Photos API",
        "endpoints": {
            "/auth/google": "GET - Initiate Google OAuth",
            "/auth/google/callback": "GET - OAuth callback",
            "/auth/status": "GET - Check authentication status",
            "/photos": "GET - Get last 100 photos",
            "/photos/paginated": "GET - Get photos with pagination",
        }
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Get the Google consent URL
pub async fn auth_google(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let url = state.oauth.consent_url()?;
    Ok(Json(AuthUrlResponse { auth_url: url.to_string() }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub message: String,
    pub has_tokens: bool,
    /// Token expiration timestamp (ISO 8601)
    pub expires_at: String,
}

/// OAuth redirect target: exchange the code for a credential
pub async fn auth_google_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, AppError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingAuthorizationCode)?;

    let credential = state
        .oauth
        .exchange_code(&code)
        .await
        .map_err(|e| AppError::RemoteCallFailure(e.to_string()))?;

    Ok(Json(CallbackResponse {
        message: "Authentication successful!".to_string(),
        has_tokens: true,
        expires_at: credential.expires_at.to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub token_expiry: Option<String>,
    /// The access token is past its expiry; the next photo request refreshes it
    pub expired: bool,
}

pub async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthStatusResponse> {
    let credential = state.token_store.get();
    Json(AuthStatusResponse {
        authenticated: credential.is_some(),
        expired: credential.as_ref().is_some_and(|c| c.is_expired()),
        token_expiry: credential.map(|c| c.expires_at.to_rfc3339()),
    })
}

#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    pub count: usize,
    pub photos: Vec<PhotoRecord>,
}

/// Last 100 photos, newest first
pub async fn photos(State(state): State<Arc<AppState>>) -> Result<Json<PhotosResponse>, AppError> {
    if !state.token_store.is_authenticated() {
        return Err(AppError::NotAuthenticated);
    }

    let photos = state.photos.list_recent(DEFAULT_RECENT_LIMIT).await?;
    Ok(Json(PhotosResponse {
        count: photos.len(),
        photos,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    /// Kept as text so a malformed value falls back to the default instead of
    /// failing extraction
    pub page_size: Option<String>,
    pub page_token: Option<String>,
}

impl PaginationQuery {
    /// Requested page size. Non-numeric input means the default; negatives count as 0
    /// and are raised to 1 when the query is built.
    pub fn page_size(&self) -> u32 {
        self.page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|size| size.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPhotosResponse {
    pub count: usize,
    pub photos: Vec<PhotoRecord>,
    pub next_page_token: Option<String>,
    pub has_more: bool,
}

/// One page of photos
pub async fn photos_paginated(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginatedPhotosResponse>, AppError> {
    if !state.token_store.is_authenticated() {
        return Err(AppError::NotAuthenticated);
    }

    let page_token = query.page_token.as_deref().filter(|token| !token.is_empty());
    let page = state
        .photos
        .list_page(query.page_size(), page_token)
        .await?;

    Ok(Json(PaginatedPhotosResponse {
        count: page.photos.len(),
        has_more: page.has_more(),
        next_page_token: page.next_page_token,
        photos: page.photos,
    }))
}
