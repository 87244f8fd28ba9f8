use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use std::fmt::{self, Display};
use std::error::Error;

use crate::auth::AuthError;
use crate::photos::PhotosError;

/// Application error types, one per HTTP failure class
#[derive(Debug)]
pub enum AppError {
    MissingAuthorizationCode,
    NotAuthenticated,
    CredentialExpiredOrInvalid,
    RemoteCallFailure(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingAuthorizationCode => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated | AppError::CredentialExpiredOrInvalid => StatusCode::UNAUTHORIZED,
            AppError::RemoteCallFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingAuthorizationCode => write!(f, "Authorization code is required"),
            AppError::NotAuthenticated => {
                write!(f, "Not authenticated. Please authenticate first using /auth/google")
            }
            AppError::CredentialExpiredOrInvalid => {
                write!(f, "Token expired. Please re-authenticate using /auth/google")
            }
            AppError::RemoteCallFailure(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for AppError {}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotAuthenticated => AppError::NotAuthenticated,
            AuthError::CredentialRejected(_) => AppError::CredentialExpiredOrInvalid,
            other => AppError::RemoteCallFailure(other.to_string()),
        }
    }
}

impl From<PhotosError> for AppError {
    fn from(error: PhotosError) -> Self {
        match error {
            PhotosError::NotAuthenticated => AppError::NotAuthenticated,
            PhotosError::CredentialRejected(_) => AppError::CredentialExpiredOrInvalid,
            other => AppError::RemoteCallFailure(other.to_string()),
        }
    }
}
