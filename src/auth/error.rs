use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// OAuth-specific errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid OAuth configuration: {0}")]
    ConfigError(String),

    #[error("Failed to get tokens: {0}")]
    ExchangeError(String),

    #[error("Failed to refresh token: {0}")]
    RefreshError(String),

    /// Google no longer accepts the credential (expired, revoked, invalid_grant)
    #[error("Credential rejected: {0}")]
    CredentialRejected(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Error body shapes returned by Google endpoints
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GoogleErrorBody {
    /// OAuth endpoints: `{"error": "invalid_grant", "error_description": "..."}`
    OAuth {
        error: String,
        error_description: Option<String>,
    },
    /// REST APIs: `{"error": {"code": 401, "message": "...", "status": "UNAUTHENTICATED"}}`
    Api { error: ApiErrorDetail },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

const REJECTED_OAUTH_ERRORS: &[&str] = &["invalid_grant", "invalid_token", "unauthorized_client"];

/// A non-success response from Google, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub message: String,
    /// The credential itself was refused; it must be dropped
    pub credential_rejected: bool,
}

impl RemoteFailure {
    /// Classify a failed response from its status and raw body
    pub fn classify(status: StatusCode, body: &str) -> Self {
        let unauthorized = status == StatusCode::UNAUTHORIZED;

        let (typed_rejection, message) = match serde_json::from_str::<GoogleErrorBody>(body) {
            Ok(GoogleErrorBody::OAuth { error, error_description }) => (
                REJECTED_OAUTH_ERRORS.contains(&error.as_str()),
                match error_description {
                    Some(description) => format!("{}: {}", error, description),
                    None => error,
                },
            ),
            Ok(GoogleErrorBody::Api { error }) => (
                error.code == Some(401) || error.status.as_deref() == Some("UNAUTHENTICATED"),
                error
                    .message
                    .or(error.status)
                    .unwrap_or_else(|| status.to_string()),
            ),
            Err(_) if body.trim().is_empty() => (false, status.to_string()),
            Err(_) => (false, format!("{} - {}", status, body.trim())),
        };

        Self {
            credential_rejected: unauthorized || typed_rejection || mentions_rejection(&message),
            message,
        }
    }
}

/// Google sometimes reports a dead grant only in free text
fn mentions_rejection(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("invalid_grant") || lowered.contains("unauthorized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_invalid_grant_is_rejection() {
        let failure = RemoteFailure::classify(
            StatusCode::BAD_REQUEST,
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        );

        assert!(failure.credential_rejected);
        assert_eq!(failure.message, "invalid_grant: Token has been expired or revoked.");
    }

    #[test]
    fn test_oauth_error_rejection_depends_on_code_and_status() {
        let failure = RemoteFailure::classify(
            StatusCode::UNAUTHORIZED,
            r#"{"error": "invalid_client"}"#,
        );
        // 401 from the token endpoint still means the credential cannot be used
        assert!(failure.credential_rejected);

        let failure = RemoteFailure::classify(
            StatusCode::BAD_REQUEST,
            r#"{"error": "invalid_request", "error_description": "Missing code"}"#,
        );
        assert!(!failure.credential_rejected);
        assert_eq!(failure.message, "invalid_request: Missing code");
    }

    #[test]
    fn test_api_unauthenticated_is_rejection() {
        let failure = RemoteFailure::classify(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}}"#,
        );

        assert!(failure.credential_rejected);
        assert_eq!(failure.message, "Request had invalid authentication credentials.");
    }

    #[test]
    fn test_api_permission_denied_is_remote_failure() {
        let failure = RemoteFailure::classify(
            StatusCode::FORBIDDEN,
            r#"{"error": {"code": 403, "message": "Request had insufficient authentication scopes.", "status": "PERMISSION_DENIED"}}"#,
        );

        assert!(!failure.credential_rejected);
        assert_eq!(failure.message, "Request had insufficient authentication scopes.");
    }

    #[test]
    fn test_structured_message_mentioning_invalid_grant_is_rejection() {
        let failure = RemoteFailure::classify(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 400, "message": "invalid_grant: Token has been expired or revoked.", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert!(failure.credential_rejected);
        assert_eq!(failure.message, "invalid_grant: Token has been expired or revoked.");

        let failure = RemoteFailure::classify(
            StatusCode::BAD_REQUEST,
            r#"{"error": "access_denied", "error_description": "Client is Unauthorized for this grant"}"#,
        );
        assert!(failure.credential_rejected);
    }

    #[test]
    fn test_unstructured_body_falls_back_to_text() {
        let failure = RemoteFailure::classify(StatusCode::BAD_GATEWAY, "upstream said invalid_grant");
        assert!(failure.credential_rejected);

        let failure = RemoteFailure::classify(StatusCode::BAD_GATEWAY, "Unauthorized");
        assert!(failure.credential_rejected);

        let failure = RemoteFailure::classify(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(!failure.credential_rejected);
        assert_eq!(failure.message, "503 Service Unavailable");
    }
}
