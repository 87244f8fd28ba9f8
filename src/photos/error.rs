use thiserror::Error;

/// Photo listing errors
#[derive(Error, Debug)]
pub enum PhotosError {
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Google refused the credential; it has already been cleared
    #[error("Credential expired or invalid: {0}")]
    CredentialRejected(String),

    #[error("Failed to fetch photos: {0}")]
    RemoteError(String),
}
