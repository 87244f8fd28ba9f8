pub mod error;
pub mod oauth;
pub mod token_store;

pub use error::{AuthError, RemoteFailure};
pub use oauth::{OAuthClient, OAuthConfig};
pub use token_store::{Credential, TokenStore};
