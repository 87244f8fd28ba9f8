pub mod error;
pub mod models;

use crate::auth::{AuthError, OAuthClient, RemoteFailure};
pub use error::PhotosError;
pub use models::{MediaItemsResponse, PagedPhotoResult, PhotoRecord};

/// Hard ceiling Google puts on `pageSize`
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_RECENT_LIMIT: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Clamp a requested page size into the range Google accepts
pub fn clamp_page_size(requested: u32) -> u32 {
    requested.clamp(1, MAX_PAGE_SIZE)
}

/// Query parameters for `mediaItems.list`.
///
/// `pageToken` is only present when continuing from a cursor.
pub fn media_items_query(page_size: u32, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("pageSize", clamp_page_size(page_size).to_string())];
    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }
    query
}

/// Lists media items from the Photos Library API on behalf of the active credential
#[derive(Debug, Clone)]
pub struct PhotosClient {
    api_url: String,
    http_client: reqwest::Client,
    oauth: OAuthClient,
}

impl PhotosClient {
    pub fn new(api_url: impl Into<String>, oauth: OAuthClient, http_client: reqwest::Client) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http_client,
            oauth,
        }
    }

    /// Most recent photos, newest first, at most [`MAX_PAGE_SIZE`]
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<PhotoRecord>, PhotosError> {
        let response = self.fetch_media_items(limit, None).await?;
        Ok(models::to_photo_records(response.media_items))
    }

    /// One page of photos. Pass the previous `next_page_token` to continue.
    ///
    /// Newest-first ordering holds within the returned page only, not across pages.
    pub async fn list_page(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PagedPhotoResult, PhotosError> {
        let response = self.fetch_media_items(page_size, page_token).await?;
        Ok(PagedPhotoResult {
            photos: models::to_photo_records(response.media_items),
            next_page_token: response.next_page_token,
        })
    }

    async fn fetch_media_items(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemsResponse, PhotosError> {
        let access_token = self.oauth.access_token().await.map_err(|e| self.auth_failure(e))?;

        let query = media_items_query(page_size, page_token);
        tracing::debug!("Listing media items: {:?}", query);

        let response = self
            .http_client
            .get(format!("{}/mediaItems", self.api_url))
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| PhotosError::RemoteError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let failure = RemoteFailure::classify(status, &body);
            tracing::warn!("Photos API returned {}: {}", status, failure.message);

            return Err(if failure.credential_rejected {
                self.reject_credential(failure.message)
            } else {
                PhotosError::RemoteError(failure.message)
            });
        }

        response
            .json::<MediaItemsResponse>()
            .await
            .map_err(|e| PhotosError::RemoteError(format!("Failed to parse media items: {}", e)))
    }

    fn auth_failure(&self, error: AuthError) -> PhotosError {
        match error {
            AuthError::NotAuthenticated => PhotosError::NotAuthenticated,
            AuthError::CredentialRejected(message) => self.reject_credential(message),
            other => PhotosError::RemoteError(other.to_string()),
        }
    }

    /// Drop the active credential so the next request asks for a new sign-in
    fn reject_credential(&self, message: String) -> PhotosError {
        if self.oauth.token_store().clear().is_some() {
            tracing::warn!("🔒 Google rejected the active credential, cleared it: {}", message);
        }
        PhotosError::CredentialRejected(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, OAuthConfig, TokenStore};
    use crate::config::GoogleConfig;
    use chrono::Utc;
    use mockito::{Matcher, Server};
    use proptest::prelude::*;

    fn photos_client(server: &Server) -> PhotosClient {
        let mut google = GoogleConfig::new("client", "secret", "http://localhost:3000/auth/google/callback");
        google.token_url = format!("{}/token", server.url());

        let http_client = reqwest::Client::new();
        let oauth = OAuthClient::new(OAuthConfig::from(&google), TokenStore::new(), http_client.clone());
        oauth.set_active_credential(Credential {
            access_token: "ya29.valid".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        });

        PhotosClient::new(format!("{}/v1/", server.url()), oauth, http_client)
    }

    const TWO_ITEMS: &str = r#"{
        "mediaItems": [
            {"id": "a", "baseUrl": "https://lh3/a", "mimeType": "image/jpeg",
             "mediaMetadata": {"creationTime": "2023-01-01T00:00:00Z", "width": "10", "height": "20"}},
            {"id": "b", "baseUrl": "https://lh3/b", "mimeType": "image/png",
             "mediaMetadata": {"creationTime": "2024-01-01T00:00:00Z"}}
        ],
        "nextPageToken": "CURSOR-2"
    }"#;

    #[test]
    fn test_query_without_cursor_has_no_page_token() {
        let query = media_items_query(50, None);
        assert_eq!(query, vec![("pageSize", "50".to_string())]);
        assert!(query.iter().all(|(key, _)| *key != "pageToken"));
    }

    #[test]
    fn test_query_with_cursor_is_verbatim() {
        let query = media_items_query(50, Some("CAIS+/=abc"));
        assert!(query.contains(&("pageToken", "CAIS+/=abc".to_string())));
    }

    #[test]
    fn test_zero_page_size_is_raised_to_one() {
        assert_eq!(clamp_page_size(0), 1);
    }

    proptest! {
        #[test]
        fn page_size_never_exceeds_ceiling(requested in any::<u32>()) {
            let effective = clamp_page_size(requested);
            prop_assert!(effective >= 1 && effective <= MAX_PAGE_SIZE);
            if requested > MAX_PAGE_SIZE {
                prop_assert_eq!(effective, MAX_PAGE_SIZE);
            }
        }
    }

    #[tokio::test]
    async fn test_list_recent_clamps_limit_and_sends_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "100".into()))
            .match_header("authorization", "Bearer ya29.valid")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TWO_ITEMS)
            .expect(1)
            .create_async()
            .await;

        let photos = photos_client(&server).list_recent(500).await.unwrap();

        mock.assert_async().await;
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(photos[1].width, Some(10));
        assert_eq!(photos[0].thumbnail_url, "https://lh3/b=w400-h400");
    }

    #[tokio::test]
    async fn test_list_recent_with_no_items_is_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let photos = photos_client(&server).list_recent(DEFAULT_RECENT_LIMIT).await.unwrap();
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_list_page_forwards_cursor() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageSize".into(), "25".into()),
                Matcher::UrlEncoded("pageToken".into(), "CURSOR-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TWO_ITEMS)
            .expect(1)
            .create_async()
            .await;

        let page = photos_client(&server).list_page(25, Some("CURSOR-1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.photos.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("CURSOR-2"));
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn test_last_page_has_no_cursor() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"mediaItems": [{"id": "z", "baseUrl": "https://lh3/z"}]}"#)
            .create_async()
            .await;

        let page = photos_client(&server).list_page(DEFAULT_PAGE_SIZE, None).await.unwrap();
        assert_eq!(page.photos.len(), 1);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_unauthenticated_response_clears_credential() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let client = photos_client(&server);
        let err = client.list_recent(10).await.unwrap_err();

        assert!(matches!(err, PhotosError::CredentialRejected(_)));
        assert!(client.oauth.token_store().get().is_none());

        let err = client.list_recent(10).await.unwrap_err();
        assert!(matches!(err, PhotosError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_server_error_keeps_credential() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error": {"code": 500, "message": "Internal error encountered.", "status": "INTERNAL"}}"#)
            .create_async()
            .await;

        let client = photos_client(&server);
        let err = client.list_page(10, None).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch photos: Internal error encountered.");
        assert!(client.oauth.token_store().is_authenticated());
    }

    #[tokio::test]
    async fn test_list_without_credential() {
        let server = Server::new_async().await;
        let client = photos_client(&server);
        client.oauth.token_store().clear();

        let err = client.list_recent(10).await.unwrap_err();
        assert!(matches!(err, PhotosError::NotAuthenticated));
    }
}
