use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const THUMBNAIL_SUFFIX: &str = "=w400-h400";
pub const FULL_SIZE_SUFFIX: &str = "=d";

/// `mediaItems.list` response from the Photos Library API
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemsResponse {
    /// Absent when the library (or page) has no items
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub media_metadata: Option<MediaMetadata>,
}

/// Google encodes width and height as int64 strings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub creation_time: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Normalized photo returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub creation_time: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub base_url: String,
    pub thumbnail_url: String,
    pub full_size_url: String,
}

impl PhotoRecord {
    /// Parsed creation time, used for ordering
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

impl From<MediaItem> for PhotoRecord {
    fn from(item: MediaItem) -> Self {
        let metadata = item.media_metadata.unwrap_or_default();
        let dimension = |value: Option<String>| value.and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            thumbnail_url: format!("{}{}", item.base_url, THUMBNAIL_SUFFIX),
            full_size_url: format!("{}{}", item.base_url, FULL_SIZE_SUFFIX),
            id: item.id,
            filename: item.filename,
            mime_type: item.mime_type,
            creation_time: metadata.creation_time,
            width: dimension(metadata.width),
            height: dimension(metadata.height),
            base_url: item.base_url,
        }
    }
}

/// One page of photos plus the cursor for the next one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedPhotoResult {
    pub photos: Vec<PhotoRecord>,
    pub next_page_token: Option<String>,
}

impl PagedPhotoResult {
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// Map a listing response, newest first.
///
/// Items without a parseable creation time keep their relative order after the
/// dated ones.
pub fn to_photo_records(items: Vec<MediaItem>) -> Vec<PhotoRecord> {
    let mut photos: Vec<PhotoRecord> = items.into_iter().map(PhotoRecord::from).collect();
    photos.sort_by_key(|photo| std::cmp::Reverse(photo.created_at()));
    photos
}
