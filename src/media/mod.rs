//! Gallery reconciliation: identity keys, row-level planning and cover fallback.
//!
//! Everything here is pure; persistence lives in `services::project`.

pub mod cover;
pub mod identity;
pub mod plan;

pub use cover::{resolve_cover, MediaUrls};
pub use identity::{identity_key, MediaKey};
pub use plan::{plan_gallery, validate_gallery, GalleryPlan, MediaFields, MediaUpdate};

use crate::entities::sea_orm_active_enums::MediaType;

/// Bucket used when a gallery item does not name one.
pub const DEFAULT_BUCKET: &str = "project-media";

/// One entry of the gallery the admin wants persisted, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredMedia {
    pub media_type: MediaType,
    pub bucket: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub alt_text: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
}

impl DesiredMedia {
    pub fn image_at_path(path: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Image,
            bucket: None,
            path: Some(path.into()),
            url: None,
            alt_text: None,
            mime: None,
            size_bytes: None,
        }
    }

    pub fn legacy_url(media_type: MediaType, url: impl Into<String>) -> Self {
        Self {
            media_type,
            bucket: None,
            path: None,
            url: Some(url.into()),
            alt_text: None,
            mime: None,
            size_bytes: None,
        }
    }

    pub fn key(&self) -> crate::error::AppResult<MediaKey> {
        identity_key(self.path.as_deref(), self.url.as_deref())
    }

    pub fn bucket(&self) -> &str {
        self.bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BUCKET)
    }

    pub(crate) fn path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    pub(crate) fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}
