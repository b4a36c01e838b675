use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::identity::{row_key, MediaKey};
use super::DesiredMedia;
use crate::entities::{project_media, sea_orm_active_enums::MediaType};
use crate::error::{AppError, AppResult};

/// Column values written for one gallery row.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFields {
    pub media_type: MediaType,
    pub bucket: String,
    pub path: Option<String>,
    pub url: Option<String>,
    pub alt_text: String,
    pub order_index: i32,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
}

impl MediaFields {
    fn from_desired(item: &DesiredMedia, position: usize) -> Self {
        Self {
            media_type: item.media_type,
            bucket: item.bucket().to_string(),
            path: item.path().map(str::to_string),
            url: item.url().map(str::to_string),
            alt_text: item.alt_text.clone().unwrap_or_default(),
            order_index: position as i32,
            mime: item.mime.clone(),
            size_bytes: item.size_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpdate {
    pub id: Uuid,
    pub fields: MediaFields,
}

/// Row operations that turn the persisted gallery into the desired one.
///
/// Apply `deletes` before `inserts`: an inserted row may reuse the identity of a deleted one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryPlan {
    pub deletes: Vec<Uuid>,
    pub updates: Vec<MediaUpdate>,
    pub inserts: Vec<MediaFields>,
}

impl GalleryPlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.inserts.is_empty()
    }
}

/// Check every desired item has an identity and no identity appears twice.
pub fn validate_gallery(desired: &[DesiredMedia]) -> AppResult<Vec<MediaKey>> {
    let mut seen = HashSet::new();
    let mut keys = Vec::with_capacity(desired.len());

    for (position, item) in desired.iter().enumerate() {
        let key = item
            .key()
            .map_err(|_| AppError::validation(format!("gallery item {} has no path or url", position)))?;
        if !seen.insert(key.clone()) {
            return Err(AppError::validation(format!(
                "gallery item {} duplicates media '{}'",
                position, key
            )));
        }
        keys.push(key);
    }

    Ok(keys)
}

/// Diff the desired gallery against the rows currently stored for the project.
pub fn plan_gallery(
    desired: &[DesiredMedia],
    existing: &[project_media::Model],
) -> AppResult<GalleryPlan> {
    let keys = validate_gallery(desired)?;
    let wanted: HashSet<&MediaKey> = keys.iter().collect();

    let mut plan = GalleryPlan::default();
    let mut matched: HashMap<MediaKey, Uuid> = HashMap::new();

    for row in existing {
        match row_key(row) {
            Some(key) if wanted.contains(&key) && !matched.contains_key(&key) => {
                matched.insert(key, row.id);
            }
            // Removed from the gallery, duplicated, or without identity.
            _ => plan.deletes.push(row.id),
        }
    }

    for (position, (item, key)) in desired.iter().zip(keys.iter()).enumerate() {
        let fields = MediaFields::from_desired(item, position);
        match matched.get(key) {
            Some(id) => plan.updates.push(MediaUpdate { id: *id, fields }),
            None => plan.inserts.push(fields),
        }
    }

    Ok(plan)
}
