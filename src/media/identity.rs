use std::fmt;

use crate::entities::project_media;
use crate::error::{AppError, AppResult};

/// Identity of a gallery item: its storage path, or its legacy URL when it has no path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey(String);

impl MediaKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the identity key of a media item. Empty strings count as absent.
pub fn identity_key(path: Option<&str>, url: Option<&str>) -> AppResult<MediaKey> {
    path.filter(|p| !p.is_empty())
        .or_else(|| url.filter(|u| !u.is_empty()))
        .map(|key| MediaKey(key.to_string()))
        .ok_or_else(|| AppError::validation("media item requires a storage path or a url"))
}

/// Key of a persisted row. Rows without path and url have no identity.
pub(crate) fn row_key(row: &project_media::Model) -> Option<MediaKey> {
    identity_key(row.path.as_deref(), row.url.as_deref()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn path_wins_over_url() {
        let key = identity_key(Some("1700000000-a.jpg"), Some("https://cdn/x.jpg")).unwrap();
        assert_eq!(key.as_str(), "1700000000-a.jpg");
    }

    #[test]
    fn url_is_used_when_path_is_missing_or_empty() {
        assert_eq!(identity_key(None, Some("https://cdn/x.jpg")).unwrap().as_str(), "https://cdn/x.jpg");
        assert_eq!(identity_key(Some(""), Some("https://cdn/x.jpg")).unwrap().as_str(), "https://cdn/x.jpg");
    }

    #[test]
    fn item_without_path_or_url_is_rejected() {
        assert_matches!(identity_key(None, None), Err(AppError::Validation(_)));
        assert_matches!(identity_key(Some(""), Some("")), Err(AppError::Validation(_)));
    }
}
