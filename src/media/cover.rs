/// URLs under which a saved gallery item can be referenced as a cover.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaUrls {
    /// Public URL derived from the storage path.
    pub public_url: Option<String>,
    pub legacy_url: Option<String>,
}

impl MediaUrls {
    /// Storage-derived URL first, legacy URL otherwise.
    pub fn preferred(&self) -> Option<&str> {
        self.public_url.as_deref().or(self.legacy_url.as_deref())
    }

    fn matches(&self, cover: &str) -> bool {
        self.public_url.as_deref() == Some(cover) || self.legacy_url.as_deref() == Some(cover)
    }
}

/// Decide whether a gallery save must move the cover.
///
/// Returns the new cover when the current one is unset or points at nothing in the
/// gallery. An empty gallery never changes the cover.
pub fn resolve_cover(current: Option<&str>, gallery: &[MediaUrls]) -> Option<String> {
    let first = gallery.first()?;

    if let Some(cover) = current.filter(|c| !c.is_empty()) {
        if gallery.iter().any(|item| item.matches(cover)) {
            return None;
        }
    }

    first.preferred().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(public: &str) -> MediaUrls {
        MediaUrls {
            public_url: Some(public.to_string()),
            legacy_url: None,
        }
    }

    #[test]
    fn unset_cover_takes_the_first_item() {
        let gallery = vec![stored("https://cdn/a.jpg"), stored("https://cdn/b.jpg")];
        assert_eq!(resolve_cover(None, &gallery).as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(resolve_cover(Some(""), &gallery).as_deref(), Some("https://cdn/a.jpg"));
    }

    #[test]
    fn cover_still_in_gallery_is_kept() {
        let gallery = vec![stored("https://cdn/a.jpg"), stored("https://cdn/b.jpg")];
        assert_eq!(resolve_cover(Some("https://cdn/b.jpg"), &gallery), None);
    }

    #[test]
    fn cover_matching_a_legacy_url_is_kept() {
        let gallery = vec![MediaUrls {
            public_url: Some("https://cdn/a.jpg".into()),
            legacy_url: Some("https://old/a.jpg".into()),
        }];
        assert_eq!(resolve_cover(Some("https://old/a.jpg"), &gallery), None);
    }

    #[test]
    fn removed_cover_falls_back_to_first_item() {
        let gallery = vec![stored("https://cdn/a.jpg"), stored("https://cdn/b.jpg")];
        assert_eq!(
            resolve_cover(Some("https://cdn/c.jpg"), &gallery).as_deref(),
            Some("https://cdn/a.jpg")
        );
    }

    #[test]
    fn storage_url_is_preferred_over_legacy() {
        let gallery = vec![MediaUrls {
            public_url: Some("https://cdn/a.jpg".into()),
            legacy_url: Some("https://old/a.jpg".into()),
        }];
        assert_eq!(resolve_cover(None, &gallery).as_deref(), Some("https://cdn/a.jpg"));

        let legacy_only = vec![MediaUrls {
            public_url: None,
            legacy_url: Some("https://old/a.jpg".into()),
        }];
        assert_eq!(resolve_cover(None, &legacy_only).as_deref(), Some("https://old/a.jpg"));
    }

    #[test]
    fn empty_gallery_leaves_cover_untouched() {
        assert_eq!(resolve_cover(Some("https://cdn/gone.jpg"), &[]), None);
        assert_eq!(resolve_cover(None, &[]), None);
    }
}
