//! Enums shared by entities and exposed through GraphQL.

use async_graphql::Enum;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Published => "published",
            ProjectStatus::Archived => "archived",
        }
    }

    /// Every status can move to every other one; transitions carry no side effects.
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        *self != next
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }
}

/// A user without a role row resolves to `Viewer`.
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[default]
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

impl UserRole {
    pub fn can_manage_content(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_match_stored_values() {
        assert_eq!(ProjectStatus::Draft.as_str(), "draft");
        assert_eq!(ProjectStatus::Archived.into_value(), "archived");
    }

    #[test]
    fn all_six_status_transitions_are_allowed() {
        let all = [ProjectStatus::Draft, ProjectStatus::Published, ProjectStatus::Archived];
        let allowed = all
            .iter()
            .flat_map(|from| all.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .count();
        assert_eq!(allowed, 6);
    }

    #[test]
    fn missing_role_defaults_to_viewer() {
        assert_eq!(UserRole::default(), UserRole::Viewer);
        assert!(!UserRole::Viewer.can_manage_content());
        assert!(UserRole::Admin.can_manage_content());
    }

    #[test]
    fn media_type_follows_mime_family() {
        assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_mime("application/octet-stream"), MediaType::Image);
    }
}
