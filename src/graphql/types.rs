use async_graphql::*;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::sea_orm_active_enums::{MediaType, ProjectStatus, UserRole};
use crate::entities::{category, team_member};
use crate::media::DesiredMedia;
use crate::services::{
    self, ActivityEntry as ActivityRow, AdminUser as AdminUserRow, CategoryWithCount,
    ContactMessage, CreateCategoryCommand, CreateProjectCommand, CreateUserCommand,
    DashboardStats as StatsRow, GalleryEntry, ProjectFilters, ProjectRecord, SettingKey,
    SiteSettings as SettingsMap, TeamMemberInput, TeamMemberPatch, UpdateCategoryCommand,
    UpdateProjectCommand, UpdateUserCommand,
};

/// Omitted stays untouched, explicit null clears.
fn patch<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(v) => Some(Some(v)),
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<AuthUser> for User {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<services::AuthPayload> for AuthPayload {
    fn from(payload: services::AuthPayload) -> Self {
        Self {
            user: payload.user.into(),
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        }
    }
}

#[derive(InputObject)]
pub struct RefreshTokenInput {
    pub refresh_token: String,
}

#[derive(InputObject)]
pub struct ForgotPasswordInput {
    pub email: String,
}

#[derive(InputObject)]
pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

#[derive(SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Admin users
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(user: AdminUserRow) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at.map(Into::into),
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_active: Option<bool>,
}

impl From<CreateUserInput> for CreateUserCommand {
    fn from(input: CreateUserInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password: input.password,
            is_active: input.is_active.unwrap_or(true),
        }
    }
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserInput> for UpdateUserCommand {
    fn from(input: UpdateUserInput) -> Self {
        Self {
            name: input.name,
            role: input.role,
            is_active: input.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct GalleryItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub media_type: MediaType,
    /// Storage-derived public URL, or the legacy URL when the item has no path.
    pub url: Option<String>,
    pub alt_text: String,
    pub order_index: i32,
    pub path: Option<String>,
    pub bucket: String,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
}

impl From<GalleryEntry> for GalleryItem {
    fn from(entry: GalleryEntry) -> Self {
        let media = entry.media;
        Self {
            id: media.id,
            project_id: media.project_id,
            media_type: media.media_type,
            url: entry.url,
            alt_text: media.alt_text,
            order_index: media.order_index,
            path: media.path,
            bucket: media.bucket,
            mime: media.mime,
            size_bytes: media.size_bytes,
        }
    }
}

#[derive(SimpleObject)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub description: String,
    pub content: String,
    pub client: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub cover_image: Option<String>,
    pub status: ProjectStatus,
    pub featured: bool,
    pub order_index: i32,
    pub tags: Vec<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub gallery: Vec<GalleryItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let category_name = record.category_name().to_string();
        let project = record.project;
        let updated_at: DateTime<Utc> = project.updated_at.into();
        Self {
            id: project.id,
            title: project.title,
            slug: project.slug,
            category_id: project.category_id,
            category_name,
            description: project.description,
            content: project.content,
            client: project.client,
            date: project.date,
            location: project.location,
            cover_image: project.cover_image,
            status: project.status,
            featured: project.featured,
            order_index: project.order_index,
            tags: project.tags.0,
            seo_title: project.seo_title,
            seo_description: project.seo_description,
            gallery: record.gallery.into_iter().map(Into::into).collect(),
            created_at: project.created_at.into(),
            published_at: (project.status == ProjectStatus::Published).then_some(updated_at),
            updated_at,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct GalleryItemInput {
    /// Inferred from `mime` when omitted.
    pub media_type: Option<MediaType>,
    pub bucket: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub alt_text: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
}

impl From<GalleryItemInput> for DesiredMedia {
    fn from(input: GalleryItemInput) -> Self {
        let media_type = input.media_type.unwrap_or_else(|| {
            input
                .mime
                .as_deref()
                .map(MediaType::from_mime)
                .unwrap_or(MediaType::Image)
        });
        Self {
            media_type,
            bucket: input.bucket,
            path: input.path,
            url: input.url,
            alt_text: input.alt_text,
            mime: input.mime,
            size_bytes: input.size_bytes,
        }
    }
}

fn into_gallery(items: Option<Vec<GalleryItemInput>>) -> Option<Vec<DesiredMedia>> {
    items.map(|items| items.into_iter().map(Into::into).collect())
}

#[derive(InputObject)]
pub struct CreateProjectInput {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub client: Option<String>,
    /// `YYYY-MM-DD`; blank means no date.
    pub date: Option<String>,
    pub location: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub order_index: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub gallery: Option<Vec<GalleryItemInput>>,
}

impl From<CreateProjectInput> for CreateProjectCommand {
    fn from(input: CreateProjectInput) -> Self {
        Self {
            title: input.title,
            slug: input.slug,
            description: input.description,
            content: input.content,
            category_id: input.category_id,
            client: input.client,
            date: input.date,
            location: input.location,
            cover_image: input.cover_image,
            status: input.status,
            featured: input.featured,
            order_index: input.order_index,
            tags: input.tags,
            seo_title: input.seo_title,
            seo_description: input.seo_description,
            gallery: into_gallery(input.gallery),
        }
    }
}

/// Every field is optional; nullable columns accept an explicit `null` to clear them.
#[derive(InputObject, Default)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: MaybeUndefined<Uuid>,
    pub client: Option<String>,
    pub date: MaybeUndefined<String>,
    pub location: Option<String>,
    pub cover_image: MaybeUndefined<String>,
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub order_index: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub seo_title: MaybeUndefined<String>,
    pub seo_description: MaybeUndefined<String>,
    /// Complete desired gallery in display order.
    pub gallery: Option<Vec<GalleryItemInput>>,
}

impl From<UpdateProjectInput> for UpdateProjectCommand {
    fn from(input: UpdateProjectInput) -> Self {
        Self {
            title: input.title,
            slug: input.slug,
            description: input.description,
            content: input.content,
            category_id: patch(input.category_id),
            client: input.client,
            date: patch(input.date),
            location: input.location,
            cover_image: patch(input.cover_image),
            status: input.status,
            featured: input.featured,
            order_index: input.order_index,
            tags: input.tags,
            seo_title: patch(input.seo_title),
            seo_description: patch(input.seo_description),
            gallery: into_gallery(input.gallery),
        }
    }
}

#[derive(InputObject, Default)]
pub struct ProjectFiltersInput {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
}

impl From<ProjectFiltersInput> for ProjectFilters {
    fn from(input: ProjectFiltersInput) -> Self {
        Self {
            search: input.search,
            category_id: input.category_id,
            status: input.status,
        }
    }
}

#[derive(InputObject)]
pub struct ReorderProjectInput {
    pub id: Uuid,
    pub order_index: i32,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub project_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryWithCount> for Category {
    fn from(row: CategoryWithCount) -> Self {
        let mut category = Category::from(row.category);
        category.project_count = row.project_count;
        category
    }
}

impl From<category::Model> for Category {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            color: category.color,
            is_active: category.is_active,
            project_count: 0,
            created_at: category.created_at.into(),
            updated_at: category.updated_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateCategoryInput> for CreateCategoryCommand {
    fn from(input: CreateCategoryInput) -> Self {
        Self {
            name: input.name,
            slug: input.slug,
            description: input.description,
            color: input.color,
            is_active: input.is_active,
        }
    }
}

#[derive(InputObject)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: MaybeUndefined<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateCategoryInput> for UpdateCategoryCommand {
    fn from(input: UpdateCategoryInput) -> Self {
        Self {
            name: input.name,
            slug: input.slug,
            description: patch(input.description),
            color: input.color,
            is_active: input.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub social_instagram: Option<String>,
    pub social_linkedin: Option<String>,
    pub social_behance: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team_member::Model> for TeamMember {
    fn from(member: team_member::Model) -> Self {
        Self {
            id: member.id,
            name: member.name,
            role: member.role,
            bio: member.bio,
            avatar: member.avatar,
            social_instagram: member.social_instagram,
            social_linkedin: member.social_linkedin,
            social_behance: member.social_behance,
            order_index: member.order_index,
            created_at: member.created_at.into(),
            updated_at: member.updated_at.into(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateTeamMemberInput {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub social_instagram: Option<String>,
    pub social_linkedin: Option<String>,
    pub social_behance: Option<String>,
    pub order_index: Option<i32>,
}

impl From<CreateTeamMemberInput> for TeamMemberInput {
    fn from(input: CreateTeamMemberInput) -> Self {
        Self {
            name: input.name,
            role: input.role,
            bio: input.bio,
            avatar: input.avatar,
            social_instagram: input.social_instagram,
            social_linkedin: input.social_linkedin,
            social_behance: input.social_behance,
            order_index: input.order_index,
        }
    }
}

#[derive(InputObject)]
pub struct UpdateTeamMemberInput {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: MaybeUndefined<String>,
    pub avatar: MaybeUndefined<String>,
    pub social_instagram: MaybeUndefined<String>,
    pub social_linkedin: MaybeUndefined<String>,
    pub social_behance: MaybeUndefined<String>,
    pub order_index: Option<i32>,
}

impl From<UpdateTeamMemberInput> for TeamMemberPatch {
    fn from(input: UpdateTeamMemberInput) -> Self {
        Self {
            name: input.name,
            role: input.role,
            bio: patch(input.bio),
            avatar: patch(input.avatar),
            social_instagram: patch(input.social_instagram),
            social_linkedin: patch(input.social_linkedin),
            social_behance: patch(input.social_behance),
            order_index: input.order_index,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings, dashboard, contact
// ---------------------------------------------------------------------------

#[derive(SimpleObject)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub social_instagram: String,
    pub social_facebook: String,
    pub social_twitter: String,
    pub social_linkedin: String,
    pub seo_meta_title: String,
    pub seo_meta_description: String,
    pub seo_keywords: String,
}

impl From<SettingsMap> for SiteSettings {
    fn from(settings: SettingsMap) -> Self {
        let get = |key| settings.get(key).to_string();
        Self {
            site_name: get(SettingKey::SiteName),
            site_description: get(SettingKey::SiteDescription),
            contact_email: get(SettingKey::ContactEmail),
            contact_phone: get(SettingKey::ContactPhone),
            contact_address: get(SettingKey::ContactAddress),
            social_instagram: get(SettingKey::SocialInstagram),
            social_facebook: get(SettingKey::SocialFacebook),
            social_twitter: get(SettingKey::SocialTwitter),
            social_linkedin: get(SettingKey::SocialLinkedin),
            seo_meta_title: get(SettingKey::SeoMetaTitle),
            seo_meta_description: get(SettingKey::SeoMetaDescription),
            seo_keywords: get(SettingKey::SeoKeywords),
        }
    }
}

/// Only provided keys are written.
#[derive(InputObject, Default)]
pub struct SiteSettingsInput {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
    pub social_instagram: Option<String>,
    pub social_facebook: Option<String>,
    pub social_twitter: Option<String>,
    pub social_linkedin: Option<String>,
    pub seo_meta_title: Option<String>,
    pub seo_meta_description: Option<String>,
    pub seo_keywords: Option<String>,
}

impl SiteSettingsInput {
    pub fn into_values(self) -> Vec<(SettingKey, String)> {
        [
            (SettingKey::SiteName, self.site_name),
            (SettingKey::SiteDescription, self.site_description),
            (SettingKey::ContactEmail, self.contact_email),
            (SettingKey::ContactPhone, self.contact_phone),
            (SettingKey::ContactAddress, self.contact_address),
            (SettingKey::SocialInstagram, self.social_instagram),
            (SettingKey::SocialFacebook, self.social_facebook),
            (SettingKey::SocialTwitter, self.social_twitter),
            (SettingKey::SocialLinkedin, self.social_linkedin),
            (SettingKey::SeoMetaTitle, self.seo_meta_title),
            (SettingKey::SeoMetaDescription, self.seo_meta_description),
            (SettingKey::SeoKeywords, self.seo_keywords),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

#[derive(SimpleObject)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub published_projects: u64,
    pub draft_projects: u64,
    pub featured_projects: u64,
    pub last_updated: DateTime<Utc>,
}

impl From<StatsRow> for DashboardStats {
    fn from(stats: StatsRow) -> Self {
        Self {
            total_projects: stats.total_projects,
            published_projects: stats.published_projects,
            draft_projects: stats.draft_projects,
            featured_projects: stats.featured_projects,
            last_updated: stats.last_updated,
        }
    }
}

#[derive(SimpleObject)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_name: String,
    pub action: String,
    pub project_title: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(entry: ActivityRow) -> Self {
        Self {
            id: entry.id,
            user_name: entry.user_name,
            action: entry.action,
            project_title: entry.project_title,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(InputObject)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl From<ContactInput> for ContactMessage {
    fn from(input: ContactInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            message: input.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_and_null_fields_stay_distinct() {
        let input = UpdateProjectInput {
            cover_image: MaybeUndefined::Null,
            seo_title: MaybeUndefined::Value(String::new()),
            ..Default::default()
        };
        let command = UpdateProjectCommand::from(input);

        assert_eq!(command.cover_image, Some(None));
        assert_eq!(command.seo_title, Some(Some(String::new())));
        assert_eq!(command.category_id, None);
        assert_eq!(command.date, None);
        assert!(command.gallery.is_none());
    }

    #[test]
    fn gallery_input_infers_type_from_mime() {
        let item = GalleryItemInput {
            media_type: None,
            bucket: None,
            path: Some("1700000000-clip.mp4".into()),
            url: None,
            alt_text: None,
            mime: Some("video/mp4".into()),
            size_bytes: Some(1024),
        };
        let desired = DesiredMedia::from(item);
        assert_eq!(desired.media_type, MediaType::Video);
    }

    #[test]
    fn settings_input_keeps_only_provided_keys() {
        let input = SiteSettingsInput {
            contact_email: Some("hola@cuartorojo.com".into()),
            social_twitter: Some(String::new()),
            ..Default::default()
        };
        let values = input.into_values();
        assert_eq!(
            values,
            vec![
                (SettingKey::ContactEmail, "hola@cuartorojo.com".to_string()),
                (SettingKey::SocialTwitter, String::new()),
            ]
        );
    }
}
