use std::path::Path;
use std::sync::Arc;

use async_graphql::SimpleObject;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{MediaType, ProjectStatus};
use crate::entities::{category, team_member};
use crate::error::{AppError, AppResult};
use crate::services::{
    CategoryService, ContactMessage, EmailService, ProjectRecord, ProjectService, SettingsService,
    SiteSettings, TeamService,
};

const CONTACT_MESSAGE_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct PublicMedia {
    pub media_type: MediaType,
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct PublicCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub color: String,
}

impl From<category::Model> for PublicCategory {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            color: category.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct PublicProject {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub category_slug: Option<String>,
    pub category_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub gallery: Vec<PublicMedia>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<FixedOffset>>,
}

impl From<ProjectRecord> for PublicProject {
    fn from(record: ProjectRecord) -> Self {
        let category_name = record.category_name().to_string();
        let project = record.project;
        Self {
            id: project.id,
            title: project.title,
            slug: project.slug,
            category_slug: record.category.map(|c| c.slug),
            category_name,
            description: project.description,
            content: project.content,
            client: project.client,
            date: project.date,
            location: project.location,
            // Detail pages fall back to the first gallery image.
            cover_image: project.cover_image.or_else(|| record.gallery.first().and_then(|g| g.url.clone())),
            featured: project.featured,
            order_index: project.order_index,
            tags: project.tags.0,
            gallery: record
                .gallery
                .into_iter()
                .filter_map(|entry| {
                    Some(PublicMedia {
                        url: entry.url?,
                        media_type: entry.media.media_type,
                        alt_text: entry.media.alt_text,
                        order_index: entry.media.order_index,
                    })
                })
                .collect(),
            seo_title: project.seo_title,
            seo_description: project.seo_description,
            published_at: (project.status == ProjectStatus::Published).then_some(project.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct PublicTeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub social_instagram: Option<String>,
    #[serde(default)]
    pub social_linkedin: Option<String>,
    #[serde(default)]
    pub social_behance: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

impl From<team_member::Model> for PublicTeamMember {
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
        }
    }
}

/// Static site content used instead of the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFixtures {
    #[serde(default)]
    pub projects: Vec<PublicProject>,
    #[serde(default)]
    pub categories: Vec<PublicCategory>,
    #[serde(default)]
    pub team: Vec<PublicTeamMember>,
    #[serde(default)]
    pub settings: SiteSettings,
}

impl ContentFixtures {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Internal(format!("invalid content fixtures: {}", e)))
    }

    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Internal(format!("cannot read {}: {}", path.display(), e)))?;
        let fixtures = Self::from_json(&raw)?;
        info!(
            "📄 Loaded content fixtures: {} projects, {} categories, {} team members",
            fixtures.projects.len(),
            fixtures.categories.len(),
            fixtures.team.len()
        );
        Ok(fixtures)
    }
}

#[derive(Clone)]
pub enum ContentSource {
    Database {
        projects: ProjectService,
        categories: CategoryService,
        team: TeamService,
        settings: SettingsService,
    },
    Fixtures(Arc<ContentFixtures>),
}

/// Read side of the public site plus the contact form.
#[derive(Clone)]
pub struct PublicContentService {
    source: ContentSource,
    email_service: EmailService,
}

impl PublicContentService {
    pub fn new(source: ContentSource, email_service: EmailService) -> Self {
        Self { source, email_service }
    }

    pub async fn published_projects(&self, category_slug: Option<&str>) -> AppResult<Vec<PublicProject>> {
        match &self.source {
            ContentSource::Database { projects, .. } => Ok(projects
                .published_projects(category_slug)
                .await?
                .into_iter()
                .map(PublicProject::from)
                .collect()),
            ContentSource::Fixtures(fixtures) => Ok(fixtures
                .projects
                .iter()
                .filter(|p| match category_slug.filter(|s| !s.is_empty()) {
                    Some(slug) => p.category_slug.as_deref() == Some(slug),
                    None => true,
                })
                .cloned()
                .collect()),
        }
    }

    pub async fn project_by_slug(&self, slug: &str) -> AppResult<Option<PublicProject>> {
        match &self.source {
            ContentSource::Database { projects, .. } => Ok(projects
                .published_project_by_slug(slug)
                .await?
                .map(PublicProject::from)),
            ContentSource::Fixtures(fixtures) => {
                Ok(fixtures.projects.iter().find(|p| p.slug == slug).cloned())
            }
        }
    }

    pub async fn featured_projects(&self) -> AppResult<Vec<PublicProject>> {
        match &self.source {
            ContentSource::Database { projects, .. } => Ok(projects
                .featured_projects()
                .await?
                .into_iter()
                .map(PublicProject::from)
                .collect()),
            ContentSource::Fixtures(fixtures) => {
                Ok(fixtures.projects.iter().filter(|p| p.featured).cloned().collect())
            }
        }
    }

    pub async fn categories(&self) -> AppResult<Vec<PublicCategory>> {
        match &self.source {
            ContentSource::Database { categories, .. } => Ok(categories
                .active_categories()
                .await?
                .into_iter()
                .map(PublicCategory::from)
                .collect()),
            ContentSource::Fixtures(fixtures) => Ok(fixtures.categories.clone()),
        }
    }

    pub async fn team_members(&self) -> AppResult<Vec<PublicTeamMember>> {
        match &self.source {
            ContentSource::Database { team, .. } => Ok(team
                .list_team_members()
                .await?
                .into_iter()
                .map(PublicTeamMember::from)
                .collect()),
            ContentSource::Fixtures(fixtures) => {
                let mut members = fixtures.team.clone();
                members.sort_by_key(|m| m.order_index);
                Ok(members)
            }
        }
    }

    pub async fn settings(&self) -> AppResult<SiteSettings> {
        match &self.source {
            ContentSource::Database { settings, .. } => settings.get_settings().await,
            ContentSource::Fixtures(fixtures) => Ok(fixtures.settings.clone()),
        }
    }

    pub async fn submit_contact(&self, message: ContactMessage) -> AppResult<()> {
        validate_contact(&message)?;
        self.email_service.send_contact_notification(&message).await
    }
}

fn validate_contact(message: &ContactMessage) -> AppResult<()> {
    if message.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if !message.email.contains('@') {
        return Err(AppError::validation("a valid email is required"));
    }
    if message.message.trim().is_empty() {
        return Err(AppError::validation("message is required"));
    }
    if message.message.chars().count() > CONTACT_MESSAGE_MAX_CHARS {
        return Err(AppError::validation(format!(
            "message must be at most {} characters",
            CONTACT_MESSAGE_MAX_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FIXTURES: &str = r#"{
        "projects": [
            {"id": "6f1c8a9e-3b1d-4c4e-9a59-0d7c1f7e2a10", "title": "Boda en la Playa", "slug": "boda-en-la-playa",
             "category_slug": "bodas", "category_name": "Bodas", "featured": true},
            {"id": "0b5b8f8e-6d77-4a3f-8f1e-5d2c9b7a4e21", "title": "Gala Anual", "slug": "gala-anual",
             "category_name": "Sin categoría"}
        ],
        "team": [
            {"id": "e2a1d3c4-1111-4c4e-9a59-0d7c1f7e2a10", "name": "Luis", "role": "Producción", "order_index": 2},
            {"id": "e2a1d3c4-2222-4c4e-9a59-0d7c1f7e2a10", "name": "Marta", "role": "Dirección", "order_index": 1}
        ],
        "settings": {"contact_email": "hola@cuartorojo.com"}
    }"#;

    fn fixture_service() -> PublicContentService {
        let fixtures = ContentFixtures::from_json(FIXTURES).unwrap();
        PublicContentService::new(
            ContentSource::Fixtures(Arc::new(fixtures)),
            EmailService::new("", "noreply@cuartorojo.com".into(), "hola@cuartorojo.com".into()),
        )
    }

    #[tokio::test]
    async fn fixtures_filter_by_category_and_featured() {
        let service = fixture_service();

        assert_eq!(service.published_projects(None).await.unwrap().len(), 2);
        let bodas = service.published_projects(Some("bodas")).await.unwrap();
        assert_eq!(bodas.len(), 1);
        assert_eq!(bodas[0].slug, "boda-en-la-playa");

        let featured = service.featured_projects().await.unwrap();
        assert_eq!(featured.len(), 1);
        assert!(service.project_by_slug("gala-anual").await.unwrap().is_some());
        assert!(service.project_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fixture_team_is_ordered() {
        let team = fixture_service().team_members().await.unwrap();
        let names: Vec<_> = team.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Marta", "Luis"]);
    }

    #[tokio::test]
    async fn contact_form_is_validated() {
        let service = fixture_service();
        let mut message = ContactMessage {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: None,
            message: "Queremos organizar un evento".into(),
        };
        assert!(service.submit_contact(message.clone()).await.is_ok());

        message.email = "ana".into();
        assert_matches!(service.submit_contact(message).await, Err(AppError::Validation(_)));
    }
}
