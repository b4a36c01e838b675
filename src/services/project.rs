use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::JoinType;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::ProjectStatus;
use crate::entities::{category, prelude::*, project, project_media};
use crate::error::{AppError, AppResult};
use crate::media::{plan_gallery, resolve_cover, validate_gallery, DesiredMedia, MediaUrls};
use crate::storage::StorageService;

pub const SEO_TITLE_MAX_CHARS: usize = 60;
pub const SEO_DESCRIPTION_MAX_CHARS: usize = 160;
pub const UNCATEGORIZED_LABEL: &str = "Sin categoría";

/// Lowercase and join whitespace-separated words with `-`.
pub fn slugify(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part is kept). Blank is null.
pub fn parse_event_date(raw: &str) -> AppResult<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|_| AppError::validation(format!("invalid event date '{}'", raw)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_seo(seo_title: Option<&str>, seo_description: Option<&str>) -> AppResult<()> {
    if seo_title.is_some_and(|t| t.chars().count() > SEO_TITLE_MAX_CHARS) {
        return Err(AppError::validation(format!(
            "SEO title must be at most {} characters",
            SEO_TITLE_MAX_CHARS
        )));
    }
    if seo_description.is_some_and(|d| d.chars().count() > SEO_DESCRIPTION_MAX_CHARS) {
        return Err(AppError::validation(format!(
            "SEO description must be at most {} characters",
            SEO_DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct CreateProjectCommand {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub client: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub order_index: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub gallery: Option<Vec<DesiredMedia>>,
}

impl CreateProjectCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        check_seo(self.seo_title.as_deref(), self.seo_description.as_deref())?;
        if let Some(gallery) = &self.gallery {
            validate_gallery(gallery)?;
        }
        Ok(())
    }

    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.title),
        }
    }
}

/// Sparse project patch.
///
/// `None` leaves a column untouched. On nullable columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectCommand {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Option<Uuid>>,
    pub client: Option<String>,
    pub date: Option<Option<String>>,
    pub location: Option<String>,
    pub cover_image: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub featured: Option<bool>,
    pub order_index: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub seo_title: Option<Option<String>>,
    pub seo_description: Option<Option<String>>,
    /// Full desired gallery; `None` leaves media untouched.
    pub gallery: Option<Vec<DesiredMedia>>,
}

impl UpdateProjectCommand {
    /// True when no project column would change.
    pub fn is_empty_patch(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.category_id.is_none()
            && self.client.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.cover_image.is_none()
            && self.status.is_none()
            && self.featured.is_none()
            && self.order_index.is_none()
            && self.tags.is_none()
            && self.seo_title.is_none()
            && self.seo_description.is_none()
    }

    pub fn validate(&self) -> AppResult<()> {
        check_seo(
            self.seo_title.as_ref().and_then(|t| t.as_deref()),
            self.seo_description.as_ref().and_then(|d| d.as_deref()),
        )?;
        if let Some(Some(date)) = &self.date {
            parse_event_date(date)?;
        }
        if let Some(gallery) = &self.gallery {
            validate_gallery(gallery)?;
        }
        Ok(())
    }

    fn apply(&self, model: &mut project::ActiveModel) -> AppResult<()> {
        if let Some(title) = &self.title {
            model.title = Set(title.clone());
        }
        if let Some(slug) = &self.slug {
            model.slug = Set(slug.clone());
        }
        if let Some(description) = &self.description {
            model.description = Set(description.clone());
        }
        if let Some(content) = &self.content {
            model.content = Set(content.clone());
        }
        if let Some(category_id) = self.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(client) = &self.client {
            model.client = Set(client.clone());
        }
        if let Some(date) = &self.date {
            let parsed = match date {
                Some(raw) => parse_event_date(raw)?,
                None => None,
            };
            model.date = Set(parsed);
        }
        if let Some(location) = &self.location {
            model.location = Set(location.clone());
        }
        if let Some(cover_image) = &self.cover_image {
            model.cover_image = Set(cover_image.clone());
        }
        if let Some(status) = self.status {
            model.status = Set(status);
        }
        if let Some(featured) = self.featured {
            model.featured = Set(featured);
        }
        if let Some(order_index) = self.order_index {
            model.order_index = Set(order_index);
        }
        if let Some(tags) = &self.tags {
            model.tags = Set(project::Tags(tags.clone()));
        }
        if let Some(seo_title) = &self.seo_title {
            model.seo_title = Set(seo_title.clone());
        }
        if let Some(seo_description) = &self.seo_description {
            model.seo_description = Set(seo_description.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilters {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
}

/// Gallery row with the URL it is served under.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    pub media: project_media::Model,
    /// Storage-derived public URL, or the legacy URL for rows without a path.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub project: project::Model,
    pub category: Option<category::Model>,
    pub gallery: Vec<GalleryEntry>,
}

impl ProjectRecord {
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED_LABEL)
    }
}

#[derive(Clone)]
pub struct ProjectService {
    db: DatabaseConnection,
    storage: StorageService,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection, storage: StorageService) -> Self {
        Self { db, storage }
    }

    pub async fn create_project(&self, command: CreateProjectCommand) -> AppResult<ProjectRecord> {
        command.validate()?;
        let slug = command.resolved_slug();
        let date = match command.date.as_deref() {
            Some(raw) => parse_event_date(raw)?,
            None => None,
        };

        self.ensure_slug_free(&self.db, &slug, None).await?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let new_project = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(command.title.clone()),
            slug: Set(slug),
            description: Set(command.description.clone().unwrap_or_default()),
            content: Set(command.content.clone().unwrap_or_default()),
            category_id: Set(command.category_id),
            client: Set(command.client.clone().unwrap_or_default()),
            date: Set(date),
            location: Set(command.location.clone().unwrap_or_default()),
            cover_image: Set(non_blank(command.cover_image.clone())),
            status: Set(command.status.unwrap_or(ProjectStatus::Draft)),
            featured: Set(command.featured.unwrap_or(false)),
            order_index: Set(command.order_index.unwrap_or(0)),
            tags: Set(project::Tags(command.tags.clone().unwrap_or_default())),
            seo_title: Set(non_blank(command.seo_title.clone())),
            seo_description: Set(non_blank(command.seo_description.clone())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = new_project.insert(&txn).await?;

        if let Some(gallery) = command.gallery.as_deref().filter(|g| !g.is_empty()) {
            let urls = self.save_gallery(&txn, created.id, gallery).await?;
            self.apply_cover_fallback(&txn, &created, &urls).await?;
        }

        txn.commit().await?;
        info!("✅ Created project {} ({})", created.slug, created.id);

        self.get_project(created.id).await
    }

    /// Apply a sparse patch, then reconcile the gallery and the cover, atomically.
    pub async fn update_project(
        &self,
        id: Uuid,
        command: UpdateProjectCommand,
    ) -> AppResult<ProjectRecord> {
        command.validate()?;

        let txn = self.db.begin().await?;

        let mut current = Project::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::not_found("Project"))?;

        if !command.is_empty_patch() {
            if let Some(slug) = command.slug.as_deref().filter(|s| *s != current.slug) {
                self.ensure_slug_free(&txn, slug, Some(id)).await?;
            }

            let mut active: project::ActiveModel = current.into();
            command.apply(&mut active)?;
            active.updated_at = Set(Utc::now().into());
            current = active.update(&txn).await?;
            debug!("Patched project {}", id);
        }

        if let Some(gallery) = &command.gallery {
            let urls = self.save_gallery(&txn, id, gallery).await?;
            self.apply_cover_fallback(&txn, &current, &urls).await?;
        }

        txn.commit().await?;
        info!("✅ Saved project {}", id);

        self.get_project(id).await
    }

    pub async fn get_project(&self, id: Uuid) -> AppResult<ProjectRecord> {
        let project = Project::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::not_found("Project"))?;

        let mut records = self.load_records(vec![project]).await?;
        records.pop().ok_or(AppError::not_found("Project"))
    }

    pub async fn list_projects(&self, filters: ProjectFilters) -> AppResult<Vec<ProjectRecord>> {
        let mut query = Project::find();

        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(project::Column::Title))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(project::Column::Description))).like(pattern)),
            );
        }
        if let Some(category_id) = filters.category_id {
            query = query.filter(project::Column::CategoryId.eq(category_id));
        }
        if let Some(status) = filters.status {
            query = query.filter(project::Column::Status.eq(status));
        }

        let projects = query
            .order_by_desc(project::Column::OrderIndex)
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.load_records(projects).await
    }

    pub async fn delete_project(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let media = ProjectMedia::find()
            .filter(project_media::Column::ProjectId.eq(id))
            .all(&txn)
            .await?;
        ProjectMedia::delete_many()
            .filter(project_media::Column::ProjectId.eq(id))
            .exec(&txn)
            .await?;
        let result = Project::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Project"));
        }

        txn.commit().await?;
        info!("🗑️ Deleted project {}", id);

        // Rows are gone already; a stray object is only logged.
        for row in media {
            if let Some(path) = row.path.as_deref().filter(|p| !p.is_empty()) {
                if let Err(e) = self.storage.remove(&row.bucket, path).await {
                    warn!("Could not remove {}/{}: {}", row.bucket, path, e);
                }
            }
        }
        Ok(())
    }

    /// Unknown ids are skipped.
    pub async fn reorder_projects(&self, order: &[(Uuid, i32)]) -> AppResult<()> {
        let txn = self.db.begin().await?;
        for (id, order_index) in order {
            Project::update_many()
                .col_expr(project::Column::OrderIndex, Expr::value(*order_index))
                .filter(project::Column::Id.eq(*id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        debug!("Reordered {} projects", order.len());
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: ProjectStatus) -> AppResult<ProjectRecord> {
        let current = Project::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::not_found("Project"))?;

        if current.status.can_transition_to(status) {
            let mut active: project::ActiveModel = current.into();
            active.status = Set(status);
            active.updated_at = Set(Utc::now().into());
            active.update(&self.db).await?;
            info!("Project {} is now {}", id, status.as_str());
        }

        self.get_project(id).await
    }

    pub async fn published_projects(&self, category_slug: Option<&str>) -> AppResult<Vec<ProjectRecord>> {
        let mut query = Project::find().filter(project::Column::Status.eq(ProjectStatus::Published));

        if let Some(slug) = category_slug.filter(|s| !s.is_empty()) {
            query = query
                .join(JoinType::InnerJoin, project::Relation::Category.def())
                .filter(category::Column::Slug.eq(slug));
        }

        let projects = query
            .order_by_desc(project::Column::OrderIndex)
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.load_records(projects).await
    }

    pub async fn featured_projects(&self) -> AppResult<Vec<ProjectRecord>> {
        let projects = Project::find()
            .filter(project::Column::Status.eq(ProjectStatus::Published))
            .filter(project::Column::Featured.eq(true))
            .order_by_desc(project::Column::OrderIndex)
            .all(&self.db)
            .await?;

        self.load_records(projects).await
    }

    pub async fn published_project_by_slug(&self, slug: &str) -> AppResult<Option<ProjectRecord>> {
        let project = Project::find()
            .filter(project::Column::Slug.eq(slug))
            .filter(project::Column::Status.eq(ProjectStatus::Published))
            .one(&self.db)
            .await?;

        match project {
            Some(project) => Ok(self.load_records(vec![project]).await?.pop()),
            None => Ok(None),
        }
    }

    /// URL a row is served under: storage path first, legacy URL otherwise.
    pub fn media_url(&self, media: &project_media::Model) -> Option<String> {
        match media.path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Some(self.storage.public_url(&media.bucket, path)),
            None => media.url.clone().filter(|u| !u.is_empty()),
        }
    }

    fn desired_urls(&self, item: &DesiredMedia) -> MediaUrls {
        MediaUrls {
            public_url: item.path().map(|path| self.storage.public_url(item.bucket(), path)),
            legacy_url: item.url().map(str::to_string),
        }
    }

    async fn ensure_slug_free<C: ConnectionTrait>(
        &self,
        db: &C,
        slug: &str,
        except: Option<Uuid>,
    ) -> AppResult<()> {
        let mut query = Project::find().filter(project::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(project::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(AppError::Conflict(format!("slug '{}' is already in use", slug)));
        }
        Ok(())
    }

    /// Persist `desired` as the project's gallery. Deletes run first, then updates, then inserts.
    async fn save_gallery<C: ConnectionTrait>(
        &self,
        db: &C,
        project_id: Uuid,
        desired: &[DesiredMedia],
    ) -> AppResult<Vec<MediaUrls>> {
        let existing = ProjectMedia::find()
            .filter(project_media::Column::ProjectId.eq(project_id))
            .order_by_asc(project_media::Column::OrderIndex)
            .order_by_asc(project_media::Column::CreatedAt)
            .all(db)
            .await?;

        let plan = plan_gallery(desired, &existing)?;

        if !plan.deletes.is_empty() {
            ProjectMedia::delete_many()
                .filter(project_media::Column::Id.is_in(plan.deletes.clone()))
                .exec(db)
                .await?;
        }

        for update in &plan.updates {
            let fields = &update.fields;
            project_media::ActiveModel {
                id: Set(update.id),
                media_type: Set(fields.media_type),
                bucket: Set(fields.bucket.clone()),
                path: Set(fields.path.clone()),
                url: Set(fields.url.clone()),
                alt_text: Set(fields.alt_text.clone()),
                order_index: Set(fields.order_index),
                mime: Set(fields.mime.clone()),
                size_bytes: Set(fields.size_bytes),
                ..Default::default()
            }
            .update(db)
            .await?;
        }

        if !plan.inserts.is_empty() {
            let now = Utc::now();
            let rows = plan.inserts.iter().map(|fields| project_media::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project_id),
                media_type: Set(fields.media_type),
                bucket: Set(fields.bucket.clone()),
                path: Set(fields.path.clone()),
                url: Set(fields.url.clone()),
                alt_text: Set(fields.alt_text.clone()),
                order_index: Set(fields.order_index),
                mime: Set(fields.mime.clone()),
                size_bytes: Set(fields.size_bytes),
                created_at: Set(now.into()),
            });
            ProjectMedia::insert_many(rows).exec_without_returning(db).await?;
        }

        debug!(
            "Gallery of {}: {} deleted, {} updated, {} inserted",
            project_id,
            plan.deletes.len(),
            plan.updates.len(),
            plan.inserts.len()
        );

        Ok(desired.iter().map(|item| self.desired_urls(item)).collect())
    }

    async fn apply_cover_fallback<C: ConnectionTrait>(
        &self,
        db: &C,
        project: &project::Model,
        gallery: &[MediaUrls],
    ) -> AppResult<()> {
        if let Some(cover) = resolve_cover(project.cover_image.as_deref(), gallery) {
            Project::update_many()
                .col_expr(project::Column::CoverImage, Expr::value(cover.clone()))
                .filter(project::Column::Id.eq(project.id))
                .exec(db)
                .await?;
            debug!("Cover of {} moved to {}", project.id, cover);
        }
        Ok(())
    }

    async fn load_records(&self, projects: Vec<project::Model>) -> AppResult<Vec<ProjectRecord>> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let category_ids: Vec<Uuid> = projects.iter().filter_map(|p| p.category_id).collect();

        let mut media_by_project: HashMap<Uuid, Vec<project_media::Model>> = HashMap::new();
        for media in ProjectMedia::find()
            .filter(project_media::Column::ProjectId.is_in(project_ids))
            .order_by_asc(project_media::Column::OrderIndex)
            .all(&self.db)
            .await?
        {
            media_by_project.entry(media.project_id).or_default().push(media);
        }

        let categories: HashMap<Uuid, category::Model> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            Category::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(projects
            .into_iter()
            .map(|project| {
                let gallery = media_by_project
                    .remove(&project.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|media| GalleryEntry {
                        url: self.media_url(&media),
                        media,
                    })
                    .collect();
                ProjectRecord {
                    category: project.category_id.and_then(|id| categories.get(&id).cloned()),
                    gallery,
                    project,
                }
            })
            .collect())
    }
}
