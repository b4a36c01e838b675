use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{category, prelude::*, project};
use crate::error::{AppError, AppResult};
use crate::services::project::slugify;

pub const DEFAULT_CATEGORY_COLOR: &str = "#C8102E";

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithCount {
    pub category: category::Model,
    pub project_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryWithCount>> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;

        let counts: HashMap<Uuid, i64> = Project::find()
            .select_only()
            .column(project::Column::CategoryId)
            .column_as(project::Column::Id.count(), "project_count")
            .filter(project::Column::CategoryId.is_not_null())
            .group_by(project::Column::CategoryId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithCount {
                project_count: counts.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect())
    }

    pub async fn active_categories(&self) -> AppResult<Vec<category::Model>> {
        Ok(Category::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn create_category(&self, command: CreateCategoryCommand) -> AppResult<category::Model> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("category name is required"));
        }
        let slug = match command.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(name),
        };
        self.ensure_slug_free(&slug, None).await?;

        let now = Utc::now();
        let created = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug),
            description: Set(command.description.filter(|d| !d.trim().is_empty())),
            color: Set(command
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string())),
            is_active: Set(command.is_active.unwrap_or(true)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        info!("Created category {}", created.slug);
        Ok(created)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        command: UpdateCategoryCommand,
    ) -> AppResult<category::Model> {
        let current = Category::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::not_found("Category"))?;

        if let Some(name) = &command.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("category name is required"));
            }
        }
        if let Some(slug) = command.slug.as_deref().filter(|s| *s != current.slug) {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let mut active: category::ActiveModel = current.into();
        if let Some(name) = command.name {
            active.name = Set(name);
        }
        if let Some(slug) = command.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = command.description {
            active.description = Set(description);
        }
        if let Some(color) = command.color {
            active.color = Set(color);
        }
        if let Some(is_active) = command.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Projects in the category keep existing with no category.
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        Project::update_many()
            .col_expr(
                project::Column::CategoryId,
                sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
            )
            .filter(project::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let result = Category::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Category"));
        }

        txn.commit().await?;

        info!("🗑️ Deleted category {}", id);
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        let mut query = Category::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.one(&self.db).await?.is_some() {
            return Err(AppError::Conflict(format!("category slug '{}' is already in use", slug)));
        }
        Ok(())
    }
}
