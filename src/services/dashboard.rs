use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::ProjectStatus;
use crate::entities::{prelude::*, project};
use crate::error::AppResult;

const RECENT_ACTIVITY_LIMIT: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub published_projects: u64,
    pub draft_projects: u64,
    pub featured_projects: u64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_name: String,
    pub action: String,
    pub project_title: String,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Clone)]
pub struct DashboardService {
    db: DatabaseConnection,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let total_projects = Project::find().count(&self.db).await?;
        let published_projects = Project::find()
            .filter(project::Column::Status.eq(ProjectStatus::Published))
            .count(&self.db)
            .await?;
        let draft_projects = Project::find()
            .filter(project::Column::Status.eq(ProjectStatus::Draft))
            .count(&self.db)
            .await?;
        let featured_projects = Project::find()
            .filter(project::Column::Featured.eq(true))
            .count(&self.db)
            .await?;

        Ok(DashboardStats {
            total_projects,
            published_projects,
            draft_projects,
            featured_projects,
            last_updated: Utc::now(),
        })
    }

    /// Latest project edits; there is no separate activity log.
    pub async fn recent_activity(&self) -> AppResult<Vec<ActivityEntry>> {
        let projects = Project::find()
            .order_by_desc(project::Column::UpdatedAt)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(&self.db)
            .await?;

        Ok(projects
            .into_iter()
            .map(|project| ActivityEntry {
                id: project.id,
                user_name: "System".to_string(),
                action: "Updated project".to_string(),
                project_title: project.title,
                timestamp: project.updated_at,
            })
            .collect())
    }
}
