use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use crate::entities::{prelude::*, team_member};
use crate::error::{AppError, AppResult};

fn blank_to_null(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct TeamMemberInput {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub social_instagram: Option<String>,
    pub social_linkedin: Option<String>,
    pub social_behance: Option<String>,
    pub order_index: Option<i32>,
}

/// Sparse patch; `Some(None)` or a blank string clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub social_instagram: Option<Option<String>>,
    pub social_linkedin: Option<Option<String>>,
    pub social_behance: Option<Option<String>>,
    pub order_index: Option<i32>,
}

#[derive(Clone)]
pub struct TeamService {
    db: DatabaseConnection,
}

impl TeamService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_team_members(&self) -> AppResult<Vec<team_member::Model>> {
        Ok(TeamMember::find()
            .order_by_asc(team_member::Column::OrderIndex)
            .order_by_asc(team_member::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_team_member(&self, id: Uuid) -> AppResult<team_member::Model> {
        TeamMember::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::not_found("Team member"))
    }

    pub async fn create_team_member(&self, input: TeamMemberInput) -> AppResult<team_member::Model> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }

        let now = Utc::now();
        let member = team_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            role: Set(input.role),
            bio: Set(blank_to_null(input.bio)),
            avatar: Set(blank_to_null(input.avatar)),
            social_instagram: Set(blank_to_null(input.social_instagram)),
            social_linkedin: Set(blank_to_null(input.social_linkedin)),
            social_behance: Set(blank_to_null(input.social_behance)),
            order_index: Set(input.order_index.unwrap_or(0)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        info!("Added team member {}", member.id);
        Ok(member)
    }

    pub async fn update_team_member(
        &self,
        id: Uuid,
        patch: TeamMemberPatch,
    ) -> AppResult<team_member::Model> {
        let current = self.get_team_member(id).await?;
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("name is required"));
        }

        let mut active: team_member::ActiveModel = current.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(role) = patch.role {
            active.role = Set(role);
        }
        if let Some(bio) = patch.bio {
            active.bio = Set(blank_to_null(bio));
        }
        if let Some(avatar) = patch.avatar {
            active.avatar = Set(blank_to_null(avatar));
        }
        if let Some(instagram) = patch.social_instagram {
            active.social_instagram = Set(blank_to_null(instagram));
        }
        if let Some(linkedin) = patch.social_linkedin {
            active.social_linkedin = Set(blank_to_null(linkedin));
        }
        if let Some(behance) = patch.social_behance {
            active.social_behance = Set(blank_to_null(behance));
        }
        if let Some(order_index) = patch.order_index {
            active.order_index = Set(order_index);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_team_member(&self, id: Uuid) -> AppResult<()> {
        let result = TeamMember::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Team member"));
        }
        info!("🗑️ Removed team member {}", id);
        Ok(())
    }
}
