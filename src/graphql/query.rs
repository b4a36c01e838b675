use async_graphql::*;
use uuid::Uuid;

use crate::auth::{require_admin, require_auth};
use crate::graphql::failed;
use crate::graphql::types::{
    ActivityEntry, AdminUser, Category, DashboardStats, Project, ProjectFiltersInput, SiteSettings,
    TeamMember, User,
};
use crate::services::{
    CategoryService, DashboardService, ProjectService, PublicCategory, PublicContentService,
    PublicProject, PublicTeamMember, SettingsService, TeamService, UserService,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self) -> &str {
        "OK"
    }

    /// Current user with role and display name.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let authenticated_user = require_auth(ctx)?;
        let user_service = ctx.data::<UserService>()?;

        let identity = user_service
            .resolve_identity(authenticated_user.id, &authenticated_user.email)
            .await
            .map_err(failed("resolve identity"))?;

        Ok(identity.into())
    }

    // Dashboard queries

    async fn projects(&self, ctx: &Context<'_>, filters: Option<ProjectFiltersInput>) -> Result<Vec<Project>> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let records = project_service
            .list_projects(filters.unwrap_or_default().into())
            .await
            .map_err(failed("fetch projects"))?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn project(&self, ctx: &Context<'_>, id: Uuid) -> Result<Project> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let record = project_service
            .get_project(id)
            .await
            .map_err(failed("fetch project"))?;

        Ok(record.into())
    }

    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<Category>> {
        require_admin(ctx).await?;
        let category_service = ctx.data::<CategoryService>()?;

        let categories = category_service
            .list_categories()
            .await
            .map_err(failed("fetch categories"))?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    async fn active_categories(&self, ctx: &Context<'_>) -> Result<Vec<Category>> {
        require_admin(ctx).await?;
        let category_service = ctx.data::<CategoryService>()?;

        let categories = category_service
            .active_categories()
            .await
            .map_err(failed("fetch categories"))?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    async fn team_members(&self, ctx: &Context<'_>) -> Result<Vec<TeamMember>> {
        require_admin(ctx).await?;
        let team_service = ctx.data::<TeamService>()?;

        let members = team_service
            .list_team_members()
            .await
            .map_err(failed("fetch team members"))?;

        Ok(members.into_iter().map(Into::into).collect())
    }

    async fn team_member(&self, ctx: &Context<'_>, id: Uuid) -> Result<TeamMember> {
        require_admin(ctx).await?;
        let team_service = ctx.data::<TeamService>()?;

        let member = team_service
            .get_team_member(id)
            .await
            .map_err(failed("fetch team member"))?;

        Ok(member.into())
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<AdminUser>> {
        require_admin(ctx).await?;
        let user_service = ctx.data::<UserService>()?;

        let users = user_service
            .list_users()
            .await
            .map_err(failed("fetch users"))?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn site_settings(&self, ctx: &Context<'_>) -> Result<SiteSettings> {
        require_admin(ctx).await?;
        let settings_service = ctx.data::<SettingsService>()?;

        let settings = settings_service
            .get_settings()
            .await
            .map_err(failed("fetch settings"))?;

        Ok(settings.into())
    }

    async fn dashboard_stats(&self, ctx: &Context<'_>) -> Result<DashboardStats> {
        require_admin(ctx).await?;
        let dashboard_service = ctx.data::<DashboardService>()?;

        let stats = dashboard_service
            .stats()
            .await
            .map_err(failed("compute dashboard stats"))?;

        Ok(stats.into())
    }

    async fn recent_activity(&self, ctx: &Context<'_>) -> Result<Vec<ActivityEntry>> {
        require_admin(ctx).await?;
        let dashboard_service = ctx.data::<DashboardService>()?;

        let activity = dashboard_service
            .recent_activity()
            .await
            .map_err(failed("fetch recent activity"))?;

        Ok(activity.into_iter().map(Into::into).collect())
    }

    // Public site queries, no authentication

    async fn published_projects(
        &self,
        ctx: &Context<'_>,
        category_slug: Option<String>,
    ) -> Result<Vec<PublicProject>> {
        let content = ctx.data::<PublicContentService>()?;
        content
            .published_projects(category_slug.as_deref())
            .await
            .map_err(failed("fetch projects"))
    }

    async fn published_project(&self, ctx: &Context<'_>, slug: String) -> Result<Option<PublicProject>> {
        let content = ctx.data::<PublicContentService>()?;
        content
            .project_by_slug(&slug)
            .await
            .map_err(failed("fetch project"))
    }

    async fn featured_projects(&self, ctx: &Context<'_>) -> Result<Vec<PublicProject>> {
        let content = ctx.data::<PublicContentService>()?;
        content
            .featured_projects()
            .await
            .map_err(failed("fetch featured projects"))
    }

    async fn public_categories(&self, ctx: &Context<'_>) -> Result<Vec<PublicCategory>> {
        let content = ctx.data::<PublicContentService>()?;
        content.categories().await.map_err(failed("fetch categories"))
    }

    async fn public_team(&self, ctx: &Context<'_>) -> Result<Vec<PublicTeamMember>> {
        let content = ctx.data::<PublicContentService>()?;
        content.team_members().await.map_err(failed("fetch team"))
    }

    async fn public_settings(&self, ctx: &Context<'_>) -> Result<SiteSettings> {
        let content = ctx.data::<PublicContentService>()?;
        let settings = content.settings().await.map_err(failed("fetch settings"))?;
        Ok(settings.into())
    }
}
