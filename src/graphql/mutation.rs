use async_graphql::*;
use uuid::Uuid;

use crate::auth::{require_admin, require_auth};
use crate::entities::sea_orm_active_enums::ProjectStatus;
use crate::graphql::failed;
use crate::graphql::types::{
    AdminUser, AuthPayload, Category, ContactInput, CreateCategoryInput, CreateProjectInput,
    CreateTeamMemberInput, CreateUserInput, ForgotPasswordInput, LoginInput, MessageResponse,
    Project, RefreshTokenInput, ReorderProjectInput, ResetPasswordInput, SiteSettings,
    SiteSettingsInput, TeamMember, UpdateCategoryInput, UpdateProjectInput, UpdateTeamMemberInput,
    UpdateUserInput,
};
use crate::services::{
    CategoryService, ProjectService, PublicContentService, SettingsService, TeamService,
    UserService,
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let user_service = ctx.data::<UserService>()?;

        let payload = user_service
            .login(&input.email, &input.password)
            .await
            .map_err(failed("authenticate"))?;

        Ok(payload.into())
    }

    async fn refresh_token(&self, ctx: &Context<'_>, input: RefreshTokenInput) -> Result<AuthPayload> {
        let user_service = ctx.data::<UserService>()?;

        let payload = user_service
            .refresh(&input.refresh_token)
            .await
            .map_err(failed("refresh token"))?;

        Ok(payload.into())
    }

    async fn logout(&self, ctx: &Context<'_>) -> Result<MessageResponse> {
        let user = require_auth(ctx)?;
        let user_service = ctx.data::<UserService>()?;

        user_service
            .logout(user.id)
            .await
            .map_err(failed("log out"))?;

        Ok(MessageResponse::new("Logged out"))
    }

    async fn forgot_password(&self, ctx: &Context<'_>, input: ForgotPasswordInput) -> Result<MessageResponse> {
        let user_service = ctx.data::<UserService>()?;

        user_service
            .forgot_password(&input.email)
            .await
            .map_err(failed("request password reset"))?;

        Ok(MessageResponse::new(
            "If the email is registered, a reset link has been sent",
        ))
    }

    async fn reset_password(&self, ctx: &Context<'_>, input: ResetPasswordInput) -> Result<MessageResponse> {
        let user_service = ctx.data::<UserService>()?;

        user_service
            .reset_password(&input.token, &input.new_password)
            .await
            .map_err(failed("reset password"))?;

        Ok(MessageResponse::new("Password updated"))
    }

    // Projects

    async fn create_project(&self, ctx: &Context<'_>, input: CreateProjectInput) -> Result<Project> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let record = project_service
            .create_project(input.into())
            .await
            .map_err(failed("create project"))?;

        Ok(record.into())
    }

    async fn update_project(&self, ctx: &Context<'_>, id: Uuid, input: UpdateProjectInput) -> Result<Project> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let record = project_service
            .update_project(id, input.into())
            .await
            .map_err(failed("update project"))?;

        Ok(record.into())
    }

    async fn delete_project(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        project_service
            .delete_project(id)
            .await
            .map_err(failed("delete project"))?;

        Ok(true)
    }

    async fn reorder_projects(&self, ctx: &Context<'_>, items: Vec<ReorderProjectInput>) -> Result<bool> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let order: Vec<(Uuid, i32)> = items.into_iter().map(|i| (i.id, i.order_index)).collect();
        project_service
            .reorder_projects(&order)
            .await
            .map_err(failed("reorder projects"))?;

        Ok(true)
    }

    async fn set_project_status(&self, ctx: &Context<'_>, id: Uuid, status: ProjectStatus) -> Result<Project> {
        require_admin(ctx).await?;
        let project_service = ctx.data::<ProjectService>()?;

        let record = project_service
            .set_status(id, status)
            .await
            .map_err(failed("change project status"))?;

        Ok(record.into())
    }

    // Categories

    async fn create_category(&self, ctx: &Context<'_>, input: CreateCategoryInput) -> Result<Category> {
        require_admin(ctx).await?;
        let category_service = ctx.data::<CategoryService>()?;

        let category = category_service
            .create_category(input.into())
            .await
            .map_err(failed("create category"))?;

        Ok(category.into())
    }

    async fn update_category(&self, ctx: &Context<'_>, id: Uuid, input: UpdateCategoryInput) -> Result<Category> {
        require_admin(ctx).await?;
        let category_service = ctx.data::<CategoryService>()?;

        category_service
            .update_category(id, input.into())
            .await
            .map_err(failed("update category"))?;

        let category = category_service
            .list_categories()
            .await
            .map_err(failed("fetch category"))?
            .into_iter()
            .find(|c| c.category.id == id)
            .ok_or_else(|| Error::new("Category not found"))?;

        Ok(category.into())
    }

    async fn delete_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let category_service = ctx.data::<CategoryService>()?;

        category_service
            .delete_category(id)
            .await
            .map_err(failed("delete category"))?;

        Ok(true)
    }

    // Team

    async fn create_team_member(&self, ctx: &Context<'_>, input: CreateTeamMemberInput) -> Result<TeamMember> {
        require_admin(ctx).await?;
        let team_service = ctx.data::<TeamService>()?;

        let member = team_service
            .create_team_member(input.into())
            .await
            .map_err(failed("create team member"))?;

        Ok(member.into())
    }

    async fn update_team_member(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateTeamMemberInput,
    ) -> Result<TeamMember> {
        require_admin(ctx).await?;
        let team_service = ctx.data::<TeamService>()?;

        let member = team_service
            .update_team_member(id, input.into())
            .await
            .map_err(failed("update team member"))?;

        Ok(member.into())
    }

    async fn delete_team_member(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let team_service = ctx.data::<TeamService>()?;

        team_service
            .delete_team_member(id)
            .await
            .map_err(failed("delete team member"))?;

        Ok(true)
    }

    // Users

    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<AdminUser> {
        require_admin(ctx).await?;
        let user_service = ctx.data::<UserService>()?;

        let user = user_service
            .create_user(input.into())
            .await
            .map_err(failed("create user"))?;

        Ok(user.into())
    }

    async fn update_user(&self, ctx: &Context<'_>, id: Uuid, input: UpdateUserInput) -> Result<AdminUser> {
        require_admin(ctx).await?;
        let user_service = ctx.data::<UserService>()?;

        let user = user_service
            .update_user(id, input.into())
            .await
            .map_err(failed("update user"))?;

        Ok(user.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let admin = require_admin(ctx).await?;
        if admin.id == id {
            return Err(Error::new("You cannot delete your own account"));
        }
        let user_service = ctx.data::<UserService>()?;

        user_service
            .delete_user(id)
            .await
            .map_err(failed("delete user"))?;

        Ok(true)
    }

    /// Send the password reset email to another user.
    async fn send_password_reset(&self, ctx: &Context<'_>, input: ForgotPasswordInput) -> Result<MessageResponse> {
        require_admin(ctx).await?;
        let user_service = ctx.data::<UserService>()?;

        user_service
            .forgot_password(&input.email)
            .await
            .map_err(failed("send password reset"))?;

        Ok(MessageResponse::new("Password reset email sent"))
    }

    // Settings

    async fn save_site_settings(&self, ctx: &Context<'_>, input: SiteSettingsInput) -> Result<SiteSettings> {
        require_admin(ctx).await?;
        let settings_service = ctx.data::<SettingsService>()?;

        let settings = settings_service
            .save_settings(input.into_values())
            .await
            .map_err(failed("save settings"))?;

        Ok(settings.into())
    }

    // Public

    async fn submit_contact(&self, ctx: &Context<'_>, input: ContactInput) -> Result<MessageResponse> {
        let content = ctx.data::<PublicContentService>()?;

        content
            .submit_contact(input.into())
            .await
            .map_err(failed("send message"))?;

        Ok(MessageResponse::new("Mensaje enviado"))
    }
}
