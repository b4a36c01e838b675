use std::collections::HashMap;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthUser, JwtService};
use crate::entities::sea_orm_active_enums::UserRole;
use crate::entities::{prelude::*, profile, user, user_role};
use crate::error::{AppError, AppResult};
use crate::services::EmailService;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const RESET_TOKEN_HOURS: i64 = 1;

#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Row of the admin users list: identity joined with profile and role.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserCommand {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("a valid email is required")),
    }
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    jwt_service: JwtService,
    email_service: EmailService,
    frontend_url: String,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        email_service: EmailService,
        frontend_url: String,
    ) -> Self {
        Self {
            db,
            jwt_service,
            email_service,
            frontend_url,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthPayload> {
        let email = email.trim().to_lowercase();
        let user = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?;

        let user = match user {
            Some(user) if verify(password, &user.password_hash)? => user,
            _ => {
                warn!("Failed login for {}", email);
                return Err(AppError::Unauthorized("Invalid credentials".into()));
            }
        };
        if !user.is_active {
            warn!("Login refused for inactive user {}", user.id);
            return Err(AppError::Unauthorized("Account is disabled".into()));
        }

        let mut active: user::ActiveModel = user.clone().into();
        active.last_login_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;

        self.issue_tokens(&user).await
    }

    /// Exchange a refresh token for a new token pair; the old refresh token stops working.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthPayload> {
        let user = User::find()
            .filter(user::Column::RefreshToken.eq(refresh_token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        let expired = user
            .refresh_token_expires_at
            .is_none_or(|expires_at| expires_at < Utc::now());
        if expired || !user.is_active {
            return Err(AppError::Unauthorized("Refresh token expired".into()));
        }

        self.issue_tokens(&user).await
    }

    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        User::update(user::ActiveModel {
            id: Set(user_id),
            refresh_token: Set(None),
            refresh_token_expires_at: Set(None),
            ..Default::default()
        })
        .exec(&self.db)
        .await?;
        Ok(())
    }

    /// Unknown emails succeed without sending anything.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let Some(user) = User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?
        else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = Uuid::new_v4().simple().to_string();
        let mut active: user::ActiveModel = user.into();
        active.password_reset_token = Set(Some(token.clone()));
        active.password_reset_expires_at = Set(Some((Utc::now() + Duration::hours(RESET_TOKEN_HOURS)).into()));
        active.update(&self.db).await?;

        self.email_service
            .send_password_reset_email(&email, &token, &self.frontend_url)
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        check_password(new_password)?;

        let user = User::find()
            .filter(user::Column::PasswordResetToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::validation("invalid or expired reset token"))?;

        if user
            .password_reset_expires_at
            .is_none_or(|expires_at| expires_at < Utc::now())
        {
            return Err(AppError::validation("invalid or expired reset token"));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash(new_password, self.bcrypt_cost)?);
        active.password_reset_token = Set(None);
        active.password_reset_expires_at = Set(None);
        active.refresh_token = Set(None);
        active.refresh_token_expires_at = Set(None);
        active.updated_at = Set(Utc::now().into());
        let user = active.update(&self.db).await?;

        info!("Password reset for user {}", user.id);
        Ok(())
    }

    /// Hydrate a user with role and display name.
    ///
    /// The two lookups run concurrently and are independent: a missing row or a failed
    /// lookup falls back to the default for that field only.
    pub async fn resolve_identity(&self, user_id: Uuid, email: &str) -> AppResult<AuthUser> {
        let (role, profile) = tokio::join!(
            UserRoleAssignment::find_by_id(user_id).one(&self.db),
            Profile::find_by_id(user_id).one(&self.db),
        );

        let role = role
            .inspect_err(|e| warn!("Role lookup failed for {}: {}", user_id, e))
            .ok()
            .flatten()
            .map(|r| r.role);
        let name = profile
            .inspect_err(|e| warn!("Profile lookup failed for {}: {}", user_id, e))
            .ok()
            .flatten()
            .map(|p| p.name);

        Ok(AuthUser::hydrate(user_id, email, role, name))
    }

    pub async fn list_users(&self) -> AppResult<Vec<AdminUser>> {
        let users = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let names: HashMap<Uuid, String> = Profile::find()
            .filter(profile::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let roles: HashMap<Uuid, UserRole> = UserRoleAssignment::find()
            .filter(user_role::Column::UserId.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.user_id, r.role))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let identity = AuthUser::hydrate(
                    user.id,
                    &user.email,
                    roles.get(&user.id).copied(),
                    names.get(&user.id).cloned(),
                );
                AdminUser {
                    id: user.id,
                    email: user.email,
                    name: identity.name,
                    role: identity.role,
                    is_active: user.is_active,
                    last_login_at: user.last_login_at,
                    created_at: user.created_at,
                    updated_at: user.updated_at,
                }
            })
            .collect())
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<AdminUser> {
        self.list_users()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(AppError::not_found("User"))
    }

    /// Create the identity, upsert its profile with the display name and grant the admin role.
    pub async fn create_user(&self, command: CreateUserCommand) -> AppResult<AdminUser> {
        let email = normalize_email(&command.email)?;
        check_password(&command.password)?;

        if User::find()
            .filter(user::Column::Email.eq(&email))
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User with this email already exists".into()));
        }

        let password_hash = hash(&command.password, self.bcrypt_cost)?;
        let name = match command.name.trim() {
            "" => email.clone(),
            name => name.to_string(),
        };

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            is_active: Set(command.is_active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        upsert_profile(&txn, created.id, &name).await?;
        upsert_role(&txn, created.id, UserRole::Admin).await?;

        txn.commit().await?;
        info!("👤 Created admin user {}", created.id);

        self.get_user(created.id).await
    }

    pub async fn update_user(&self, id: Uuid, command: UpdateUserCommand) -> AppResult<AdminUser> {
        let user = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::not_found("User"))?;

        let txn = self.db.begin().await?;

        if let Some(name) = command.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            upsert_profile(&txn, id, name).await?;
        }
        if let Some(role) = command.role {
            upsert_role(&txn, id, role).await?;
        }
        if let Some(is_active) = command.is_active {
            let mut active: user::ActiveModel = user.into();
            active.is_active = Set(is_active);
            if !is_active {
                active.refresh_token = Set(None);
                active.refresh_token_expires_at = Set(None);
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        txn.commit().await?;
        info!("Updated user {}", id);

        self.get_user(id).await
    }

    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        UserRoleAssignment::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        Profile::delete_by_id(id).exec(&txn).await?;
        let result = User::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("User"));
        }

        txn.commit().await?;
        info!("🗑️ Deleted user {}", id);
        Ok(())
    }

    async fn issue_tokens(&self, user: &user::Model) -> AppResult<AuthPayload> {
        let access_token = self.jwt_service.generate_token(user.id, &user.email)?;
        let (refresh_token, expires_at) = self.jwt_service.generate_refresh_token();

        User::update(user::ActiveModel {
            id: Set(user.id),
            refresh_token: Set(Some(refresh_token.clone())),
            refresh_token_expires_at: Set(Some(expires_at.into())),
            ..Default::default()
        })
        .exec(&self.db)
        .await?;

        let identity = self.resolve_identity(user.id, &user.email).await?;

        Ok(AuthPayload {
            access_token,
            refresh_token,
            user: identity,
        })
    }
}

async fn upsert_profile<C: ConnectionTrait>(db: &C, user_id: Uuid, name: &str) -> AppResult<()> {
    Profile::insert(profile::ActiveModel {
        id: Set(user_id),
        name: Set(name.to_string()),
        updated_at: Set(Utc::now().into()),
    })
    .on_conflict(
        OnConflict::column(profile::Column::Id)
            .update_columns([profile::Column::Name, profile::Column::UpdatedAt])
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

async fn upsert_role<C: ConnectionTrait>(db: &C, user_id: Uuid, role: UserRole) -> AppResult<()> {
    UserRoleAssignment::insert(user_role::ActiveModel {
        user_id: Set(user_id),
        role: Set(role),
    })
    .on_conflict(
        OnConflict::column(user_role::Column::UserId)
            .update_column(user_role::Column::Role)
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}
