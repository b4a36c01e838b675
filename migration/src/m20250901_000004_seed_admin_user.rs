use bcrypt::{hash, DEFAULT_COST};
use chrono::Utc;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use std::env;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Only seed an admin when credentials are provided
        let admin_email = match env::var("ADMIN_EMAIL") {
            Ok(email) if !email.trim().is_empty() => email.trim().to_lowercase(),
            _ => {
                println!("⚠️  ADMIN_EMAIL not set, skipping admin user creation");
                return Ok(());
            }
        };

        let admin_password = match env::var("ADMIN_PASSWORD") {
            Ok(password) if !password.is_empty() => password,
            _ => {
                println!("⚠️  ADMIN_PASSWORD not set, skipping admin user creation");
                return Ok(());
            }
        };

        let admin_name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrador".to_string());

        println!("🌱 Seeding admin user: {}", admin_email);

        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        let lookup = Query::select()
            .column(Users::Id)
            .from(Users::Table)
            .and_where(Expr::col(Users::Email).eq(admin_email.as_str()))
            .to_owned();
        let existing = db.query_one(backend.build(&lookup)).await?;

        if existing.is_some() {
            println!("✅ Admin user already exists, skipping creation");
            return Ok(());
        }

        let password_hash = hash(&admin_password, DEFAULT_COST)
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {}", e)))?;

        let id = Uuid::new_v4();
        let now = Utc::now().fixed_offset();

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Users::Table)
                    .columns([
                        Users::Id,
                        Users::Email,
                        Users::PasswordHash,
                        Users::IsActive,
                        Users::CreatedAt,
                        Users::UpdatedAt,
                    ])
                    .values_panic([
                        id.into(),
                        admin_email.clone().into(),
                        password_hash.into(),
                        true.into(),
                        now.into(),
                        now.into(),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Profiles::Table)
                    .columns([Profiles::Id, Profiles::Name, Profiles::UpdatedAt])
                    .values_panic([id.into(), admin_name.into(), now.into()])
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(UserRoles::Table)
                    .columns([UserRoles::UserId, UserRoles::Role])
                    .values_panic([id.into(), "admin".into()])
                    .to_owned(),
            )
            .await?;

        println!("✅ Admin user created successfully: {}", admin_email);
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let admin_email = match env::var("ADMIN_EMAIL") {
            Ok(email) => email.trim().to_lowercase(),
            Err(_) => {
                println!("⚠️  ADMIN_EMAIL not set, cannot remove admin user");
                return Ok(());
            }
        };

        // Profile and role rows cascade with the user.
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Users::Table)
                    .and_where(Expr::col(Users::Email).eq(admin_email.as_str()))
                    .to_owned(),
            )
            .await?;

        println!("🗑️  Admin user removed: {}", admin_email);
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Name,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    UserId,
    Role,
}
