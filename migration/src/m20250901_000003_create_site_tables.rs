use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(pk_uuid(TeamMembers::Id))
                    .col(string(TeamMembers::Name))
                    .col(string(TeamMembers::Role))
                    .col(text_null(TeamMembers::Bio))
                    .col(string_null(TeamMembers::Avatar))
                    .col(string_null(TeamMembers::SocialInstagram))
                    .col(string_null(TeamMembers::SocialLinkedin))
                    .col(string_null(TeamMembers::SocialBehance))
                    .col(integer(TeamMembers::OrderIndex).default(0))
                    .col(timestamp_with_time_zone(TeamMembers::CreatedAt))
                    .col(timestamp_with_time_zone(TeamMembers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SiteSettings::Table)
                    .if_not_exists()
                    .col(string(SiteSettings::Key).primary_key())
                    .col(text(SiteSettings::Value))
                    .col(timestamp_with_time_zone(SiteSettings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        println!("✅ Site tables created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TeamMembers {
    Table,
    Id,
    Name,
    Role,
    Bio,
    Avatar,
    SocialInstagram,
    SocialLinkedin,
    SocialBehance,
    OrderIndex,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SiteSettings {
    Table,
    Key,
    Value,
    UpdatedAt,
}
