use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string(Categories::Name))
                    .col(string_uniq(Categories::Slug))
                    .col(text_null(Categories::Description))
                    .col(string_len(Categories::Color, 16).default("#C8102E"))
                    .col(boolean(Categories::IsActive).default(true))
                    .col(timestamp_with_time_zone(Categories::CreatedAt))
                    .col(timestamp_with_time_zone(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Deleting a category leaves its projects uncategorised.
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_uuid(Projects::Id))
                    .col(string(Projects::Title))
                    .col(string_uniq(Projects::Slug))
                    .col(text(Projects::Description).default(""))
                    .col(text(Projects::Content).default(""))
                    .col(uuid_null(Projects::CategoryId))
                    .col(string(Projects::Client).default(""))
                    .col(date_null(Projects::Date))
                    .col(string(Projects::Location).default(""))
                    .col(string_null(Projects::CoverImage))
                    .col(string_len(Projects::Status, 16).default("draft"))
                    .col(boolean(Projects::Featured).default(false))
                    .col(integer(Projects::OrderIndex).default(0))
                    .col(json(Projects::Tags))
                    .col(string_len_null(Projects::SeoTitle, 60))
                    .col(string_len_null(Projects::SeoDescription, 160))
                    .col(timestamp_with_time_zone(Projects::CreatedAt))
                    .col(timestamp_with_time_zone(Projects::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_category")
                            .from(Projects::Table, Projects::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_status_order")
                    .table(Projects::Table)
                    .col(Projects::Status)
                    .col(Projects::OrderIndex)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectMedia::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProjectMedia::Id))
                    .col(uuid(ProjectMedia::ProjectId))
                    .col(string_len(ProjectMedia::Type, 16).default("image"))
                    .col(string(ProjectMedia::Bucket))
                    .col(string_null(ProjectMedia::Path))
                    .col(string_null(ProjectMedia::Url))
                    .col(string(ProjectMedia::AltText).default(""))
                    .col(integer(ProjectMedia::OrderIndex).default(0))
                    .col(string_null(ProjectMedia::Mime))
                    .col(big_integer_null(ProjectMedia::SizeBytes))
                    .col(timestamp_with_time_zone(ProjectMedia::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_media_project")
                            .from(ProjectMedia::Table, ProjectMedia::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per stored object within a project.
        manager
            .create_index(
                Index::create()
                    .name("idx_project_media_project_path")
                    .table(ProjectMedia::Table)
                    .col(ProjectMedia::ProjectId)
                    .col(ProjectMedia::Path)
                    .unique()
                    .to_owned(),
            )
            .await?;

        println!("✅ Catalog tables created");
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectMedia::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Color,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Content,
    CategoryId,
    Client,
    Date,
    Location,
    CoverImage,
    Status,
    Featured,
    OrderIndex,
    Tags,
    SeoTitle,
    SeoDescription,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectMedia {
    Table,
    Id,
    ProjectId,
    Type,
    Bucket,
    Path,
    Url,
    AltText,
    OrderIndex,
    Mime,
    SizeBytes,
    CreatedAt,
}
