pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_identity_tables;
mod m20250901_000002_create_catalog_tables;
mod m20250901_000003_create_site_tables;
mod m20250901_000004_seed_admin_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_identity_tables::Migration),
            Box::new(m20250901_000002_create_catalog_tables::Migration),
            Box::new(m20250901_000003_create_site_tables::Migration),
            Box::new(m20250901_000004_seed_admin_user::Migration),
        ]
    }
}
