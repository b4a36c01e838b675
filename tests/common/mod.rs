#![allow(dead_code)]

use cuartorojo::app::AppState;
use cuartorojo::config::{AppConfig, StorageConfig};
use cuartorojo::entities::category;
use cuartorojo::services::{CreateCategoryCommand, CreateUserCommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

pub const FUNCTION_KEY: &str = "test-function-key";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8080/storage";
pub const ADMIN_PASSWORD: &str = "contraseña-segura";

pub struct TestApp {
    pub state: AppState,
    pub db: DatabaseConnection,
    // Keeps the storage directory alive for the duration of the test.
    pub storage_dir: TempDir,
}

pub async fn connect() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite connects");
    Migrator::up(&db, None).await.expect("migrations apply");
    db
}

pub async fn spawn_app() -> TestApp {
    let db = connect().await;
    let storage_dir = tempfile::tempdir().expect("tempdir");

    let config = AppConfig {
        jwt_secret: "integration-secret".to_string(),
        bcrypt_cost: 4,
        storage: StorageConfig::Local {
            root: storage_dir.path().to_path_buf(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
        admin_function_key: Some(FUNCTION_KEY.to_string()),
        ..AppConfig::default()
    };

    let state = AppState::build(&config, db.clone()).await.expect("state builds");
    TestApp { state, db, storage_dir }
}

impl TestApp {
    pub async fn category(&self, name: &str) -> category::Model {
        self.state
            .category_service
            .create_category(CreateCategoryCommand {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("category is created")
    }

    pub async fn admin(&self, email: &str) -> cuartorojo::services::AdminUser {
        self.state
            .user_service
            .create_user(CreateUserCommand {
                name: "Marta Ruiz".to_string(),
                email: email.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                is_active: true,
            })
            .await
            .expect("admin is created")
    }

    pub async fn access_token(&self, email: &str) -> String {
        self.admin(email).await;
        self.state
            .user_service
            .login(email, ADMIN_PASSWORD)
            .await
            .expect("admin logs in")
            .access_token
    }
}
