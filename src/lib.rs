pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod media;
pub mod services;
pub mod storage;

pub use app::{build_router, AppState};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
