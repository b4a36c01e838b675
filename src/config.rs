use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{AppError, AppResult};

const INSECURE_JWT_SECRET: &str = "default-secret-change-in-production";

#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Local {
        root: PathBuf,
        public_base_url: String,
    },
    Remote {
        base_url: String,
        service_key: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentConfig {
    Database,
    Fixtures(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub refresh_token_days: i64,
    pub bcrypt_cost: u32,
    pub resend_api_key: String,
    pub from_email: String,
    pub contact_inbox: String,
    pub cors_origins: String,
    pub frontend_url: String,
    pub storage: StorageConfig,
    pub max_upload_bytes: usize,
    /// Bearer key accepted by `/functions/admin-users`; `None` disables the endpoint.
    pub admin_function_key: Option<String>,
    pub content: ContentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: INSECURE_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            refresh_token_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            resend_api_key: String::new(),
            from_email: "noreply@cuartorojo.com".to_string(),
            contact_inbox: "hola@cuartorojo.com".to_string(),
            cors_origins: "http://localhost:8080,http://localhost:5173".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            storage: StorageConfig::Local {
                root: PathBuf::from("./storage"),
                public_base_url: "http://127.0.0.1:8080/storage".to_string(),
            },
            max_upload_bytes: crate::storage::MAX_UPLOAD_BYTES,
            admin_function_key: None,
            content: ContentConfig::Database,
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match var(name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", name, raw);
            default
        }),
        None => default,
    }
}

impl AppConfig {
    /// Read the configuration from the environment (after `.env` is loaded).
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| AppError::Internal("DATABASE_URL must be set".into()))?;

        // Railway uses RAILWAY_ENVIRONMENT_NAME, fallback to ENVIRONMENT
        let environment = var("RAILWAY_ENVIRONMENT_NAME")
            .or_else(|| var("ENVIRONMENT"))
            .unwrap_or(defaults.environment);

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using default (not secure for production)");
            defaults.jwt_secret
        });
        let resend_api_key = var("RESEND_API_KEY").unwrap_or_else(|| {
            warn!("RESEND_API_KEY not set, emails will only be logged");
            defaults.resend_api_key
        });

        let host = var("HOST").unwrap_or(defaults.host);
        let port = parse_var("PORT", defaults.port);

        let storage = match var("STORAGE_BACKEND").as_deref() {
            Some("remote") => StorageConfig::Remote {
                base_url: var("STORAGE_REMOTE_URL").ok_or_else(|| {
                    AppError::Internal("STORAGE_REMOTE_URL must be set for remote storage".into())
                })?,
                service_key: var("STORAGE_SERVICE_KEY").ok_or_else(|| {
                    AppError::Internal("STORAGE_SERVICE_KEY must be set for remote storage".into())
                })?,
            },
            Some("local") | None => StorageConfig::Local {
                root: var("STORAGE_ROOT").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./storage")),
                public_base_url: var("STORAGE_PUBLIC_URL")
                    .unwrap_or_else(|| format!("http://{}:{}/storage", host, port)),
            },
            Some(other) => {
                return Err(AppError::Internal(format!("unknown STORAGE_BACKEND '{}'", other)));
            }
        };

        let admin_function_key = var("ADMIN_FUNCTION_KEY");
        if admin_function_key.is_none() {
            warn!("ADMIN_FUNCTION_KEY not set, /functions/admin-users is disabled");
        }

        let content = match var("CONTENT_SOURCE").as_deref() {
            Some("fixtures") => ContentConfig::Fixtures(
                var("CONTENT_FIXTURES")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("fixtures/content.json")),
            ),
            _ => ContentConfig::Database,
        };

        Ok(Self {
            database_url,
            environment,
            host,
            port,
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", defaults.jwt_expiration_hours),
            refresh_token_days: parse_var("REFRESH_TOKEN_DAYS", defaults.refresh_token_days),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost),
            resend_api_key,
            from_email: var("FROM_EMAIL").unwrap_or(defaults.from_email),
            contact_inbox: var("CONTACT_INBOX").unwrap_or(defaults.contact_inbox),
            cors_origins: var("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_origins),
            frontend_url: var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            storage,
            max_upload_bytes: defaults.max_upload_bytes,
            admin_function_key,
            content,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_development() {
        let config = AppConfig::default();
        assert!(config.is_development());
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.content, ContentConfig::Database);
        assert!(config.admin_function_key.is_none());
        assert!(matches!(config.storage, StorageConfig::Local { .. }));
    }
}
