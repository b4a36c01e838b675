use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::auth::{AuthUser, AuthenticatedUser};
use crate::entities::sea_orm_active_enums::MediaType;
use crate::error::{AppError, AppResult};
use crate::storage::{StoredObject, PROJECT_MEDIA_BUCKET, TEAM_AVATARS_BUCKET};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub object: StoredObject,
    pub bucket: &'static str,
    pub media_type: MediaType,
}

async fn require_admin_user(state: &AppState, user: Option<AuthenticatedUser>) -> AppResult<AuthUser> {
    let user = user.ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;
    let identity = state.user_service.resolve_identity(user.id, &user.email).await?;
    if !identity.role.can_manage_content() {
        return Err(AppError::Forbidden("admin role required".into()));
    }
    Ok(identity)
}

async fn store_file(state: &AppState, bucket: &'static str, mut multipart: Multipart) -> AppResult<UploadResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.to_string()))?;

        let object = state
            .storage
            .upload(bucket, &file_name, content_type.as_deref(), bytes)
            .await?;

        return Ok(UploadResponse {
            media_type: MediaType::from_mime(&object.mime),
            object,
            bucket,
        });
    }

    Err(AppError::validation("Missing required 'file' field"))
}

/// POST /admin/media
///
/// Stores one gallery file and returns the path to reference in a project save.
pub async fn upload_project_media(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let admin = require_admin_user(&state, user).await?;
    let response = store_file(&state, PROJECT_MEDIA_BUCKET, multipart).await?;
    info!("⬆️ {} uploaded {}", admin.email, response.object.path);
    Ok(Json(response))
}

/// POST /admin/avatars
pub async fn upload_team_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let admin = require_admin_user(&state, user).await?;
    let response = store_file(&state, TEAM_AVATARS_BUCKET, multipart).await?;
    info!("⬆️ {} uploaded avatar {}", admin.email, response.object.path);
    Ok(Json(response))
}
