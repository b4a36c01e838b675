//! Service-to-service user management, called with the admin function key.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::bearer_token;
use crate::services::CreateUserCommand;

/// Error body of this endpoint: `{"error": "..."}`.
struct FunctionError(StatusCode, String);

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

fn bad_request(message: &str) -> FunctionError {
    FunctionError(StatusCode::BAD_REQUEST, message.to_string())
}

#[derive(Deserialize)]
struct FunctionRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct CreatePayload {
    #[serde(default)]
    name: String,
    email: String,
    password: String,
    #[serde(default = "default_active")]
    is_active: bool,
}

#[derive(Deserialize)]
struct ResetPayload {
    email: String,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct DeleteParams {
    id: Option<String>,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), FunctionError> {
    let Some(expected) = state.admin_function_key.as_deref() else {
        return Err(FunctionError(StatusCode::UNAUTHORIZED, "Function disabled".into()));
    };
    match bearer_token(headers) {
        Some(token) if token == expected => Ok(()),
        _ => {
            warn!("Rejected admin-users call with missing or wrong key");
            Err(FunctionError(StatusCode::UNAUTHORIZED, "Unauthorized".into()))
        }
    }
}

/// POST /functions/admin-users with `{"type": "create" | "reset_password", "payload": {...}}`.
pub async fn admin_users_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return e.into_response();
    }

    let Ok(request) = serde_json::from_slice::<FunctionRequest>(&body) else {
        return bad_request("Bad request").into_response();
    };

    match request.kind.as_str() {
        "create" => create_user(&state, request.payload).await,
        "reset_password" => send_password_reset(&state, request.payload).await,
        _ => bad_request("Bad request").into_response(),
    }
}

async fn create_user(state: &AppState, payload: Value) -> Response {
    let Ok(payload) = serde_json::from_value::<CreatePayload>(payload) else {
        return bad_request("Bad request").into_response();
    };

    let command = CreateUserCommand {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        is_active: payload.is_active,
    };

    match state.user_service.create_user(command).await {
        Ok(user) => {
            info!("👤 admin-users created {}", user.id);
            Json(json!({
                "user": {
                    "id": user.id,
                    "email": user.email,
                    "name": user.name,
                    "role": user.role,
                    "is_active": user.is_active,
                    "created_at": user.created_at,
                    "updated_at": user.updated_at,
                }
            }))
            .into_response()
        }
        Err(e) => FunctionError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn send_password_reset(state: &AppState, payload: Value) -> Response {
    let Ok(payload) = serde_json::from_value::<ResetPayload>(payload) else {
        return bad_request("Bad request").into_response();
    };
    if payload.email.trim().is_empty() {
        return bad_request("Missing email").into_response();
    }

    match state.user_service.forgot_password(&payload.email).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => FunctionError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// DELETE /functions/admin-users?id=<uuid>
pub async fn admin_users_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return e.into_response();
    }

    let Some(raw_id) = params.id.filter(|id| !id.is_empty()) else {
        return bad_request("Missing id").into_response();
    };
    let Ok(id) = Uuid::parse_str(&raw_id) else {
        return bad_request("Invalid id").into_response();
    };

    match state.user_service.delete_user(id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => FunctionError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn admin_users_method_not_allowed() -> Response {
    FunctionError(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".into()).into_response()
}
