use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthenticatedUser, JwtService};

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Attach `Option<AuthenticatedUser>` to every request; invalid tokens count as anonymous.
pub async fn optional_auth_middleware(
    State(jwt_service): State<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = bearer_token(request.headers())
        .and_then(|token| jwt_service.verify_token(token).ok())
        .map(AuthenticatedUser::from);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
