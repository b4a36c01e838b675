use async_graphql::{Context, Error, Result};

use crate::auth::{AuthUser, AuthenticatedUser};
use crate::services::UserService;

/// Authorization guard for checking if user is authenticated
pub fn require_auth<'ctx>(ctx: &'ctx Context<'_>) -> Result<&'ctx AuthenticatedUser> {
    ctx.data::<AuthenticatedUser>()
        .map_err(|_| Error::new("Authentication required"))
}

/// Authorization guard for dashboard operations.
///
/// The role is looked up on every call so a demoted user loses access immediately.
pub async fn require_admin(ctx: &Context<'_>) -> Result<AuthUser> {
    let user = require_auth(ctx)?;
    let user_service = ctx.data::<UserService>()?;

    let identity = user_service
        .resolve_identity(user.id, &user.email)
        .await
        .map_err(|e| Error::new(format!("Identity check failed: {}", e)))?;

    if !identity.role.can_manage_content() {
        return Err(Error::new("Insufficient permissions: admin role required"));
    }

    Ok(identity)
}
