use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub exp: i64,   // expiration timestamp
    pub iat: i64,   // issued at timestamp
}

/// Identity proven by a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// Authenticated user hydrated with role and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Build from the two independent lookups, applying the defaults for missing rows.
    pub fn hydrate(id: Uuid, email: &str, role: Option<UserRole>, name: Option<String>) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| email.to_string()),
            role: role.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_fall_back_to_defaults() {
        let id = Uuid::new_v4();
        let user = AuthUser::hydrate(id, "ana@cuartorojo.com", None, None);
        assert_eq!(user.role, UserRole::Viewer);
        assert_eq!(user.name, "ana@cuartorojo.com");

        let blank = AuthUser::hydrate(id, "ana@cuartorojo.com", Some(UserRole::Admin), Some("  ".into()));
        assert_eq!(blank.name, "ana@cuartorojo.com");
        assert_eq!(blank.role, UserRole::Admin);
    }
}
