//! Typed GraphQL client used by the dashboard.

pub mod session;

pub use session::{HydrationTicket, IdentityLookup, Session, SessionState, SessionTracker};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

impl GraphQLError {
    fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }

    fn into_app_error(self) -> AppError {
        let unauthorized = self.code() == Some("UNAUTHORIZED")
            || self.message.contains("Authentication required");
        if unauthorized {
            AppError::Unauthorized(self.message)
        } else {
            AppError::Internal(self.message)
        }
    }
}

#[derive(Deserialize)]
struct GraphQLBody<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub session: Session,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct DashboardClient {
    http: Client,
    graphql_url: String,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            graphql_url: format!("{}/graphql", base_url.trim_end_matches('/')),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        access_token: Option<&str>,
    ) -> AppResult<T> {
        let mut request = self
            .http
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let body: GraphQLBody<T> = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("invalid response: {}", e)))?;

        if let Some(error) = body.errors.into_iter().next() {
            debug!("GraphQL error: {}", error.message);
            return Err(error.into_app_error());
        }
        body.data
            .ok_or_else(|| AppError::Internal("response carried no data".into()))
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct LoginUser {
            id: Uuid,
            email: String,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            access_token: String,
            refresh_token: String,
            user: LoginUser,
        }
        #[derive(Deserialize)]
        struct Data {
            login: Payload,
        }

        let data: Data = self
            .execute(
                "mutation Login($input: LoginInput!) { login(input: $input) { accessToken refreshToken user { id email } } }",
                json!({ "input": { "email": email, "password": password } }),
                None,
            )
            .await?;

        Ok(LoginResult {
            session: Session {
                user_id: data.login.user.id,
                email: data.login.user.email,
                access_token: data.login.access_token,
            },
            refresh_token: data.login.refresh_token,
        })
    }

    pub async fn logout(&self, session: &Session) -> AppResult<()> {
        let _: Value = self
            .execute("mutation { logout { message } }", json!({}), Some(&session.access_token))
            .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct MeData<T> {
    me: T,
}

impl IdentityLookup for DashboardClient {
    async fn role(&self, session: &Session) -> AppResult<Option<UserRole>> {
        #[derive(Deserialize)]
        struct Me {
            role: String,
        }
        let data: MeData<Me> = self
            .execute("query { me { role } }", json!({}), Some(&session.access_token))
            .await?;

        Ok(match data.me.role.as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "VIEWER" => Some(UserRole::Viewer),
            _ => None,
        })
    }

    async fn profile_name(&self, session: &Session) -> AppResult<Option<String>> {
        #[derive(Deserialize)]
        struct Me {
            name: String,
        }
        let data: MeData<Me> = self
            .execute("query { me { name } }", json!({}), Some(&session.access_token))
            .await?;

        Ok(Some(data.me.name))
    }
}
