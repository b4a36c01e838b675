use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{optional_auth_middleware, AuthenticatedUser, JwtService};
use crate::config::{AppConfig, ContentConfig, StorageConfig};
use crate::error::AppResult;
use crate::graphql::{create_schema, ApiSchema};
use crate::handlers;
use crate::services::{
    CategoryService, ContentFixtures, ContentSource, DashboardService, EmailService,
    ProjectService, PublicContentService, SettingsService, TeamService, UserService,
};
use crate::storage::{LocalStorage, RemoteStorage, StorageBackend, StorageService};

#[derive(Clone)]
pub struct AppState {
    pub schema: ApiSchema,
    pub db: DatabaseConnection,
    pub jwt_service: JwtService,
    pub storage: StorageService,
    pub user_service: UserService,
    pub project_service: ProjectService,
    pub category_service: CategoryService,
    pub team_service: TeamService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
    pub public_content: PublicContentService,
    pub admin_function_key: Option<String>,
    pub is_development: bool,
}

impl AppState {
    pub async fn build(config: &AppConfig, db: DatabaseConnection) -> AppResult<Self> {
        let storage = match &config.storage {
            StorageConfig::Local { root, public_base_url } => {
                info!("📁 Local storage at {}", root.display());
                StorageBackend::Local(LocalStorage::new(root, public_base_url))
            }
            StorageConfig::Remote { base_url, service_key } => {
                info!("☁️ Remote storage at {}", base_url);
                StorageBackend::Remote(RemoteStorage::new(base_url, service_key))
            }
        };
        let storage = StorageService::new(storage).with_max_upload_bytes(config.max_upload_bytes);

        let jwt_service = JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.refresh_token_days,
        );
        let email_service = EmailService::new(
            &config.resend_api_key,
            config.from_email.clone(),
            config.contact_inbox.clone(),
        );
        let user_service = UserService::new(
            db.clone(),
            jwt_service.clone(),
            email_service.clone(),
            config.frontend_url.clone(),
        )
        .with_bcrypt_cost(config.bcrypt_cost);
        let project_service = ProjectService::new(db.clone(), storage.clone());
        let category_service = CategoryService::new(db.clone());
        let team_service = TeamService::new(db.clone());
        let settings_service = SettingsService::new(db.clone());
        let dashboard_service = DashboardService::new(db.clone());

        let source = match &config.content {
            ContentConfig::Database => ContentSource::Database {
                projects: project_service.clone(),
                categories: category_service.clone(),
                team: team_service.clone(),
                settings: settings_service.clone(),
            },
            ContentConfig::Fixtures(path) => {
                ContentSource::Fixtures(Arc::new(ContentFixtures::load(path).await?))
            }
        };
        let public_content = PublicContentService::new(source, email_service);

        Ok(Self {
            schema: create_schema(),
            db,
            jwt_service,
            storage,
            user_service,
            project_service,
            category_service,
            team_service,
            settings_service,
            dashboard_service,
            public_content,
            admin_function_key: config.admin_function_key.clone(),
            is_development: config.is_development(),
        })
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) = user {
        request = request.data(user);
    }

    request = request
        .data(state.user_service.clone())
        .data(state.project_service.clone())
        .data(state.category_service.clone())
        .data(state.team_service.clone())
        .data(state.settings_service.clone())
        .data(state.dashboard_service.clone())
        .data(state.public_content.clone());

    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    Html(r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Cuarto Rojo GraphQL Playground</title>
        <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/css/index.css" />
    </head>
    <body>
        <div id="root"></div>
        <script src="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/js/middleware.js"></script>
        <script>
            GraphQLPlayground.init(document.getElementById('root'), { endpoint: '/graphql' })
        </script>
    </body>
    </html>
    "#)
}

async fn health() -> impl IntoResponse {
    "OK"
}

async fn graphql_schema(State(state): State<AppState>) -> impl IntoResponse {
    if !state.is_development {
        return (StatusCode::NOT_FOUND, "Schema not available in production").into_response();
    }

    ([(CONTENT_TYPE, "application/graphql")], state.schema.sdl()).into_response()
}

pub fn cors_layer(cors_origins: &str) -> CorsLayer {
    if cors_origins.trim() == "*" {
        warn!("🚨 CORS set to accept ANY origin (*) - only use in development!");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Room for multipart framing; the storage layer enforces the exact file ceiling.
    let upload_limit = DefaultBodyLimit::max(state.storage.max_upload_bytes() + 1024 * 1024);

    let mut router = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .route("/health", get(health))
        .route("/schema.graphql", get(graphql_schema))
        .route(
            "/admin/media",
            post(handlers::upload_project_media).layer(upload_limit.clone()),
        )
        .route(
            "/admin/avatars",
            post(handlers::upload_team_avatar).layer(upload_limit),
        )
        .route(
            "/functions/admin-users",
            post(handlers::admin_users_post)
                .delete(handlers::admin_users_delete)
                .fallback(handlers::admin_users_method_not_allowed),
        );

    if let Some(root) = state.storage.local_root() {
        router = router.nest_service("/storage", ServeDir::new(root));
    }

    router
        .layer(cors)
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            optional_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
