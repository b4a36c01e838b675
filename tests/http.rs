mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::{spawn_app, TestApp, FUNCTION_KEY};
use cuartorojo::app::{build_router, cors_layer};
use cuartorojo::entities::prelude::*;
use cuartorojo::entities::sea_orm_active_enums::UserRole;
use http_body_util::BodyExt;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn router(app: &TestApp) -> Router {
    build_router(app.state.clone(), cors_layer("*"))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn function_call(method: Method, uri: &str, key: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    builder.body(body).unwrap()
}

async fn graphql(router: &Router, token: Option<&str>, query: &str, variables: Value) -> Value {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(Body::from(json!({ "query": query, "variables": variables }).to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body
}

const BOUNDARY: &str = "cuartorojo-boundary";

fn multipart_upload(uri: &str, token: Option<&str>, file_name: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let response = router(&app)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_users_function_requires_the_service_key() {
    let app = spawn_app().await;
    let router = router(&app);
    let body = json!({ "type": "create", "payload": { "email": "x@cuartorojo.com", "password": "12345678" } });

    let (status, error) = send(
        &router,
        function_call(Method::POST, "/functions/admin-users", None, Body::from(body.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error, json!({ "error": "Unauthorized" }));

    let (status, _) = send(
        &router,
        function_call(Method::POST, "/functions/admin-users", Some("wrong"), Body::from(body.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(User::find().all(&app.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_users_function_creates_and_deletes() {
    let app = spawn_app().await;
    let router = router(&app);

    let create = json!({
        "type": "create",
        "payload": { "name": "Luis Pardo", "email": "luis@cuartorojo.com", "password": "contraseña-luis" }
    });
    let (status, body) = send(
        &router,
        function_call(Method::POST, "/functions/admin-users", Some(FUNCTION_KEY), Body::from(create.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "luis@cuartorojo.com");
    assert_eq!(body["user"]["name"], "Luis Pardo");

    let id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let created = app.state.user_service.get_user(id).await.unwrap();
    assert_eq!(created.role, UserRole::Admin);

    let (status, body) = send(
        &router,
        function_call(
            Method::DELETE,
            &format!("/functions/admin-users?id={}", id),
            Some(FUNCTION_KEY),
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert!(User::find_by_id(id).one(&app.db).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_users_function_rejects_malformed_calls() {
    let app = spawn_app().await;
    let router = router(&app);

    for raw in [r#"{"type": "promote", "payload": {}}"#, "not json"] {
        let (status, body) = send(
            &router,
            function_call(Method::POST, "/functions/admin-users", Some(FUNCTION_KEY), Body::from(raw)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Bad request" }));
    }

    let (status, body) = send(
        &router,
        function_call(Method::DELETE, "/functions/admin-users", Some(FUNCTION_KEY), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing id" }));

    let (status, body) = send(
        &router,
        function_call(Method::DELETE, "/functions/admin-users?id=abc", Some(FUNCTION_KEY), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid id" }));

    let (status, body) = send(
        &router,
        function_call(Method::PUT, "/functions/admin-users", Some(FUNCTION_KEY), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method not allowed" }));

    let (status, body) = send(
        &router,
        function_call(
            Method::DELETE,
            &format!("/functions/admin-users?id={}", Uuid::new_v4()),
            Some(FUNCTION_KEY),
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn admin_users_function_sends_password_resets() {
    let app = spawn_app().await;
    let router = router(&app);
    let luis = app.admin("luis@cuartorojo.com").await;

    let reset = json!({ "type": "reset_password", "payload": { "email": "Luis@CuartoRojo.com" } });
    let (status, body) = send(
        &router,
        function_call(Method::POST, "/functions/admin-users", Some(FUNCTION_KEY), Body::from(reset.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let stored = User::find_by_id(luis.id).one(&app.db).await.unwrap().unwrap();
    assert!(stored.password_reset_token.is_some());
    assert!(stored.password_reset_expires_at.is_some());

    let blank = json!({ "type": "reset_password", "payload": { "email": " " } });
    let (status, body) = send(
        &router,
        function_call(Method::POST, "/functions/admin-users", Some(FUNCTION_KEY), Body::from(blank.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing email" }));
}

#[tokio::test]
async fn admins_can_send_password_resets_through_graphql() {
    let app = spawn_app().await;
    let router = router(&app);
    let token = app.access_token("marta@cuartorojo.com").await;
    let luis = app.admin("luis@cuartorojo.com").await;

    let mutation = "mutation Reset($input: ForgotPasswordInput!) { sendPasswordReset(input: $input) { message } }";
    let variables = json!({ "input": { "email": "luis@cuartorojo.com" } });

    let anonymous = graphql(&router, None, mutation, variables.clone()).await;
    assert!(anonymous["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("Authentication required"));
    let untouched = User::find_by_id(luis.id).one(&app.db).await.unwrap().unwrap();
    assert!(untouched.password_reset_token.is_none());

    let response = graphql(&router, Some(&token), mutation, variables).await;
    assert!(response["errors"].is_null(), "{response}");
    assert_eq!(response["data"]["sendPasswordReset"]["message"], "Password reset email sent");

    let stored = User::find_by_id(luis.id).one(&app.db).await.unwrap().unwrap();
    assert!(stored.password_reset_token.is_some());
}

#[tokio::test]
async fn uploads_require_an_admin_and_are_served_from_storage() {
    let app = spawn_app().await;
    let router = router(&app);

    let (status, body) = send(
        &router,
        multipart_upload("/admin/media", None, "altar.jpg", "image/jpeg", b"jpeg-bytes"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let token = app.access_token("marta@cuartorojo.com").await;
    let (status, body) = send(
        &router,
        multipart_upload("/admin/media", Some(&token), "altar.jpg", "image/jpeg", b"jpeg-bytes"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bucket"], "project-media");
    assert_eq!(body["mime"], "image/jpeg");
    assert_eq!(body["size"], 10);

    let path = body["path"].as_str().unwrap().to_string();
    assert!(path.ends_with(".jpg"));
    assert!(app.storage_dir.path().join("project-media").join(&path).exists());

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/storage/project-media/{}", path))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], b"jpeg-bytes");
}

#[tokio::test]
async fn viewers_cannot_upload_avatars() {
    let app = spawn_app().await;
    let router = router(&app);
    let token = app.access_token("viewer@cuartorojo.com").await;
    let viewer = User::find().one(&app.db).await.unwrap().unwrap();
    app.state
        .user_service
        .update_user(
            viewer.id,
            cuartorojo::services::UpdateUserCommand {
                role: Some(UserRole::Viewer),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = send(
        &router,
        multipart_upload("/admin/avatars", Some(&token), "marta.png", "image/png", b"png"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn graphql_update_distinguishes_omitted_from_null() {
    let app = spawn_app().await;
    let router = router(&app);
    let token = app.access_token("marta@cuartorojo.com").await;

    let created = graphql(
        &router,
        Some(&token),
        r#"mutation Create($input: CreateProjectInput!) { createProject(input: $input) { id status coverImage } }"#,
        json!({ "input": {
            "title": "Boda X",
            "client": "Familia Romero",
            "coverImage": "https://images.cuartorojo.com/boda-x.jpg"
        }}),
    )
    .await;
    assert!(created["errors"].is_null(), "{created}");
    assert_eq!(created["data"]["createProject"]["status"], "DRAFT");
    let id = created["data"]["createProject"]["id"].as_str().unwrap().to_string();

    let updated = graphql(
        &router,
        Some(&token),
        r#"mutation Update($id: UUID!, $input: UpdateProjectInput!) {
            updateProject(id: $id, input: $input) { title client coverImage gallery { id } }
        }"#,
        json!({ "id": id, "input": { "title": "Boda X en la Playa", "coverImage": null } }),
    )
    .await;
    assert!(updated["errors"].is_null(), "{updated}");
    let project = &updated["data"]["updateProject"];
    assert_eq!(project["title"], "Boda X en la Playa");
    assert_eq!(project["client"], "Familia Romero");
    assert!(project["coverImage"].is_null());
    assert_eq!(project["gallery"], json!([]));
}

#[tokio::test]
async fn graphql_admin_queries_require_authentication() {
    let app = spawn_app().await;
    let router = router(&app);

    let response = graphql(&router, None, "{ projects { id } }", json!({})).await;
    let message = response["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("Authentication required"), "{message}");

    let public = graphql(&router, None, "{ publishedProjects { id } publicSettings { contactEmail } }", json!({})).await;
    assert!(public["errors"].is_null(), "{public}");
    assert_eq!(public["data"]["publishedProjects"], json!([]));
    assert_eq!(public["data"]["publicSettings"]["contactEmail"], "");
}
