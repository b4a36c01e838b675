mod common;

use assert_matches::assert_matches;
use common::{spawn_app, ADMIN_PASSWORD};
use cuartorojo::app::{build_router, cors_layer};
use cuartorojo::client::{DashboardClient, SessionState, SessionTracker};
use cuartorojo::entities::sea_orm_active_enums::UserRole;
use cuartorojo::AppError;
use tokio::net::TcpListener;

async fn serve(app: &common::TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(app.state.clone(), cors_layer("*"));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn dashboard_session_hydrates_from_the_api() {
    let app = spawn_app().await;
    app.admin("marta@cuartorojo.com").await;
    let client = DashboardClient::new(&serve(&app).await);

    let login = client.login("marta@cuartorojo.com", ADMIN_PASSWORD).await.unwrap();
    assert_eq!(login.session.email, "marta@cuartorojo.com");

    let tracker = SessionTracker::new();
    let ticket = tracker.begin(Some(login.session.clone())).expect("signed in");
    assert!(tracker.state().is_loading());
    assert!(tracker.state().user().is_none());
    assert!(tracker.hydrate(&client, ticket).await);

    let state = tracker.state();
    assert!(!state.is_loading());
    let user = state.user().expect("session is ready");
    assert_eq!(user.role, UserRole::Admin);
    assert_eq!(user.name, "Marta Ruiz");

    client.logout(&login.session).await.unwrap();
    tracker.on_session_change(&client, None).await;
    assert_eq!(tracker.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn bad_credentials_surface_as_errors() {
    let app = spawn_app().await;
    app.admin("marta@cuartorojo.com").await;
    let client = DashboardClient::new(&serve(&app).await);

    let result = client.login("marta@cuartorojo.com", "incorrecta").await;
    assert_matches!(result, Err(AppError::Unauthorized(_)));
}
