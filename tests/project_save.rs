mod common;

use assert_matches::assert_matches;
use axum::body::Bytes;
use common::{spawn_app, PUBLIC_BASE_URL};
use cuartorojo::entities::prelude::*;
use cuartorojo::entities::project_media;
use cuartorojo::entities::sea_orm_active_enums::{MediaType, ProjectStatus};
use cuartorojo::media::DesiredMedia;
use cuartorojo::services::{CreateProjectCommand, ProjectFilters, UpdateProjectCommand};
use cuartorojo::storage::PROJECT_MEDIA_BUCKET;
use cuartorojo::AppError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

async fn media_rows(app: &common::TestApp, project_id: Uuid) -> Vec<project_media::Model> {
    ProjectMedia::find()
        .filter(project_media::Column::ProjectId.eq(project_id))
        .order_by_asc(project_media::Column::OrderIndex)
        .all(&app.db)
        .await
        .unwrap()
}

fn public_url(path: &str) -> String {
    format!("{}/project-media/{}", PUBLIC_BASE_URL, path)
}

fn gallery_update(items: Vec<DesiredMedia>) -> UpdateProjectCommand {
    UpdateProjectCommand {
        gallery: Some(items),
        ..Default::default()
    }
}

#[tokio::test]
async fn new_project_gets_defaults_and_first_gallery_item_becomes_cover() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;
    let bodas = app.category("Bodas").await;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Boda X".into(),
            category_id: Some(bodas.id),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.project.slug, "boda-x");
    assert_eq!(created.project.status, ProjectStatus::Draft);
    assert!(!created.project.featured);
    assert_eq!(created.project.order_index, 0);
    assert_eq!(created.project.cover_image, None);
    assert_eq!(created.category_name(), "Bodas");
    assert!(created.gallery.is_empty());

    let saved = projects
        .update_project(
            created.project.id,
            gallery_update(vec![
                DesiredMedia::image_at_path("boda-x/altar.jpg"),
                DesiredMedia::image_at_path("boda-x/banquete.jpg"),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(saved.project.cover_image, Some(public_url("boda-x/altar.jpg")));

    let rows = media_rows(&app, created.project.id).await;
    let stored: Vec<_> = rows.iter().map(|r| (r.path.as_deref(), r.order_index)).collect();
    assert_eq!(stored, vec![(Some("boda-x/altar.jpg"), 0), (Some("boda-x/banquete.jpg"), 1)]);
    assert_eq!(saved.gallery[1].url, Some(public_url("boda-x/banquete.jpg")));
}

#[tokio::test]
async fn saved_gallery_matches_the_desired_keys_exactly() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Gala Anual".into(),
            gallery: Some(vec![
                DesiredMedia::image_at_path("gala/1.jpg"),
                DesiredMedia::image_at_path("gala/2.jpg"),
                DesiredMedia::legacy_url(MediaType::Video, "https://old.cuartorojo.com/gala.mp4"),
            ]),
            ..Default::default()
        })
        .await
        .unwrap();
    let id = created.project.id;
    let kept_id = media_rows(&app, id).await[1].id;

    let mut relabelled = DesiredMedia::image_at_path("gala/2.jpg");
    relabelled.alt_text = Some("Escenario".into());
    projects
        .update_project(
            id,
            gallery_update(vec![
                DesiredMedia::image_at_path("gala/3.jpg"),
                relabelled,
                DesiredMedia::legacy_url(MediaType::Video, "https://old.cuartorojo.com/gala.mp4"),
            ]),
        )
        .await
        .unwrap();

    let rows = media_rows(&app, id).await;
    let keys: Vec<_> = rows
        .iter()
        .map(|r| r.path.clone().or_else(|| r.url.clone()).unwrap())
        .collect();
    assert_eq!(keys, vec!["gala/3.jpg", "gala/2.jpg", "https://old.cuartorojo.com/gala.mp4"]);
    assert_eq!(rows.iter().map(|r| r.order_index).collect::<Vec<_>>(), vec![0, 1, 2]);

    // Matched rows are updated in place.
    assert_eq!(rows[1].id, kept_id);
    assert_eq!(rows[1].alt_text, "Escenario");
    assert_eq!(rows[2].media_type, MediaType::Video);

    projects.update_project(id, gallery_update(vec![])).await.unwrap();
    assert!(media_rows(&app, id).await.is_empty());
}

#[tokio::test]
async fn gallery_items_without_identity_are_rejected() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Feria".into(),
            gallery: Some(vec![DesiredMedia::image_at_path("feria/1.jpg")]),
            ..Default::default()
        })
        .await
        .unwrap();

    let keyless = DesiredMedia::image_at_path("");
    let result = projects
        .update_project(
            created.project.id,
            UpdateProjectCommand {
                title: Some("Feria 2025".into()),
                gallery: Some(vec![DesiredMedia::image_at_path("feria/2.jpg"), keyless]),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(AppError::Validation(_)));

    let reloaded = projects.get_project(created.project.id).await.unwrap();
    assert_eq!(reloaded.project.title, "Feria");
    let rows = media_rows(&app, created.project.id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path.as_deref(), Some("feria/1.jpg"));
}

#[tokio::test]
async fn failure_while_writing_media_rolls_back_the_whole_save() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Vendimia".into(),
            gallery: Some(vec![DesiredMedia::image_at_path("vendimia/1.jpg")]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.project.cover_image.as_deref(), Some(public_url("vendimia/1.jpg").as_str()));

    app.db
        .execute_unprepared(
            "CREATE TRIGGER media_inserts_fail BEFORE INSERT ON project_media \
             BEGIN SELECT RAISE(ABORT, 'media store unavailable'); END;",
        )
        .await
        .unwrap();

    // Patch and delete of the old row both run before the failing insert.
    let result = projects
        .update_project(
            created.project.id,
            UpdateProjectCommand {
                title: Some("Vendimia 2025".into()),
                cover_image: Some(None),
                gallery: Some(vec![DesiredMedia::image_at_path("vendimia/2.jpg")]),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(AppError::Database(_)));

    let reloaded = projects.get_project(created.project.id).await.unwrap();
    assert_eq!(reloaded.project.title, "Vendimia");
    assert_eq!(reloaded.project.cover_image.as_deref(), Some(public_url("vendimia/1.jpg").as_str()));
    let rows = media_rows(&app, created.project.id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path.as_deref(), Some("vendimia/1.jpg"));
    assert_eq!(rows[0].id, created.gallery[0].media.id);
}

#[tokio::test]
async fn cover_moves_to_new_first_item_when_its_media_is_removed() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Congreso".into(),
            cover_image: Some(public_url("congreso/c.jpg")),
            gallery: Some(vec![
                DesiredMedia::image_at_path("congreso/a.jpg"),
                DesiredMedia::image_at_path("congreso/b.jpg"),
                DesiredMedia::image_at_path("congreso/c.jpg"),
            ]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.project.cover_image, Some(public_url("congreso/c.jpg")));

    let saved = projects
        .update_project(
            created.project.id,
            gallery_update(vec![
                DesiredMedia::image_at_path("congreso/b.jpg"),
                DesiredMedia::image_at_path("congreso/a.jpg"),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(saved.project.cover_image, Some(public_url("congreso/b.jpg")));
}

#[tokio::test]
async fn cover_survives_an_empty_gallery_save() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Aniversario".into(),
            gallery: Some(vec![DesiredMedia::image_at_path("aniversario/1.jpg")]),
            ..Default::default()
        })
        .await
        .unwrap();
    let cover = created.project.cover_image.clone();
    assert_eq!(cover, Some(public_url("aniversario/1.jpg")));

    let saved = projects
        .update_project(created.project.id, gallery_update(vec![]))
        .await
        .unwrap();
    assert_eq!(saved.project.cover_image, cover);
}

#[tokio::test]
async fn omitted_gallery_leaves_media_rows_untouched() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Lanzamiento".into(),
            gallery: Some(vec![
                DesiredMedia::image_at_path("lanzamiento/1.jpg"),
                DesiredMedia::image_at_path("lanzamiento/2.jpg"),
            ]),
            ..Default::default()
        })
        .await
        .unwrap();
    let before = media_rows(&app, created.project.id).await;

    projects
        .update_project(
            created.project.id,
            UpdateProjectCommand {
                title: Some("Lanzamiento de producto".into()),
                cover_image: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = projects.get_project(created.project.id).await.unwrap();
    assert_eq!(reloaded.project.title, "Lanzamiento de producto");
    // No gallery in the patch, so no cover fallback either.
    assert_eq!(reloaded.project.cover_image, None);
    assert_eq!(media_rows(&app, created.project.id).await, before);
}

#[tokio::test]
async fn sparse_patch_only_touches_provided_fields() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;
    let corporativo = app.category("Corporativo").await;

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Cena de Empresa".into(),
            description: Some("Cena para 200 invitados".into()),
            client: Some("Grupo Atlántico".into()),
            category_id: Some(corporativo.id),
            date: Some("2025-03-08".into()),
            seo_title: Some("Cena de Empresa en Madrid".into()),
            tags: Some(vec!["gala".into()]),
            ..Default::default()
        })
        .await
        .unwrap();

    let saved = projects
        .update_project(
            created.project.id,
            UpdateProjectCommand {
                client: Some(String::new()),
                category_id: Some(None),
                date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let project = &saved.project;
    assert_eq!(project.client, "");
    assert_eq!(project.category_id, None);
    assert_eq!(project.date, None);
    assert_eq!(saved.category_name(), "Sin categoría");

    assert_eq!(project.title, "Cena de Empresa");
    assert_eq!(project.description, "Cena para 200 invitados");
    assert_eq!(project.seo_title.as_deref(), Some("Cena de Empresa en Madrid"));
    assert_eq!(project.tags.0, vec!["gala".to_string()]);
}

#[tokio::test]
async fn slugs_are_unique_across_projects() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    projects
        .create_project(CreateProjectCommand {
            title: "Boda en la Playa".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let other = projects
        .create_project(CreateProjectCommand {
            title: "Boda en el Campo".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let duplicate = projects
        .create_project(CreateProjectCommand {
            title: "Boda en la  Playa".into(),
            ..Default::default()
        })
        .await;
    assert_matches!(duplicate, Err(AppError::Conflict(_)));

    let renamed = projects
        .update_project(
            other.project.id,
            UpdateProjectCommand {
                slug: Some("boda-en-la-playa".into()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(renamed, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn publication_controls_public_listings() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;
    let bodas = app.category("Bodas").await;

    let boda = projects
        .create_project(CreateProjectCommand {
            title: "Boda de Otoño".into(),
            category_id: Some(bodas.id),
            featured: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    let gala = projects
        .create_project(CreateProjectCommand {
            title: "Gala Benéfica".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(projects.published_projects(None).await.unwrap().is_empty());

    projects.set_status(boda.project.id, ProjectStatus::Published).await.unwrap();
    projects.set_status(gala.project.id, ProjectStatus::Published).await.unwrap();

    assert_eq!(projects.published_projects(None).await.unwrap().len(), 2);
    let in_bodas = projects.published_projects(Some("bodas")).await.unwrap();
    assert_eq!(in_bodas.len(), 1);
    assert_eq!(in_bodas[0].project.id, boda.project.id);
    assert_eq!(projects.featured_projects().await.unwrap().len(), 1);

    let archived = projects.set_status(gala.project.id, ProjectStatus::Archived).await.unwrap();
    assert_eq!(archived.project.status, ProjectStatus::Archived);
    assert!(projects.published_project_by_slug(&gala.project.slug).await.unwrap().is_none());
    assert!(projects.published_project_by_slug(&boda.project.slug).await.unwrap().is_some());

    let archived_only = projects
        .list_projects(ProjectFilters {
            status: Some(ProjectStatus::Archived),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(archived_only.len(), 1);
}

#[tokio::test]
async fn admin_listing_filters_and_orders() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let first = projects
        .create_project(CreateProjectCommand {
            title: "Festival de Verano".into(),
            description: Some("Música en directo".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let second = projects
        .create_project(CreateProjectCommand {
            title: "Congreso Médico".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    projects
        .reorder_projects(&[(first.project.id, 1), (second.project.id, 5), (Uuid::new_v4(), 9)])
        .await
        .unwrap();

    let all = projects.list_projects(ProjectFilters::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|r| r.project.id).collect();
    assert_eq!(ids, vec![second.project.id, first.project.id]);

    let found = projects
        .list_projects(ProjectFilters {
            search: Some("VERANO".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].project.id, first.project.id);

    projects.delete_project(first.project.id).await.unwrap();
    assert_matches!(
        projects.get_project(first.project.id).await,
        Err(AppError::NotFound { .. })
    );
    assert_matches!(
        projects.delete_project(first.project.id).await,
        Err(AppError::NotFound { .. })
    );
}

#[tokio::test]
async fn deleting_a_project_removes_its_stored_files() {
    let app = spawn_app().await;
    let projects = &app.state.project_service;

    let stored = app
        .state
        .storage
        .upload(
            PROJECT_MEDIA_BUCKET,
            "altar.jpg",
            Some("image/jpeg"),
            Bytes::from_static(b"jpeg-bytes"),
        )
        .await
        .unwrap();
    let on_disk = app.storage_dir.path().join(PROJECT_MEDIA_BUCKET).join(&stored.path);
    assert!(on_disk.exists());

    let created = projects
        .create_project(CreateProjectCommand {
            title: "Boda en la Ermita".into(),
            gallery: Some(vec![
                DesiredMedia::image_at_path(stored.path.clone()),
                DesiredMedia::legacy_url(MediaType::Image, "https://old.example/altar.jpg"),
            ]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(media_rows(&app, created.project.id).await.len(), 2);

    projects.delete_project(created.project.id).await.unwrap();

    assert!(media_rows(&app, created.project.id).await.is_empty());
    assert!(!on_disk.exists());
}
