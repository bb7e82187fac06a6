//! End-to-end flows: mock image host → HTTP strategies → directory surface.

mod common;

use std::sync::Arc;

use common::fixtures::{self, paths};
use common::{assert_no_temp_files, assert_outcome, MockImageServer};
use tone_matrix::SEPIA;
use walltone::models::{AppConfig, GeometricTransform, Surface, Vector2, WallpaperTarget};
use walltone::rendering::decode_image;
use walltone::services::{
    CancelToken, CommitOutcome, CommitPipeline, CommitRequest, DirectorySurface, FilterStore,
};

#[tokio::test]
async fn test_catalog_wallpaper_with_sepia_end_to_end() {
    let server = MockImageServer::start().await;
    let source = fixtures::solid(30, 50, [100, 150, 200, 255]);
    server
        .mock_png(paths::PORTRAIT_PNG, fixtures::png_bytes(&source))
        .await;

    let yaml = format!(
        r#"
wallpapers:
  - id: dunes
    title: Dunes
    image_url: {}
    resolution: 30x50
    filters:
      sepia: 1.0
"#,
        server.url_for(paths::PORTRAIT_PNG)
    );
    let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    let wallpaper = config.get_wallpaper("dunes").unwrap();

    let store = FilterStore::new();
    assert_eq!(store.seed(&config.wallpapers).await, 1);
    assert_eq!(store.matrix_for(&wallpaper.id).await, SEPIA);

    let cache = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let pipeline = CommitPipeline::with_http(
        fixtures::settings(cache.path()),
        Arc::new(DirectorySurface::new(out.path())),
    )
    .unwrap();

    let request = CommitRequest::new(wallpaper.image_url.clone(), WallpaperTarget::Home)
        .with_filters(store.get(&wallpaper.id).await);
    let result = pipeline.commit(&request, &CancelToken::never()).await;

    assert_outcome(&result, CommitOutcome::Committed);
    assert_eq!(result.unwrap().fetch_strategy, Some("pooled-http"));

    let written = decode_image(&std::fs::read(out.path().join("home.png")).unwrap()).unwrap();
    let expected = SEPIA.apply_rgba([100, 150, 200, 255]);
    assert_eq!(written.dimensions(), (30, 50));
    assert!(written.pixels().all(|p| p.0 == expected));
    assert!(!out.path().join("lock.png").exists());
    assert_no_temp_files(cache.path());
}

#[tokio::test]
async fn test_both_surfaces_written_once_per_fetch() {
    let server = MockImageServer::start().await;
    server
        .mock_png(paths::MOVED, fixtures::png_bytes(&fixtures::gradient(40, 40)))
        .await;

    let cache = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let pipeline = CommitPipeline::with_http(
        fixtures::settings(cache.path()),
        Arc::new(DirectorySurface::new(out.path())),
    )
    .unwrap();

    let request = CommitRequest::new(server.url_for(paths::MOVED), WallpaperTarget::Both)
        .with_transform(
            Surface::Lock,
            GeometricTransform::new(1.5, Vector2::new(0.0, 100.0)),
        );
    let result = pipeline.commit(&request, &CancelToken::never()).await;

    assert_outcome(&result, CommitOutcome::Committed);
    assert_eq!(server.hits(paths::MOVED).await, 1);

    let home = std::fs::read(out.path().join("home.png")).unwrap();
    let lock = std::fs::read(out.path().join("lock.png")).unwrap();
    assert_ne!(home, lock);
}

#[tokio::test]
async fn test_unreachable_image_falls_back_to_picker() {
    let server = MockImageServer::start().await;
    server.mock_error(paths::MISSING, 503, "maintenance").await;

    let cache = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let pipeline = CommitPipeline::with_http(
        fixtures::settings(cache.path()),
        Arc::new(DirectorySurface::new(out.path())),
    )
    .unwrap();

    let url = server.url_for(paths::MISSING);
    let result = pipeline
        .commit(
            &CommitRequest::new(url.clone(), WallpaperTarget::Lock),
            &CancelToken::never(),
        )
        .await;

    assert_outcome(&result, CommitOutcome::PendingUserAction);
    // both strategies tried
    assert_eq!(server.hits(paths::MISSING).await, 2);

    let log = std::fs::read_to_string(out.path().join("picker.log")).unwrap();
    assert!(log.contains(&url));
    assert!(!out.path().join("lock.png").exists());
}
