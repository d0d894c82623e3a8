//! Integration tests for the viewer session lifecycle.

mod common;

use assert_matches::assert_matches;
use common::StubLoader;
use showcase_app::viewer::{ViewerSession, ViewerStatus};
use showcase_core::format::{ModelAsset, ModelFormat, DEFAULT_MATERIAL_COLOR};

fn asset(url: &str, format: ModelFormat) -> ModelAsset {
    ModelAsset::new(url, format)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stl_loads_geometry_with_default_material() {
    let loader = StubLoader::open();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://benchy.stl", ModelFormat::Stl));

    viewer.settled().await;

    assert_eq!(viewer.status(), ViewerStatus::Ready);
    let slot = viewer.slot();
    let mesh = slot.geometry().expect("geometry populated");
    assert_eq!(mesh.material.color, DEFAULT_MATERIAL_COLOR);
    assert_eq!(mesh.geometry.source_url, "memory://benchy.stl");
    assert!(slot.scene().is_none());
}

#[tokio::test]
async fn scene_formats_load_scene_only() {
    for format in [ModelFormat::Obj, ModelFormat::Gltf, ModelFormat::Glb] {
        let loader = StubLoader::open();
        let url = format!("memory://dragon.{format}");
        let mut viewer = ViewerSession::mount(loader, asset(&url, format));

        viewer.settled().await;

        let slot = viewer.slot();
        let scene = slot.scene().expect("scene populated");
        assert_eq!(scene.format, format);
        assert_eq!(scene.source_url, url);
        assert!(slot.geometry().is_none());
    }
}

// ---------------------------------------------------------------------------
// Stale results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unmount_cancels_pending_load() {
    let (loader, _gate) = StubLoader::gated();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://slow.glb", ModelFormat::Glb));
    assert_eq!(viewer.status(), ViewerStatus::Loading);

    viewer.unmount();
    viewer.settled().await;

    assert_eq!(loader.completed(), 0);
    assert_eq!(viewer.status(), ViewerStatus::Unmounted);
    assert!(viewer.slot().is_empty());
}

#[tokio::test]
async fn load_finishing_after_unmount_is_discarded() {
    let (loader, gate) = StubLoader::gated();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://slow.stl", ModelFormat::Stl));

    // The load result is ready by the time the task runs, so only the
    // generation check keeps it out of the slot.
    gate.add_permits(1);
    viewer.unmount();
    viewer.settled().await;

    assert_eq!(loader.completed(), 1);
    assert_eq!(viewer.status(), ViewerStatus::Unmounted);
    assert!(viewer.slot().is_empty());
}

#[tokio::test]
async fn switching_asset_keeps_only_latest_result() {
    let (loader, gate) = StubLoader::gated();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://first.stl", ModelFormat::Stl));

    viewer.load_model(asset("memory://second.glb", ModelFormat::Glb));
    gate.add_permits(2);
    viewer.settled().await;

    assert_eq!(loader.completed(), 2);
    assert_eq!(viewer.generation(), 2);
    let slot = viewer.slot();
    assert!(slot.geometry().is_none());
    assert_eq!(
        slot.scene().map(|s| s.source_url.as_str()),
        Some("memory://second.glb")
    );
}

// ---------------------------------------------------------------------------
// Remount
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_camera_reloads_same_asset() {
    let loader = StubLoader::open();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://benchy.stl", ModelFormat::Stl));
    viewer.settled().await;
    assert_eq!(viewer.generation(), 1);

    viewer.reset_camera();
    assert_eq!(viewer.status(), ViewerStatus::Loading);
    assert!(viewer.slot().is_empty());

    viewer.settled().await;
    assert_eq!(viewer.status(), ViewerStatus::Ready);
    assert_eq!(viewer.generation(), 2);
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn unmounted_viewer_ignores_reset() {
    let loader = StubLoader::open();
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://benchy.stl", ModelFormat::Stl));
    viewer.settled().await;

    viewer.unmount();
    viewer.reset_camera();
    viewer.settled().await;

    assert_eq!(viewer.status(), ViewerStatus::Unmounted);
    assert_eq!(loader.calls(), 1);
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_load_is_surfaced_and_retryable() {
    let loader = StubLoader::failing(1);
    let mut viewer = ViewerSession::mount(loader.clone(), asset("memory://gone.obj", ModelFormat::Obj));
    viewer.settled().await;

    assert_matches!(
        viewer.status(),
        ViewerStatus::Failed { message } if message == "Model fetch failed (404) for memory://gone.obj"
    );
    assert!(viewer.slot().is_empty());

    assert!(viewer.retry());
    viewer.settled().await;

    assert_eq!(viewer.status(), ViewerStatus::Ready);
    assert!(viewer.slot().scene().is_some());
    assert!(!viewer.retry(), "retry is only offered after a failure");
    assert_eq!(loader.calls(), 2);
}
