use super::*;
use std::sync::Mutex;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::GraphicsDevice;
use crate::lifetime::AmortizedDestructor;
use crate::preparer::TileResourcePreparer;
use crate::scene::Scene;
use crate::selection::mock_selection_engine::{
    complete_destructions, EngineScript, InlineTaskProcessor, MockAssetAccessor,
    MockSelectionEngineFactory, NamedAttachment,
};
use crate::selection::{AttachmentKind, LoadRequestType};
use glam::DMat4;

struct Fixture {
    script: Arc<Mutex<EngineScript>>,
    factory: MockSelectionEngineFactory,
    accessor: Arc<MockAssetAccessor>,
    queue: Arc<MainThreadQueue>,
    lifecycle: TilesetLifecycle,
}

fn fixture() -> Fixture {
    let script = EngineScript::shared();
    let factory = MockSelectionEngineFactory::new(script.clone());
    let accessor = Arc::new(MockAssetAccessor::default());
    let queue = Arc::new(MainThreadQueue::new());
    let lifecycle = TilesetLifecycle::new(accessor.clone(), queue.clone());
    Fixture { script, factory, accessor, queue, lifecycle }
}

fn externals(f: &Fixture) -> TilesetExternals {
    let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let scene = Arc::new(Mutex::new(Scene::new(DMat4::IDENTITY)));
    let destructor = Arc::new(Mutex::new(AmortizedDestructor::new()));
    TilesetExternals {
        asset_accessor: f.accessor.clone(),
        preparer: Arc::new(TileResourcePreparer::new(device, scene, destructor)),
        task_processor: Arc::new(InlineTaskProcessor),
        credit_sink: None,
        main_thread_queue: f.queue.clone(),
        occlusion_pool: None,
    }
}

fn load(f: &mut Fixture) -> Result<()> {
    let externals = externals(f);
    f.lifecycle.load(&f.factory, &TilesetSource::Url("tileset.json".to_string()), externals, SelectionOptions::default())
}

fn attachment(name: &str) -> Arc<dyn TilesetAttachment> {
    Arc::new(NamedAttachment(name.to_string(), AttachmentKind::RasterOverlay))
}

// ============================================================================
// Load
// ============================================================================

#[test]
fn test_load_creates_engine() {
    let mut f = fixture();
    assert!(!f.lifecycle.has_engine());

    load(&mut f).unwrap();

    assert!(f.lifecycle.has_engine());
    assert_eq!(f.factory.created(), 1);
}

#[test]
fn test_factory_failure_leaves_no_engine() {
    let mut f = fixture();
    f.factory.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    assert!(load(&mut f).is_err());
    assert!(!f.lifecycle.has_engine());
}

#[test]
fn test_reload_destroys_previous_engine() {
    let mut f = fixture();
    load(&mut f).unwrap();
    load(&mut f).unwrap();

    assert_eq!(f.script.lock().unwrap().destruction_requests, 1);
    assert_eq!(f.lifecycle.pending_destructions(), 1);
}

// ============================================================================
// Attachments
// ============================================================================

#[test]
fn test_attachments_added_after_creation() {
    let mut f = fixture();
    f.lifecycle.add_attachment(attachment("imagery"));

    load(&mut f).unwrap();

    assert_eq!(f.script.lock().unwrap().attachments, vec!["imagery".to_string()]);
}

#[test]
fn test_destroy_detaches_before_destruction() {
    let mut f = fixture();
    load(&mut f).unwrap();
    f.lifecycle.add_attachment(attachment("imagery"));
    f.lifecycle.add_attachment(attachment("excluder"));

    f.lifecycle.destroy();

    let script = f.script.lock().unwrap();
    assert!(script.attachments.is_empty());
    assert_eq!(script.destruction_requests, 1);
    assert_eq!(f.lifecycle.attachments().len(), 2);
}

#[test]
fn test_remove_attachment() {
    let mut f = fixture();
    let imagery = attachment("imagery");
    f.lifecycle.add_attachment(imagery.clone());
    load(&mut f).unwrap();

    assert!(f.lifecycle.remove_attachment(&imagery));
    assert!(!f.lifecycle.remove_attachment(&imagery));
    assert!(f.script.lock().unwrap().attachments.is_empty());
}

// ============================================================================
// Asynchronous destruction
// ============================================================================

#[test]
fn test_ready_without_engine() {
    let f = fixture();
    assert!(f.lifecycle.is_ready_for_finish_destroy());
    assert_eq!(f.accessor.ticks(), 0);
}

#[test]
fn test_not_ready_until_completion_callback() {
    let mut f = fixture();
    load(&mut f).unwrap();
    f.lifecycle.destroy();

    assert!(!f.lifecycle.is_ready_for_finish_destroy());
    assert!(!f.lifecycle.is_ready_for_finish_destroy());
    assert_eq!(f.accessor.ticks(), 2);

    complete_destructions(&f.script);
    // The decrement is posted to the main thread; this check pumps it
    assert!(!f.lifecycle.is_ready_for_finish_destroy());
    assert!(f.lifecycle.is_ready_for_finish_destroy());
    assert_eq!(f.lifecycle.pending_destructions(), 0);
}

#[test]
fn test_destroy_without_engine_is_noop() {
    let mut f = fixture();
    f.lifecycle.destroy();

    assert_eq!(f.lifecycle.pending_destructions(), 0);
    assert_eq!(f.script.lock().unwrap().destruction_requests, 0);
}

#[test]
fn test_completion_from_worker_thread() {
    let mut f = fixture();
    load(&mut f).unwrap();
    f.lifecycle.destroy();

    let script = f.script.clone();
    std::thread::spawn(move || complete_destructions(&script)).join().unwrap();

    assert_eq!(f.lifecycle.pending_destructions(), 1);
    assert_eq!(f.queue.dispatch(), 1);
    assert!(f.lifecycle.is_ready_for_finish_destroy());
}

// ============================================================================
// Load failures
// ============================================================================

#[test]
fn test_load_error_reposted_to_main_thread() {
    let mut f = fixture();
    load(&mut f).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    f.lifecycle.load_failures().subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    let callback = f.script.lock().unwrap().load_error_callback.clone().unwrap();
    callback(LoadError {
        request_type: LoadRequestType::TilesetJson,
        http_status_code: 401,
        message: "unauthorized".to_string(),
    });

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(f.queue.dispatch(), 1);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].http_status_code, 401);
}
