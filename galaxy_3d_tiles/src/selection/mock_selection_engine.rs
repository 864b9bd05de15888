/// Scripted SelectionEngine for unit tests
///
/// Tests drive the engine through a shared `EngineScript`: the tiles it
/// exposes, the result of the next view update, and the reported load
/// progress. Tile state is copied from the script at every update, the
/// same way a real engine only changes tiles inside `update_view`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::camera::ViewState;
use crate::error::Result;
use crate::engine_bail;
use super::externals::{
    AssetAccessor, SelectionEngineFactory, TaskProcessor, TilesetExternals, TilesetSource,
};
use super::selection_engine::{
    LoadErrorCallback, SelectionEngine, SelectionOptions, TilesetAttachment, ViewUpdateResult,
};
use super::tile::{Tile, TileId};

// ============================================================================
// Script
// ============================================================================

#[derive(Default)]
pub struct EngineScript {
    pub tiles: FxHashMap<TileId, Tile>,
    /// Returned by every update until changed
    pub next_result: ViewUpdateResult,
    pub load_progress: f32,

    pub update_calls: usize,
    pub offline_calls: usize,
    pub last_views: Vec<ViewState>,
    pub last_delta_time: f32,
    /// Options in effect during the last update
    pub last_options: Option<SelectionOptions>,
    pub attachments: Vec<String>,

    pub destruction_requests: usize,
    pub on_destruction_complete: Vec<Box<dyn FnOnce() + Send>>,
    pub load_error_callback: Option<LoadErrorCallback>,
    pub externals: Option<TilesetExternals>,
}

impl EngineScript {
    pub fn shared() -> Arc<Mutex<EngineScript>> {
        Arc::new(Mutex::new(EngineScript::default()))
    }

    pub fn set_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }
}

/// Fire every pending async-destruction completion
pub fn complete_destructions(script: &Arc<Mutex<EngineScript>>) {
    let callbacks: Vec<_> = script.lock().unwrap().on_destruction_complete.drain(..).collect();
    for callback in callbacks {
        callback();
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct MockSelectionEngine {
    script: Arc<Mutex<EngineScript>>,
    options: SelectionOptions,
    tiles: FxHashMap<TileId, Tile>,
}

impl MockSelectionEngine {
    pub fn new(script: Arc<Mutex<EngineScript>>, options: SelectionOptions) -> Self {
        let tiles = script.lock().unwrap().tiles.clone();
        Self { script, options, tiles }
    }

    fn run_update(&mut self, views: &[ViewState]) -> ViewUpdateResult {
        let mut script = self.script.lock().unwrap();
        self.tiles = script.tiles.clone();
        script.last_views = views.to_vec();
        script.last_options = Some(self.options.clone());
        script.next_result.clone()
    }
}

impl SelectionEngine for MockSelectionEngine {
    fn update_view(&mut self, views: &[ViewState], delta_time: f32) -> ViewUpdateResult {
        {
            let mut script = self.script.lock().unwrap();
            script.update_calls += 1;
            script.last_delta_time = delta_time;
        }
        self.run_update(views)
    }

    fn update_view_offline(&mut self, views: &[ViewState]) -> ViewUpdateResult {
        self.script.lock().unwrap().offline_calls += 1;
        self.run_update(views)
    }

    fn compute_load_progress(&self) -> f32 {
        self.script.lock().unwrap().load_progress
    }

    fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    fn options(&self) -> &SelectionOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut SelectionOptions {
        &mut self.options
    }

    fn add_attachment(&mut self, attachment: Arc<dyn TilesetAttachment>) {
        self.script.lock().unwrap().attachments.push(attachment.name().to_string());
    }

    fn remove_attachment(&mut self, attachment: &Arc<dyn TilesetAttachment>) -> bool {
        let mut script = self.script.lock().unwrap();
        match script.attachments.iter().position(|name| name == attachment.name()) {
            Some(index) => {
                script.attachments.remove(index);
                true
            }
            None => false,
        }
    }

    fn begin_async_destruction(self: Box<Self>, on_complete: Box<dyn FnOnce() + Send>) {
        let mut script = self.script.lock().unwrap();
        script.destruction_requests += 1;
        script.on_destruction_complete.push(on_complete);
    }
}

// ============================================================================
// Factory
// ============================================================================

pub struct MockSelectionEngineFactory {
    pub script: Arc<Mutex<EngineScript>>,
    pub fail: AtomicBool,
    pub created: AtomicUsize,
}

impl MockSelectionEngineFactory {
    pub fn new(script: Arc<Mutex<EngineScript>>) -> Self {
        Self { script, fail: AtomicBool::new(false), created: AtomicUsize::new(0) }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl SelectionEngineFactory for MockSelectionEngineFactory {
    fn create(
        &self,
        source: &TilesetSource,
        externals: TilesetExternals,
        options: SelectionOptions,
        on_load_error: LoadErrorCallback,
    ) -> Result<Box<dyn SelectionEngine>> {
        if self.fail.load(Ordering::SeqCst) {
            engine_bail!("galaxy3d::tiles::MockSelectionEngineFactory", "Cannot open {:?}", source);
        }
        {
            let mut script = self.script.lock().unwrap();
            script.externals = Some(externals);
            script.load_error_callback = Some(on_load_error);
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSelectionEngine::new(self.script.clone(), options)))
    }
}

// ============================================================================
// Host collaborators
// ============================================================================

#[derive(Default)]
pub struct MockAssetAccessor {
    pub ticks: AtomicUsize,
}

impl MockAssetAccessor {
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl AssetAccessor for MockAssetAccessor {
    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Runs tasks inline
#[derive(Default)]
pub struct InlineTaskProcessor;

impl TaskProcessor for InlineTaskProcessor {
    fn start_task(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

pub struct NamedAttachment(pub String, pub super::selection_engine::AttachmentKind);

impl TilesetAttachment for NamedAttachment {
    fn name(&self) -> &str {
        &self.0
    }

    fn kind(&self) -> super::selection_engine::AttachmentKind {
        self.1
    }
}
