/// Tileset - the object a host ticks once per frame.
///
/// Collects cameras, builds dataset-space view states, runs the selection
/// engine and hands its result to the frame synchronizer. The engine is
/// created lazily on the first unsuspended tick and recreated after
/// `refresh()` or a source change.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_tiles::galaxy3d::tiles::{Tileset, TilesetConfig, TilesetServices, TilesetSource};
///
/// # fn run(services: TilesetServices) -> galaxy_3d_tiles::galaxy3d::Result<()> {
/// let mut tileset = Tileset::new(TilesetSource::Url("https://example.com/tileset.json".into()), services)?;
/// let config = TilesetConfig::default();
/// tileset.on_tileset_loaded(|| println!("loaded"));
///
/// // every frame
/// tileset.tick(1.0 / 60.0, &config);
/// # Ok(())
/// # }
/// ```

use std::sync::{Arc, Mutex};
use glam::DMat4;
use crate::camera::{build_view_state, Camera, CameraCollectionContext, CameraCollector, ViewState};
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{CompressedFormats, GraphicsDevice};
use crate::lifetime::AmortizedDestructor;
use crate::occlusion::{OcclusionProxyPool, OcclusionQuerySource};
use crate::preparer::TileResourcePreparer;
use crate::scene::{Scene, SceneRoot};
use crate::selection::{
    AssetAccessor, CreditSink, MainThreadQueue, SelectionEngine, SelectionEngineFactory,
    TaskProcessor, TilesetAttachment, TilesetExternals, TilesetSource,
};
use super::config::TilesetConfig;
use super::frame_synchronizer::{FrameSettings, FrameSynchronizer};
use super::lifecycle::TilesetLifecycle;
use super::load_failure::LoadFailureNotifier;

const SOURCE: &str = "galaxy3d::tiles::Tileset";

/// Host services a tileset is built from
#[derive(Clone)]
pub struct TilesetServices {
    pub factory: Arc<dyn SelectionEngineFactory>,
    pub device: Arc<Mutex<dyn GraphicsDevice>>,
    pub asset_accessor: Arc<dyn AssetAccessor>,
    pub task_processor: Arc<dyn TaskProcessor>,
    pub credit_sink: Option<Arc<dyn CreditSink>>,
    pub main_thread_queue: Arc<MainThreadQueue>,
    /// None uses the engine-wide destructor (`Engine::amortized_destructor`)
    pub destructor: Option<Arc<Mutex<AmortizedDestructor>>>,
}

pub struct Tileset {
    source: TilesetSource,
    factory: Arc<dyn SelectionEngineFactory>,
    asset_accessor: Arc<dyn AssetAccessor>,
    task_processor: Arc<dyn TaskProcessor>,
    credit_sink: Option<Arc<dyn CreditSink>>,
    main_thread_queue: Arc<MainThreadQueue>,
    supported_formats: CompressedFormats,

    preparer: Arc<TileResourcePreparer>,
    scene: Arc<Mutex<Scene>>,
    lifecycle: TilesetLifecycle,
    synchronizer: FrameSynchronizer,

    cameras: CameraCollector,
    camera_context: CameraCollectionContext,

    occlusion_pool: Option<Arc<Mutex<OcclusionProxyPool>>>,
    occlusion_source: Option<Box<dyn OcclusionQuerySource>>,

    actor_to_world: DMat4,
    dataset_to_actor: DMat4,
    capture_mode: bool,
    on_tileset_loaded: Vec<Box<dyn FnMut()>>,
}

impl Tileset {
    /// Create a tileset. The selection engine is created on the first tick.
    ///
    /// # Errors
    ///
    /// Returns an error when no destructor is supplied and the engine-wide
    /// destructor does not exist.
    pub fn new(source: TilesetSource, services: TilesetServices) -> Result<Self> {
        let destructor = match services.destructor {
            Some(destructor) => destructor,
            None => Engine::amortized_destructor()?,
        };
        let supported_formats = services.device.lock()
            .map(|device| device.supported_compressed_formats())
            .unwrap_or_else(|_| CompressedFormats::empty());

        let scene = Arc::new(Mutex::new(Scene::new(DMat4::IDENTITY)));
        let preparer = Arc::new(TileResourcePreparer::new(services.device, scene.clone(), destructor));
        let lifecycle = TilesetLifecycle::new(services.asset_accessor.clone(), services.main_thread_queue.clone());

        Ok(Self {
            source,
            factory: services.factory,
            asset_accessor: services.asset_accessor,
            task_processor: services.task_processor,
            credit_sink: services.credit_sink,
            main_thread_queue: services.main_thread_queue,
            supported_formats,
            preparer,
            scene,
            lifecycle,
            synchronizer: FrameSynchronizer::new(),
            cameras: CameraCollector::new(),
            camera_context: CameraCollectionContext::default(),
            occlusion_pool: None,
            occlusion_source: None,
            actor_to_world: DMat4::IDENTITY,
            dataset_to_actor: DMat4::IDENTITY,
            capture_mode: false,
            on_tileset_loaded: Vec::new(),
        })
    }

    // ===== FRAME =====

    /// Run one frame of tile selection and scene synchronization
    pub fn tick(&mut self, delta_time: f32, config: &TilesetConfig) {
        self.main_thread_queue.dispatch();

        if config.suspend_update {
            return;
        }
        if !self.lifecycle.has_engine() {
            self.load_tileset(config);
        }

        self.update_occlusion();
        self.preparer.set_model_options(config.model_prepare_options(self.supported_formats));

        let occlusion_available = self.occlusion_pool.is_some();
        let Some(engine) = self.lifecycle.engine_mut() else {
            return;
        };
        *engine.options_mut() = config.selection_options(occlusion_available, self.capture_mode);

        self.camera_context.scale_using_dpi = config.scale_using_dpi;
        let cameras = self.cameras.collect(&self.camera_context);
        if cameras.is_empty() {
            return;
        }

        let dataset_to_world = self.actor_to_world * self.dataset_to_actor;
        let world_to_dataset = dataset_to_world.inverse();
        if !world_to_dataset.w_axis.truncate().is_finite() {
            return;
        }
        if let Some(pool) = &self.occlusion_pool {
            if let Ok(mut pool) = pool.lock() {
                pool.update_transform_from_dataset(dataset_to_world);
            }
        }

        let views: Vec<ViewState> = cameras.iter()
            .map(|camera| build_view_state(camera, &world_to_dataset))
            .collect();

        let Some(engine) = self.lifecycle.engine_mut() else {
            return;
        };
        let result = if self.capture_mode {
            engine.update_view_offline(&views)
        } else {
            engine.update_view(&views, delta_time)
        };
        let engine: &dyn SelectionEngine = engine;

        let settings = FrameSettings {
            use_lod_transitions: config.use_lod_transitions && !self.capture_mode,
            collision_profile: &config.collision_profile,
            log_selection_stats: config.log_selection_stats,
        };
        match self.scene.lock() {
            Ok(mut scene) => self.synchronizer.apply(engine, &result, &mut scene, &settings),
            Err(_) => {
                crate::engine_error!(SOURCE, "Scene lock poisoned, frame result dropped");
                return;
            }
        }

        let loaded = self.synchronizer.update_load_status(
            engine.compute_load_progress(),
            result.statistics.tiles_waiting_for_occlusion_results,
        );
        if loaded {
            for callback in self.on_tileset_loaded.iter_mut() {
                callback();
            }
        }
    }

    fn load_tileset(&mut self, config: &TilesetConfig) {
        let dataset_to_world = self.dataset_to_world();
        let occlusion_pool = config.enable_occlusion_culling.then(|| {
            let mut pool = OcclusionProxyPool::new(config.occlusion_pool_size);
            pool.update_transform_from_dataset(dataset_to_world);
            Arc::new(Mutex::new(pool))
        });

        let externals = TilesetExternals {
            asset_accessor: self.asset_accessor.clone(),
            preparer: self.preparer.clone(),
            task_processor: self.task_processor.clone(),
            credit_sink: self.credit_sink.clone(),
            main_thread_queue: self.main_thread_queue.clone(),
            occlusion_pool: occlusion_pool.clone(),
        };
        let options = config.selection_options(occlusion_pool.is_some(), self.capture_mode);
        self.preparer.set_model_options(config.model_prepare_options(self.supported_formats));

        if self.lifecycle.load(self.factory.as_ref(), &self.source, externals, options).is_ok() {
            self.occlusion_pool = occlusion_pool;
            self.synchronizer.reset();
            crate::engine_info!(SOURCE, "Loading tileset from {:?}", self.source);
        }
    }

    fn update_occlusion(&mut self) {
        let (Some(pool), Some(source)) = (&self.occlusion_pool, &self.occlusion_source) else {
            return;
        };
        if let Ok(mut pool) = pool.lock() {
            pool.update_occlusion(&**source);
        }
    }

    // ===== LIFETIME =====

    /// Destroy the selection engine; the next tick creates a new one
    pub fn refresh(&mut self) {
        self.destroy();
    }

    /// Start asynchronous destruction of the selection engine
    pub fn destroy(&mut self) {
        self.lifecycle.destroy();
        if let Some(pool) = self.occlusion_pool.take() {
            if let Ok(mut pool) = pool.lock() {
                pool.destroy_pool();
            }
        }
        self.synchronizer.reset();
    }

    /// See `TilesetLifecycle::is_ready_for_finish_destroy`
    pub fn is_ready_for_finish_destroy(&self) -> bool {
        self.lifecycle.is_ready_for_finish_destroy()
    }

    pub fn source(&self) -> &TilesetSource {
        &self.source
    }

    /// Change the dataset; the engine is recreated on the next tick
    pub fn set_source(&mut self, source: TilesetSource) {
        if self.source != source {
            self.source = source;
            self.refresh();
        }
    }

    pub fn engine(&self) -> Option<&dyn SelectionEngine> {
        self.lifecycle.engine()
    }

    // ===== LOAD STATUS =====

    /// Load progress in [0, 100]
    pub fn load_progress(&self) -> f32 {
        self.synchronizer.load_progress()
    }

    /// Called each time load progress reaches 100
    pub fn on_tileset_loaded(&mut self, callback: impl FnMut() + 'static) {
        self.on_tileset_loaded.push(Box::new(callback));
    }

    pub fn load_failures(&self) -> &Arc<LoadFailureNotifier> {
        self.lifecycle.load_failures()
    }

    // ===== ATTACHMENTS =====

    pub fn add_attachment(&mut self, attachment: Arc<dyn TilesetAttachment>) {
        self.lifecycle.add_attachment(attachment);
    }

    pub fn remove_attachment(&mut self, attachment: &Arc<dyn TilesetAttachment>) -> bool {
        self.lifecycle.remove_attachment(attachment)
    }

    // ===== CAMERAS =====

    pub fn cameras(&self) -> &CameraCollector {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraCollector {
        &mut self.cameras
    }

    pub fn camera_context_mut(&mut self) -> &mut CameraCollectionContext {
        &mut self.camera_context
    }

    /// Register a camera, returning its id
    pub fn add_camera(&mut self, camera: Camera) -> i32 {
        self.cameras.registry_mut().add_camera(camera)
    }

    pub fn update_camera(&mut self, id: i32, camera: Camera) -> bool {
        self.cameras.registry_mut().update_camera(id, camera)
    }

    pub fn remove_camera(&mut self, id: i32) -> bool {
        self.cameras.registry_mut().remove_camera(id)
    }

    // ===== OCCLUSION =====

    /// Renderer-side source of occlusion query results
    pub fn set_occlusion_query_source(&mut self, source: Option<Box<dyn OcclusionQuerySource>>) {
        self.occlusion_source = source;
    }

    pub fn occlusion_pool(&self) -> Option<&Arc<Mutex<OcclusionProxyPool>>> {
        self.occlusion_pool.as_ref()
    }

    // ===== TRANSFORMS =====

    /// Placement of the tileset in the world
    pub fn set_actor_to_world(&mut self, transform: DMat4) {
        self.actor_to_world = transform;
        self.update_scene_root();
    }

    /// Dataset (earth-centered) to tileset-local transform
    pub fn set_dataset_to_actor(&mut self, transform: DMat4) {
        self.dataset_to_actor = transform;
        self.update_scene_root();
    }

    pub fn dataset_to_world(&self) -> DMat4 {
        self.actor_to_world * self.dataset_to_actor
    }

    fn update_scene_root(&mut self) {
        let world_transform = self.dataset_to_world();
        if let Ok(mut scene) = self.scene.lock() {
            if scene.root().is_some() {
                scene.set_root(Some(SceneRoot { world_transform }));
            }
        }
        // Proxies follow at once, even while updates are suspended
        if !world_transform.inverse().w_axis.truncate().is_finite() {
            return;
        }
        if let Some(pool) = &self.occlusion_pool {
            if let Ok(mut pool) = pool.lock() {
                pool.update_transform_from_dataset(world_transform);
            }
        }
    }

    // ===== CAPTURE MODE =====

    /// Enter capture mode: offline updates, no LOD transitions, no
    /// ancestor/sibling preloading, large loading descendant limit
    pub fn play_movie_sequencer(&mut self) {
        if !self.capture_mode {
            crate::engine_debug!(SOURCE, "Entering capture mode");
            self.capture_mode = true;
        }
    }

    /// Leave capture mode; configured values apply again from the next tick
    pub fn stop_movie_sequencer(&mut self) {
        if self.capture_mode {
            crate::engine_debug!(SOURCE, "Leaving capture mode");
            self.capture_mode = false;
        }
    }

    pub fn pause_movie_sequencer(&mut self) {
        self.stop_movie_sequencer();
    }

    pub fn is_capture_mode(&self) -> bool {
        self.capture_mode
    }

    // ===== RESOURCES =====

    pub fn scene(&self) -> &Arc<Mutex<Scene>> {
        &self.scene
    }

    pub fn preparer(&self) -> &Arc<TileResourcePreparer> {
        &self.preparer
    }
}

#[cfg(test)]
#[path = "tileset_tests.rs"]
mod tests;
