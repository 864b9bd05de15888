/// SelectionEngine trait - contract of the external tile-selection algorithm
///
/// Traversal, refinement, caching and fetching live behind this trait.
/// This crate drives it once per frame and applies its result.

use std::sync::Arc;
use crate::camera::ViewState;
use super::tile::{Tile, TileId};

// ============================================================================
// Selection options
// ============================================================================

/// Tuning of the selection algorithm, re-applied every frame
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOptions {
    pub maximum_screen_space_error: f64,
    pub maximum_cached_bytes: u64,
    pub preload_ancestors: bool,
    pub preload_siblings: bool,
    pub forbid_holes: bool,
    pub maximum_simultaneous_tile_loads: u32,
    pub loading_descendant_limit: u32,
    pub enable_frustum_culling: bool,
    pub enable_fog_culling: bool,
    pub enforce_culled_screen_space_error: bool,
    pub culled_screen_space_error: f64,
    pub enable_occlusion_culling: bool,
    pub delay_refinement_for_occlusion: bool,
    pub enable_lod_transition_period: bool,
    /// Seconds
    pub lod_transition_length: f32,
    pub show_credits_on_screen: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            maximum_screen_space_error: 16.0,
            maximum_cached_bytes: 256 * 1024 * 1024,
            preload_ancestors: true,
            preload_siblings: true,
            forbid_holes: false,
            maximum_simultaneous_tile_loads: 20,
            loading_descendant_limit: 20,
            enable_frustum_culling: true,
            enable_fog_culling: true,
            enforce_culled_screen_space_error: true,
            culled_screen_space_error: 64.0,
            enable_occlusion_culling: true,
            delay_refinement_for_occlusion: true,
            enable_lod_transition_period: false,
            lod_transition_length: 0.5,
            show_credits_on_screen: false,
        }
    }
}

// ============================================================================
// View update result
// ============================================================================

/// Traversal counters of one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionStatistics {
    pub tiles_visited: u32,
    pub culled_tiles_visited: u32,
    pub tiles_culled: u32,
    pub tiles_occluded: u32,
    pub tiles_waiting_for_occlusion_results: u32,
    pub max_depth_visited: u32,
    pub worker_thread_tile_load_queue_length: u32,
    pub main_thread_tile_load_queue_length: u32,
}

/// Result of one view update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewUpdateResult {
    pub tiles_to_render_this_frame: Vec<TileId>,
    pub tiles_fading_out: Vec<TileId>,
    pub statistics: SelectionStatistics,
}

// ============================================================================
// Attachments
// ============================================================================

/// Kind of object attached to a selection engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    RasterOverlay,
    TileExcluder,
}

/// Overlay or excluder registered on a selection engine.
///
/// Attachments must be removed while the engine is alive; the tileset
/// lifecycle detaches all of them before requesting destruction.
pub trait TilesetAttachment: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> AttachmentKind;
}

// ============================================================================
// Load errors
// ============================================================================

/// What was being fetched when a load failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequestType {
    TilesetJson,
    TileContent,
    RasterOverlay,
    Unknown,
}

/// Load failure reported by the selection engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub request_type: LoadRequestType,
    /// 0 when the failure did not come from an HTTP response
    pub http_status_code: u16,
    pub message: String,
}

/// Callback the engine invokes on load failure, from any thread
pub type LoadErrorCallback = Arc<dyn Fn(LoadError) + Send + Sync>;

// ============================================================================
// SelectionEngine trait
// ============================================================================

/// External tile-selection engine
pub trait SelectionEngine: Send {
    /// Select tiles for the given views
    fn update_view(&mut self, views: &[ViewState], delta_time: f32) -> ViewUpdateResult;

    /// Select tiles, waiting until everything the views need is loaded
    fn update_view_offline(&mut self, views: &[ViewState]) -> ViewUpdateResult;

    /// Load progress in [0, 100]
    fn compute_load_progress(&self) -> f32;

    /// Query a tile by id
    fn tile(&self, id: TileId) -> Option<&Tile>;

    fn options(&self) -> &SelectionOptions;

    fn options_mut(&mut self) -> &mut SelectionOptions;

    fn add_attachment(&mut self, attachment: Arc<dyn TilesetAttachment>);

    /// Returns false if the attachment was not registered
    fn remove_attachment(&mut self, attachment: &Arc<dyn TilesetAttachment>) -> bool;

    /// Start asynchronous teardown. `on_complete` runs once every
    /// in-flight load has been cancelled or finished.
    fn begin_async_destruction(self: Box<Self>, on_complete: Box<dyn FnOnce() + Send>);
}
