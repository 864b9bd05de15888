/// TilesetConfig - per-tileset configuration, applied every frame.

use crate::graphics_device::{CompressedFormats, TextureFilter};
use crate::preparer::ModelPrepareOptions;
use crate::scene::CollisionProfile;
use crate::selection::SelectionOptions;

/// Loading descendant limit used while capturing frames offline
pub(crate) const CAPTURE_LOADING_DESCENDANT_LIMIT: u32 = 10_000;

/// Tileset configuration, passed to every `Tileset::tick`
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetConfig {
    // ===== Selection =====
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
    pub show_credits_on_screen: bool,

    // ===== Occlusion =====
    pub enable_occlusion_culling: bool,
    /// Maximum number of occlusion proxies
    pub occlusion_pool_size: usize,
    pub delay_refinement_for_occlusion: bool,

    // ===== LOD transitions =====
    pub use_lod_transitions: bool,
    /// Seconds
    pub lod_transition_length: f32,

    // ===== Cameras =====
    /// Divide viewport sizes by the display DPI scale
    pub scale_using_dpi: bool,

    // ===== Resource preparation =====
    pub create_physics_meshes: bool,
    pub always_include_tangents: bool,
    pub generate_smooth_normals: bool,
    pub ignore_khr_materials_unlit: bool,
    pub encode_features: bool,
    pub texture_filter: TextureFilter,
    pub use_mipmaps: bool,

    // ===== Scene =====
    /// Collision settings copied onto every shown tile
    pub collision_profile: CollisionProfile,

    // ===== Debug =====
    /// Freeze tile selection
    pub suspend_update: bool,
    /// Log selection statistics whenever they change
    pub log_selection_stats: bool,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        let selection = SelectionOptions::default();
        Self {
            maximum_screen_space_error: selection.maximum_screen_space_error,
            maximum_cached_bytes: selection.maximum_cached_bytes,
            preload_ancestors: selection.preload_ancestors,
            preload_siblings: selection.preload_siblings,
            forbid_holes: selection.forbid_holes,
            maximum_simultaneous_tile_loads: selection.maximum_simultaneous_tile_loads,
            loading_descendant_limit: selection.loading_descendant_limit,
            enable_frustum_culling: selection.enable_frustum_culling,
            enable_fog_culling: selection.enable_fog_culling,
            enforce_culled_screen_space_error: selection.enforce_culled_screen_space_error,
            culled_screen_space_error: selection.culled_screen_space_error,
            show_credits_on_screen: selection.show_credits_on_screen,
            enable_occlusion_culling: selection.enable_occlusion_culling,
            occlusion_pool_size: 500,
            delay_refinement_for_occlusion: selection.delay_refinement_for_occlusion,
            use_lod_transitions: selection.enable_lod_transition_period,
            lod_transition_length: selection.lod_transition_length,
            scale_using_dpi: true,
            create_physics_meshes: true,
            always_include_tangents: false,
            generate_smooth_normals: false,
            ignore_khr_materials_unlit: false,
            encode_features: true,
            texture_filter: TextureFilter::Bilinear,
            use_mipmaps: true,
            collision_profile: CollisionProfile::default(),
            suspend_update: false,
            log_selection_stats: false,
        }
    }
}

impl TilesetConfig {
    /// Selection options for this frame.
    ///
    /// Occlusion culling needs a proxy pool. Capture mode turns off LOD
    /// transitions and ancestor/sibling preloading and raises the loading
    /// descendant limit.
    pub fn selection_options(&self, occlusion_available: bool, capture_mode: bool) -> SelectionOptions {
        let mut options = SelectionOptions {
            maximum_screen_space_error: self.maximum_screen_space_error,
            maximum_cached_bytes: self.maximum_cached_bytes,
            preload_ancestors: self.preload_ancestors,
            preload_siblings: self.preload_siblings,
            forbid_holes: self.forbid_holes,
            maximum_simultaneous_tile_loads: self.maximum_simultaneous_tile_loads,
            loading_descendant_limit: self.loading_descendant_limit,
            enable_frustum_culling: self.enable_frustum_culling,
            enable_fog_culling: self.enable_fog_culling,
            enforce_culled_screen_space_error: self.enforce_culled_screen_space_error,
            culled_screen_space_error: self.culled_screen_space_error,
            enable_occlusion_culling: occlusion_available && self.enable_occlusion_culling,
            delay_refinement_for_occlusion: self.delay_refinement_for_occlusion,
            enable_lod_transition_period: self.use_lod_transitions,
            lod_transition_length: self.lod_transition_length,
            show_credits_on_screen: self.show_credits_on_screen,
        };
        if capture_mode {
            options.preload_ancestors = false;
            options.preload_siblings = false;
            options.loading_descendant_limit = CAPTURE_LOADING_DESCENDANT_LIMIT;
            options.enable_lod_transition_period = false;
        }
        options
    }

    /// Model preparation options for a device sampling `supported_formats`
    pub fn model_prepare_options(&self, supported_formats: CompressedFormats) -> ModelPrepareOptions {
        ModelPrepareOptions {
            always_include_tangents: self.always_include_tangents,
            create_physics_meshes: self.create_physics_meshes,
            ignore_khr_materials_unlit: self.ignore_khr_materials_unlit,
            generate_smooth_normals: self.generate_smooth_normals,
            encode_features: self.encode_features,
            texture_filter: self.texture_filter,
            use_mipmaps: self.use_mipmaps,
            supported_formats,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
