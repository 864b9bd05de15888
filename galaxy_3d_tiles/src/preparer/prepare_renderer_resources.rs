/// PrepareRendererResources trait - two-phase content to renderer
/// resource conversion, called by the selection engine.
///
/// Load-thread methods run on worker threads and must not touch the
/// device or the scene. Main-thread methods run during the frame.

use std::any::Any;
use std::sync::Arc;
use glam::{DMat4, DVec2};
use crate::content::{ImageData, TileContent};
use crate::graphics_device::{CompressedFormats, Texture, TextureFilter, TextureGroup};
use crate::scene::TileNodeKey;
use crate::selection::Tile;
use super::loaded_model::LoadedModel;
use super::loaded_texture::LoadedTexture;

/// Raster overlay tile as seen by the preparer
#[derive(Debug, Clone)]
pub struct RasterOverlayTile {
    pub id: u64,
    /// Current image; may be replaced between the two preparation phases
    pub image: Arc<ImageData>,
}

/// Options carried opaquely to `prepare_raster_in_load_thread`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRendererOptions {
    pub filter: TextureFilter,
    pub group: TextureGroup,
    pub use_mipmaps: bool,
    pub supported_formats: CompressedFormats,
}

impl Default for RasterRendererOptions {
    fn default() -> Self {
        Self {
            filter: TextureFilter::Bilinear,
            group: TextureGroup::Overlay,
            use_mipmaps: true,
            supported_formats: CompressedFormats::all(),
        }
    }
}

/// Renderer resources a selection engine keeps per tile
#[derive(Debug, Default)]
pub struct TileRenderResources {
    /// Load-thread result, until moved into the main-thread phase
    pub load_thread: Option<LoadedModel>,
    /// Main-thread result, owned by the tile until freed
    pub main_thread: Option<TileNodeKey>,
}

pub trait PrepareRendererResources: Send + Sync {
    /// Build the device-independent half of a tile's resources.
    ///
    /// None for non-renderable content.
    fn prepare_in_load_thread(
        &self,
        content: &TileContent,
        transform: &DMat4,
        options: &dyn Any,
    ) -> Option<LoadedModel>;

    /// Create device resources and the scene node of a tile
    fn prepare_in_main_thread(&self, tile: &Tile, loaded: LoadedModel) -> Option<TileNodeKey>;

    /// Release whichever half exists. Never fails.
    fn free(&self, tile: &Tile, load_thread: Option<LoadedModel>, main_thread: Option<TileNodeKey>);

    /// Build the device-independent half of a raster overlay texture.
    ///
    /// `options` must be a `RasterRendererOptions`.
    fn prepare_raster_in_load_thread(&self, image: &ImageData, options: &dyn Any) -> Option<LoadedTexture>;

    fn prepare_raster_in_main_thread(
        &self,
        raster_tile: &RasterOverlayTile,
        loaded: LoadedTexture,
    ) -> Option<Arc<dyn Texture>>;

    fn free_raster(
        &self,
        raster_tile: &RasterOverlayTile,
        load_thread: Option<LoadedTexture>,
        main_thread: Option<Arc<dyn Texture>>,
    );

    /// Bind a raster texture to a tile's texture coordinate set
    fn attach_raster_in_main_thread(
        &self,
        tile: &Tile,
        overlay_texture_coordinate_id: i32,
        raster_tile: &RasterOverlayTile,
        texture: &Arc<dyn Texture>,
        translation: DVec2,
        scale: DVec2,
    );

    fn detach_raster_in_main_thread(
        &self,
        tile: &Tile,
        overlay_texture_coordinate_id: i32,
        raster_tile: &RasterOverlayTile,
        texture: &Arc<dyn Texture>,
    );
}
