//! Resource preparation
//!
//! Two-phase conversion of tile content into device resources and scene
//! nodes: a load-thread phase building descriptors, and a main-thread
//! phase creating textures, meshes and collision meshes.

mod loaded_texture;
mod loaded_model;
mod prepare_renderer_resources;
mod tile_resource_preparer;

pub use loaded_texture::{LoadedTexture, TextureCache, TextureSampling};
pub use loaded_model::{LoadedModel, LoadedPrimitive, LoadedMaterial, ModelPrepareOptions};
pub use prepare_renderer_resources::{
    PrepareRendererResources, RasterOverlayTile, RasterRendererOptions, TileRenderResources,
};
pub use tile_resource_preparer::TileResourcePreparer;
