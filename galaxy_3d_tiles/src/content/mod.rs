//! Tile content module
//!
//! Renderer-independent payloads delivered by the selection engine:
//! models, images, and bounding volumes.

mod image;
mod model;
mod bounding_volume;

pub use image::ImageData;
pub use model::{
    Model, Primitive, Material, TextureRef, ImageIndex,
    FeatureIdSet, PropertyTexture, PropertyTextureProperty,
};
pub use bounding_volume::BoundingVolume;

/// Loaded content of a tile
#[derive(Debug, Clone)]
pub enum TileContent {
    /// Renderable model
    Model(Model),
    /// Tile without content (pure refinement node)
    Empty,
    /// Reference to an external tileset
    External,
}

impl TileContent {
    pub fn model(&self) -> Option<&Model> {
        match self {
            TileContent::Model(model) => Some(model),
            _ => None,
        }
    }
}
