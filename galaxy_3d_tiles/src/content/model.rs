/// Renderer-independent model content (glTF-like) produced by tile loading.
///
/// Images are shared by index: materials, feature ID textures and property
/// textures reference `Model::images[i]` through an `ImageIndex`, which is
/// what the resource preparer deduplicates on.

use std::sync::Arc;
use glam::{Vec2, Vec3, Vec4};
use super::image::ImageData;

/// Index into `Model::images`
pub type ImageIndex = usize;

/// glTF-like model
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub primitives: Vec<Primitive>,
    pub materials: Vec<Material>,
    pub images: Vec<Arc<ImageData>>,
    pub property_textures: Vec<PropertyTexture>,
}

impl Model {
    pub fn image(&self, index: ImageIndex) -> Option<&Arc<ImageData>> {
        self.images.get(index)
    }
}

/// Triangle-list primitive
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    /// Missing normals are generated during preparation
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec4>>,
    pub tex_coords: Vec<Vec<Vec2>>,
    /// None = non-indexed (every 3 positions form a triangle)
    pub indices: Option<Vec<u32>>,
    pub material: Option<usize>,
    pub feature_id_sets: Vec<FeatureIdSet>,
}

impl Primitive {
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }
}

/// PBR material subset used by tile rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<TextureRef>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub unlit: bool,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            metallic_factor: 0.0,
            roughness_factor: 1.0,
            unlit: false,
            double_sided: false,
        }
    }
}

/// Reference from a material slot to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    pub image: ImageIndex,
    pub tex_coord: usize,
}

/// Feature ID source of a primitive
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureIdSet {
    /// Per-vertex attribute
    Attribute { attribute: usize, feature_count: u32 },
    /// Encoded in image channels
    Texture { image: ImageIndex, channels: Vec<u8>, tex_coord: usize, feature_count: u32 },
    /// Feature ID = vertex index
    Implicit { feature_count: u32 },
}

/// Named group of per-texel properties
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTexture {
    pub name: String,
    pub properties: Vec<PropertyTextureProperty>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTextureProperty {
    pub name: String,
    pub image: ImageIndex,
    pub channels: Vec<u8>,
    pub tex_coord: usize,
}
