/// Scene node types for prepared tiles.
///
/// A TileNode is the main-thread result of preparing one tile's model: the
/// device meshes, collision meshes, and textures, plus the render-graph state
/// the frame synchronizer drives (attachment, visibility, collision, fade,
/// raster overlay layers).

use std::sync::Arc;
use glam::{DMat4, DVec2, Vec4};
use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use crate::graphics_device::{Texture, Mesh, CollisionMesh};
use crate::selection::TileId;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a TileNode within a Scene.
    ///
    /// This is the renderer resource handle the selection engine stores
    /// on a tile once its main-thread preparation has run.
    pub struct TileNodeKey;
}

// ===== COLLISION =====

/// Which collision features a node participates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionEnabled {
    #[default]
    NoCollision,
    QueryOnly,
    PhysicsOnly,
    QueryAndPhysics,
}

/// Response of a node to other objects on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    Ignore,
    Overlap,
    #[default]
    Block,
}

/// Collision settings copied onto every node the tileset shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionProfile {
    /// Object channel the node reports as
    pub object_channel: u8,
    /// Response for channels without an explicit entry
    pub default_response: CollisionResponse,
    /// Per-channel overrides
    pub channel_responses: Vec<(u8, CollisionResponse)>,
}

impl Default for CollisionProfile {
    fn default() -> Self {
        Self {
            object_channel: 0,
            default_response: CollisionResponse::Block,
            channel_responses: Vec::new(),
        }
    }
}

// ===== MATERIAL =====

/// Material parameters of one prepared primitive
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<Arc<dyn Texture>>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub unlit: bool,
    pub double_sided: bool,
}

/// Raster overlay bound to a texture coordinate set
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    pub texture: Arc<dyn Texture>,
    pub translation: DVec2,
    pub scale: DVec2,
}

// ===== TILE MESH =====

/// One prepared primitive
pub struct TileMesh {
    pub mesh: Arc<dyn Mesh>,
    pub collision: Option<Arc<dyn CollisionMesh>>,
    pub material: MaterialInstance,
    /// Encoded feature ID / property textures sampled by this primitive
    pub feature_textures: Vec<Arc<dyn Texture>>,
}

// ===== FADE =====

/// LOD transition fade state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeState {
    /// 0.0 = start of the transition, 1.0 = finished
    pub percentage: f32,
    pub fading_in: bool,
}

impl Default for FadeState {
    fn default() -> Self {
        Self { percentage: 1.0, fading_in: true }
    }
}

// ===== TILE NODE =====

/// Prepared tile in the scene
pub struct TileNode {
    pub(crate) tile: TileId,
    pub(crate) transform: DMat4,
    pub(crate) meshes: Vec<TileMesh>,
    pub(crate) attached: bool,
    pub(crate) visible: bool,
    pub(crate) collision_enabled: CollisionEnabled,
    pub(crate) collision_profile: CollisionProfile,
    pub(crate) fade: FadeState,
    pub(crate) overlay_layers: FxHashMap<i32, OverlayLayer>,
}

impl TileNode {
    /// New node: detached, hidden, without collision
    pub fn new(tile: TileId, transform: DMat4, meshes: Vec<TileMesh>) -> Self {
        Self {
            tile,
            transform,
            meshes,
            attached: false,
            visible: false,
            collision_enabled: CollisionEnabled::NoCollision,
            collision_profile: CollisionProfile::default(),
            fade: FadeState::default(),
            overlay_layers: FxHashMap::default(),
        }
    }

    // ===== GETTERS =====

    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    pub fn meshes(&self) -> &[TileMesh] {
        &self.meshes
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn collision_enabled(&self) -> CollisionEnabled {
        self.collision_enabled
    }

    pub fn collision_profile(&self) -> &CollisionProfile {
        &self.collision_profile
    }

    pub fn fade(&self) -> FadeState {
        self.fade
    }

    pub fn overlay_layer(&self, tex_coord_id: i32) -> Option<&OverlayLayer> {
        self.overlay_layers.get(&tex_coord_id)
    }

    pub fn overlay_layer_count(&self) -> usize {
        self.overlay_layers.len()
    }

    /// Every distinct texture referenced by this node
    pub fn textures(&self) -> Vec<Arc<dyn Texture>> {
        let mut textures: Vec<Arc<dyn Texture>> = Vec::new();
        let mut push = |texture: &Arc<dyn Texture>| {
            if !textures.iter().any(|t| Arc::ptr_eq(t, texture)) {
                textures.push(texture.clone());
            }
        };
        for mesh in &self.meshes {
            if let Some(texture) = &mesh.material.base_color_texture {
                push(texture);
            }
            for texture in &mesh.feature_textures {
                push(texture);
            }
        }
        textures
    }
}
