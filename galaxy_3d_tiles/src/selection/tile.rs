/// Tile query surface exposed by the selection engine

use std::fmt;
use glam::DMat4;
use crate::content::BoundingVolume;
use crate::scene::TileNodeKey;

/// Stable identifier of a tile within one selection engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}

/// Load state of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileLoadState {
    Unloading,
    #[default]
    Unloaded,
    FailedTemporarily,
    ContentLoading,
    ContentLoaded,
    Done,
    Failed,
}

/// Render-side state of a tile with renderable content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileRenderContent {
    /// Main-thread result of resource preparation
    pub render_resources: Option<TileNodeKey>,
    /// 0.0 .. 1.0 progress of the current LOD transition
    pub lod_transition_fade_percentage: f32,
}

/// Tile as seen from outside the selection engine
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub load_state: TileLoadState,
    /// None for empty / external content, or while content is not loaded
    pub render_content: Option<TileRenderContent>,
    pub bounding_volume: BoundingVolume,
    pub transform: DMat4,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            load_state: TileLoadState::Unloaded,
            render_content: None,
            bounding_volume: BoundingVolume::default(),
            transform: DMat4::IDENTITY,
        }
    }

    /// Scene node of a fully loaded tile, if resource preparation produced one
    pub fn render_node(&self) -> Option<TileNodeKey> {
        if self.load_state != TileLoadState::Done {
            return None;
        }
        self.render_content.as_ref()?.render_resources
    }

    /// Fade percentage of a tile with render content
    pub fn fade_percentage(&self) -> Option<f32> {
        self.render_content.as_ref().map(|c| c.lod_transition_fade_percentage)
    }
}
