/// Occlusion proxy - invisible stand-in used to query tile occlusion.
///
/// A proxy is mapped to at most one tile at a time. Mapping copies the
/// tile's bounding volume and transform; the renderer draws the proxy's
/// world bounds as an occlusion query while it is visible.

use glam::DMat4;
use slotmap::new_key_type;
use crate::content::BoundingVolume;
use crate::selection::{Tile, TileId};

new_key_type! {
    /// Stable key for a proxy within its pool
    pub struct OcclusionProxyKey;
}

/// Occlusion query outcome for a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileOcclusionState {
    /// No result yet (unmapped, or query still in flight)
    #[default]
    Unavailable,
    NotOccluded,
    Occluded,
}

/// Source of per-frame occlusion query results (the renderer's view extension)
pub trait OcclusionQuerySource {
    /// Result of the query issued for `proxy`.
    ///
    /// `previously_occluded` and `mapped_time` let the source apply
    /// hysteresis and ignore queries older than the current mapping.
    fn occlusion_state(
        &self,
        proxy: OcclusionProxyKey,
        previously_occluded: bool,
        mapped_time: f64,
    ) -> TileOcclusionState;
}

/// One proxy of an OcclusionProxyPool
#[derive(Debug, Clone)]
pub struct OcclusionProxy {
    mapped_tile: Option<TileId>,
    tile_bounds: BoundingVolume,
    tile_transform: DMat4,
    dataset_to_world: DMat4,
    mapped_time: f64,
    occlusion_state: TileOcclusionState,
    visible: bool,
}

impl OcclusionProxy {
    pub(crate) fn new(dataset_to_world: DMat4) -> Self {
        Self {
            mapped_tile: None,
            tile_bounds: BoundingVolume::default(),
            tile_transform: DMat4::IDENTITY,
            dataset_to_world,
            mapped_time: 0.0,
            occlusion_state: TileOcclusionState::Unavailable,
            visible: false,
        }
    }

    /// Bind to `tile`, snapshotting its bounds and transform
    pub(crate) fn map(&mut self, tile: &Tile, current_time: f64) {
        self.mapped_tile = Some(tile.id);
        self.tile_bounds = tile.bounding_volume;
        self.tile_transform = tile.transform;
        self.mapped_time = current_time;
        self.visible = true;
    }

    /// Release the tile binding
    pub(crate) fn unmap(&mut self) {
        self.mapped_tile = None;
        self.occlusion_state = TileOcclusionState::Unavailable;
        self.visible = false;
    }

    pub(crate) fn set_dataset_to_world(&mut self, transform: DMat4) {
        self.dataset_to_world = transform;
    }

    /// Take a fresh query result; Unavailable keeps the last known state
    pub(crate) fn update_occlusion(&mut self, state: TileOcclusionState) {
        if state != TileOcclusionState::Unavailable {
            self.occlusion_state = state;
        }
    }

    // ===== GETTERS =====

    pub fn is_mapped(&self) -> bool {
        self.mapped_tile.is_some()
    }

    pub fn mapped_tile(&self) -> Option<TileId> {
        self.mapped_tile
    }

    pub fn mapped_time(&self) -> f64 {
        self.mapped_time
    }

    pub fn occlusion_state(&self) -> TileOcclusionState {
        self.occlusion_state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tile_bounds(&self) -> &BoundingVolume {
        &self.tile_bounds
    }

    /// Dataset-to-world composed with the tile transform
    pub fn world_transform(&self) -> DMat4 {
        self.dataset_to_world * self.tile_transform
    }

    /// Tile bounds in world space
    pub fn world_bounds(&self) -> BoundingVolume {
        self.tile_bounds.transformed(&self.world_transform())
    }
}
