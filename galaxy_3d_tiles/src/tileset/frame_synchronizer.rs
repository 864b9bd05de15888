/// FrameSynchronizer - applies a view update result to the scene.
///
/// Tiles leaving the render set are hidden one frame late so a
/// replacement tile never shows a hole for a frame; fading-out tiles
/// lose collision before anything is shown; load progress only climbs
/// within one load cycle.

use crate::scene::{CollisionEnabled, CollisionProfile, Scene, TileNodeKey};
use crate::selection::{SelectionEngine, SelectionStatistics, TileId, ViewUpdateResult};

const SOURCE: &str = "galaxy3d::tiles::FrameSynchronizer";

/// Load progress while the engine is done but occlusion results are pending
const WAITING_FOR_OCCLUSION_PROGRESS: f32 = 99.0;
/// Load progress cap while tiles are still waiting to be hidden
const PENDING_HIDE_PROGRESS: f32 = 99.9999;
const LOADED_PROGRESS: f32 = 100.0;

/// Per-frame settings of the synchronizer
#[derive(Debug, Clone, Copy)]
pub struct FrameSettings<'a> {
    pub use_lod_transitions: bool,
    pub collision_profile: &'a CollisionProfile,
    pub log_selection_stats: bool,
}

#[derive(Debug, Default)]
pub struct FrameSynchronizer {
    /// Tiles hidden at the start of next frame unless rendered again
    tiles_to_hide_next_frame: Vec<TileId>,
    load_progress: f32,
    last_statistics: Option<SelectionStatistics>,
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all per-engine state (new engine)
    pub fn reset(&mut self) {
        self.tiles_to_hide_next_frame.clear();
        self.load_progress = 0.0;
        self.last_statistics = None;
    }

    pub fn tiles_to_hide_next_frame(&self) -> &[TileId] {
        &self.tiles_to_hide_next_frame
    }

    pub fn load_progress(&self) -> f32 {
        self.load_progress
    }

    // ===== FRAME =====

    /// Apply one view update result to the scene
    pub fn apply(
        &mut self,
        engine: &dyn SelectionEngine,
        result: &ViewUpdateResult,
        scene: &mut Scene,
        settings: &FrameSettings<'_>,
    ) {
        if settings.log_selection_stats {
            self.log_statistics(&result.statistics);
        }

        for &id in &result.tiles_fading_out {
            if let Some(key) = Self::render_node(engine, scene, id) {
                scene.set_collision_enabled(key, CollisionEnabled::NoCollision);
            }
        }

        self.tiles_to_hide_next_frame
            .retain(|id| !result.tiles_to_render_this_frame.contains(id));
        for &id in &self.tiles_to_hide_next_frame {
            if let Some(key) = Self::render_node(engine, scene, id) {
                Self::hide(scene, key);
            }
        }
        self.tiles_to_hide_next_frame.clear();
        for &id in &result.tiles_fading_out {
            let fade_complete = engine.tile(id)
                .and_then(|tile| tile.fade_percentage())
                .map_or(true, |fade| fade >= 1.0);
            if !settings.use_lod_transitions || fade_complete {
                self.tiles_to_hide_next_frame.push(id);
            }
        }

        for &id in &result.tiles_to_render_this_frame {
            if let Some(key) = Self::render_node(engine, scene, id) {
                Self::show(scene, key, id, settings.collision_profile);
            }
        }

        if settings.use_lod_transitions {
            Self::update_fades(engine, scene, &result.tiles_to_render_this_frame, true);
            Self::update_fades(engine, scene, &result.tiles_fading_out, false);
        }
    }

    /// Scene node of `id`, if the tile is done and its node still exists
    fn render_node(engine: &dyn SelectionEngine, scene: &Scene, id: TileId) -> Option<TileNodeKey> {
        let key = engine.tile(id)?.render_node()?;
        scene.contains(key).then_some(key)
    }

    fn hide(scene: &mut Scene, key: TileNodeKey) {
        let visible = scene.node(key).is_some_and(|node| node.is_visible());
        if visible {
            scene.set_visible(key, false);
        }
        scene.set_collision_enabled(key, CollisionEnabled::NoCollision);
    }

    fn show(scene: &mut Scene, key: TileNodeKey, id: TileId, profile: &CollisionProfile) {
        scene.apply_collision_profile(key, profile);

        let attached = scene.node(key).is_some_and(|node| node.is_attached());
        if !attached && !scene.attach_to_root(key) {
            crate::engine_warn!(SOURCE, "{}: could not attach scene node to the tileset root", id);
        }

        scene.set_visible(key, true);
        scene.set_collision_enabled(key, CollisionEnabled::QueryAndPhysics);
    }

    fn update_fades(engine: &dyn SelectionEngine, scene: &mut Scene, tiles: &[TileId], fading_in: bool) {
        for &id in tiles {
            let Some(tile) = engine.tile(id) else {
                continue;
            };
            let (Some(key), Some(percentage)) = (tile.render_node(), tile.fade_percentage()) else {
                continue;
            };
            scene.update_fade(key, percentage, fading_in);
        }
    }

    fn log_statistics(&mut self, statistics: &SelectionStatistics) {
        if self.last_statistics.as_ref() == Some(statistics) {
            return;
        }
        crate::engine_info!(
            SOURCE,
            "visited {}, culled visited {}, culled {}, occluded {}, waiting for occlusion {}, \
             max depth {}, load queue worker {} main {}",
            statistics.tiles_visited,
            statistics.culled_tiles_visited,
            statistics.tiles_culled,
            statistics.tiles_occluded,
            statistics.tiles_waiting_for_occlusion_results,
            statistics.max_depth_visited,
            statistics.worker_thread_tile_load_queue_length,
            statistics.main_thread_tile_load_queue_length
        );
        self.last_statistics = Some(*statistics);
    }

    // ===== LOAD STATUS =====

    /// Update load progress from the engine's progress.
    ///
    /// Returns true exactly when progress reaches 100 from below. Once at
    /// 100, a lower value starts a new load cycle.
    pub fn update_load_status(&mut self, engine_progress: f32, tiles_waiting_for_occlusion: u32) -> bool {
        let previous = self.load_progress;
        let progress = if engine_progress < LOADED_PROGRESS {
            engine_progress.max(0.0)
        } else if tiles_waiting_for_occlusion > 0 {
            WAITING_FOR_OCCLUSION_PROGRESS
        } else if !self.tiles_to_hide_next_frame.is_empty() {
            previous.min(PENDING_HIDE_PROGRESS)
        } else {
            LOADED_PROGRESS
        };

        self.load_progress = if previous >= LOADED_PROGRESS {
            progress
        } else {
            previous.max(progress)
        };

        let loaded = previous < LOADED_PROGRESS && self.load_progress >= LOADED_PROGRESS;
        if loaded {
            crate::engine_debug!(SOURCE, "Tileset fully loaded");
        }
        loaded
    }
}

#[cfg(test)]
#[path = "frame_synchronizer_tests.rs"]
mod tests;
