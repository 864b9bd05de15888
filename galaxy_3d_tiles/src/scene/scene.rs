/// Scene - the render-graph side of a tileset.
///
/// Holds every prepared TileNode in a SlotMap with stable keys. The
/// resource preparer inserts and removes nodes; the frame synchronizer
/// flips their attachment, visibility, collision, and fade state.
/// Nodes whose render state changed are collected in a dirty set the
/// rendering backend drains once per frame.

use glam::{DMat4, DVec2};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use super::tile_node::{
    TileNode, TileNodeKey, CollisionEnabled, CollisionProfile, FadeState, OverlayLayer,
};

/// Parent all tile nodes attach to (the tileset's own transform)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRoot {
    pub world_transform: DMat4,
}

/// Render graph of one tileset
pub struct Scene {
    /// Root node; attachment fails while it is absent
    root: Option<SceneRoot>,
    /// Tile nodes stored in a slot map for O(1) insert/remove
    nodes: SlotMap<TileNodeKey, TileNode>,
    /// Nodes whose render state changed since last take_dirty_nodes()
    dirty_nodes: FxHashSet<TileNodeKey>,
}

impl Scene {
    /// Create an empty scene rooted at `root_transform`
    pub fn new(root_transform: DMat4) -> Self {
        Self {
            root: Some(SceneRoot { world_transform: root_transform }),
            nodes: SlotMap::with_key(),
            dirty_nodes: FxHashSet::default(),
        }
    }

    // ===== ROOT =====

    pub fn root(&self) -> Option<&SceneRoot> {
        self.root.as_ref()
    }

    /// Replace (or remove) the root. Removing the root detaches every node.
    pub fn set_root(&mut self, root: Option<SceneRoot>) {
        if root.is_none() {
            for (key, node) in self.nodes.iter_mut() {
                if node.attached {
                    node.attached = false;
                    self.dirty_nodes.insert(key);
                }
            }
        }
        self.root = root;
    }

    // ===== NODES =====

    /// Insert a node, returning its stable key
    pub fn insert_node(&mut self, node: TileNode) -> TileNodeKey {
        let key = self.nodes.insert(node);
        self.dirty_nodes.insert(key);
        key
    }

    /// Remove a node. Returns None if the key is invalid.
    pub fn remove_node(&mut self, key: TileNodeKey) -> Option<TileNode> {
        self.dirty_nodes.remove(&key);
        self.nodes.remove(key)
    }

    pub fn node(&self, key: TileNodeKey) -> Option<&TileNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: TileNodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (TileNodeKey, &TileNode)> {
        self.nodes.iter()
    }

    /// Nodes currently attached and visible
    pub fn visible_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.attached && n.visible).count()
    }

    // ===== RENDER STATE =====

    /// Attach a node under the root.
    ///
    /// Returns false when the scene has no root or the key is invalid.
    /// Attaching an attached node is a no-op that returns true.
    pub fn attach_to_root(&mut self, key: TileNodeKey) -> bool {
        if self.root.is_none() {
            return false;
        }
        match self.nodes.get_mut(key) {
            Some(node) => {
                if !node.attached {
                    node.attached = true;
                    self.dirty_nodes.insert(key);
                }
                true
            }
            None => false,
        }
    }

    /// Set visibility. Returns false if the key is invalid.
    pub fn set_visible(&mut self, key: TileNodeKey, visible: bool) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                if node.visible != visible {
                    node.visible = visible;
                    self.dirty_nodes.insert(key);
                }
                true
            }
            None => false,
        }
    }

    /// Set collision participation. Returns false if the key is invalid.
    ///
    /// Only an actual change marks the node dirty.
    pub fn set_collision_enabled(&mut self, key: TileNodeKey, collision: CollisionEnabled) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                if node.collision_enabled != collision {
                    node.collision_enabled = collision;
                    self.dirty_nodes.insert(key);
                }
                true
            }
            None => false,
        }
    }

    /// Copy a collision profile onto a node when it differs from the current one
    pub fn apply_collision_profile(&mut self, key: TileNodeKey, profile: &CollisionProfile) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                if node.collision_profile != *profile {
                    node.collision_profile = profile.clone();
                    self.dirty_nodes.insert(key);
                }
                true
            }
            None => false,
        }
    }

    /// Update the LOD transition fade of a node
    pub fn update_fade(&mut self, key: TileNodeKey, percentage: f32, fading_in: bool) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                let fade = FadeState { percentage: percentage.clamp(0.0, 1.0), fading_in };
                if node.fade != fade {
                    node.fade = fade;
                    self.dirty_nodes.insert(key);
                }
                true
            }
            None => false,
        }
    }

    // ===== RASTER OVERLAYS =====

    /// Bind a raster overlay to texture coordinate set `tex_coord_id`
    pub fn set_overlay_layer(
        &mut self,
        key: TileNodeKey,
        tex_coord_id: i32,
        layer: OverlayLayer,
    ) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.overlay_layers.insert(tex_coord_id, layer);
                self.dirty_nodes.insert(key);
                true
            }
            None => false,
        }
    }

    /// Update translation/scale of an already bound overlay layer
    pub fn set_overlay_transform(
        &mut self,
        key: TileNodeKey,
        tex_coord_id: i32,
        translation: DVec2,
        scale: DVec2,
    ) -> bool {
        let Some(layer) = self.nodes.get_mut(key)
            .and_then(|node| node.overlay_layers.get_mut(&tex_coord_id))
        else {
            return false;
        };
        layer.translation = translation;
        layer.scale = scale;
        self.dirty_nodes.insert(key);
        true
    }

    /// Unbind the overlay layer of `tex_coord_id`, returning it
    pub fn clear_overlay_layer(&mut self, key: TileNodeKey, tex_coord_id: i32) -> Option<OverlayLayer> {
        let layer = self.nodes.get_mut(key)?.overlay_layers.remove(&tex_coord_id);
        if layer.is_some() {
            self.dirty_nodes.insert(key);
        }
        layer
    }

    // ===== DIRTY TRACKING =====

    pub fn dirty_nodes(&self) -> &FxHashSet<TileNodeKey> {
        &self.dirty_nodes
    }

    /// Take and clear the dirty node set
    pub fn take_dirty_nodes(&mut self) -> FxHashSet<TileNodeKey> {
        std::mem::take(&mut self.dirty_nodes)
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
