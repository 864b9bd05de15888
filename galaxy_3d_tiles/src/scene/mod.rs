//! Scene module
//!
//! Render-graph nodes produced by resource preparation and driven by the
//! frame synchronizer.

mod scene;
mod tile_node;

pub use scene::{Scene, SceneRoot};
pub use tile_node::{
    TileNode, TileNodeKey, TileMesh, MaterialInstance, OverlayLayer, FadeState,
    CollisionEnabled, CollisionResponse, CollisionProfile,
};
