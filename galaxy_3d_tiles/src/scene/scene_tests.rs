/// Tests for Scene
///
/// These tests validate TileNode lifecycle via SlotMap keys, root
/// attachment, visibility/collision/fade state, overlay layers, and
/// dirty tracking.

use super::*;
use crate::graphics_device::mock_graphics_device::MockTexture;
use crate::graphics_device::{Texture, TextureDesc, TextureFormat, TextureFilter, TextureGroup, TextureAddress};
use crate::scene::{TileNode, CollisionEnabled, CollisionProfile, CollisionResponse, OverlayLayer};
use crate::selection::TileId;
use glam::{DMat4, DVec2};
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn node(id: u64) -> TileNode {
    TileNode::new(TileId(id), DMat4::IDENTITY, Vec::new())
}

fn overlay_texture(name: &str) -> Arc<dyn Texture> {
    Arc::new(MockTexture::from_desc(&TextureDesc {
        name: name.to_string(),
        width: 4,
        height: 4,
        format: TextureFormat::R8G8B8A8_SRGB,
        filter: TextureFilter::Bilinear,
        group: TextureGroup::Overlay,
        address_u: TextureAddress::Clamp,
        address_v: TextureAddress::Clamp,
        use_mipmaps: false,
        mip_offsets: Vec::new(),
        data: vec![0; 64],
    }))
}

// ============================================================================
// Node lifecycle
// ============================================================================

#[test]
fn test_insert_node_starts_detached_hidden_without_collision() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));

    let n = scene.node(key).unwrap();
    assert_eq!(n.tile(), TileId(1));
    assert!(!n.is_attached());
    assert!(!n.is_visible());
    assert_eq!(n.collision_enabled(), CollisionEnabled::NoCollision);
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn test_remove_node_invalidates_key_only_for_itself() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let k1 = scene.insert_node(node(1));
    let k2 = scene.insert_node(node(2));

    assert!(scene.remove_node(k1).is_some());
    assert!(scene.remove_node(k1).is_none());
    assert!(!scene.contains(k1));
    assert!(scene.contains(k2));
    assert!(!scene.set_visible(k1, true));
}

// ============================================================================
// Root attachment
// ============================================================================

#[test]
fn test_attach_to_root_is_idempotent() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));

    assert!(scene.attach_to_root(key));
    assert!(scene.attach_to_root(key));
    assert!(scene.node(key).unwrap().is_attached());
}

#[test]
fn test_attach_without_root_fails() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    scene.set_root(None);

    assert!(!scene.attach_to_root(key));
    assert!(!scene.node(key).unwrap().is_attached());
}

#[test]
fn test_removing_root_detaches_nodes() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    scene.attach_to_root(key);

    scene.set_root(None);

    assert!(!scene.node(key).unwrap().is_attached());
}

// ============================================================================
// Render state
// ============================================================================

#[test]
fn test_visible_node_count_requires_attach_and_visibility() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let k1 = scene.insert_node(node(1));
    let k2 = scene.insert_node(node(2));

    scene.set_visible(k1, true);
    scene.set_visible(k2, true);
    scene.attach_to_root(k2);

    assert_eq!(scene.visible_node_count(), 1);
}

#[test]
fn test_collision_profile_applied() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    let profile = CollisionProfile {
        object_channel: 3,
        default_response: CollisionResponse::Overlap,
        channel_responses: vec![(1, CollisionResponse::Ignore)],
    };

    assert!(scene.apply_collision_profile(key, &profile));
    assert!(scene.set_collision_enabled(key, CollisionEnabled::QueryAndPhysics));

    let n = scene.node(key).unwrap();
    assert_eq!(n.collision_profile(), &profile);
    assert_eq!(n.collision_enabled(), CollisionEnabled::QueryAndPhysics);
}

#[test]
fn test_update_fade_clamps_percentage() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));

    scene.update_fade(key, 1.5, false);

    let fade = scene.node(key).unwrap().fade();
    assert_eq!(fade.percentage, 1.0);
    assert!(!fade.fading_in);
}

// ============================================================================
// Overlay layers
// ============================================================================

#[test]
fn test_overlay_layer_set_update_clear() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    let layer = OverlayLayer {
        texture: overlay_texture("overlay"),
        translation: DVec2::ZERO,
        scale: DVec2::ONE,
    };

    assert!(scene.set_overlay_layer(key, 0, layer));
    assert!(scene.set_overlay_transform(key, 0, DVec2::new(0.5, 0.25), DVec2::splat(2.0)));
    assert!(!scene.set_overlay_transform(key, 1, DVec2::ZERO, DVec2::ONE));

    let n = scene.node(key).unwrap();
    assert_eq!(n.overlay_layer(0).unwrap().translation, DVec2::new(0.5, 0.25));

    assert!(scene.clear_overlay_layer(key, 0).is_some());
    assert!(scene.clear_overlay_layer(key, 0).is_none());
    assert_eq!(scene.node(key).unwrap().overlay_layer_count(), 0);
}

// ============================================================================
// Dirty tracking
// ============================================================================

#[test]
fn test_take_dirty_nodes_clears_set() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    assert!(scene.dirty_nodes().contains(&key));

    let dirty = scene.take_dirty_nodes();
    assert_eq!(dirty.len(), 1);
    assert!(scene.dirty_nodes().is_empty());

    // Setting the same visibility twice marks once
    scene.set_visible(key, false);
    assert!(scene.dirty_nodes().is_empty());
    scene.set_visible(key, true);
    assert!(scene.dirty_nodes().contains(&key));
}

#[test]
fn test_collision_change_marks_node_dirty() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    scene.set_visible(key, true);
    scene.set_collision_enabled(key, CollisionEnabled::QueryAndPhysics);
    scene.take_dirty_nodes();

    scene.set_collision_enabled(key, CollisionEnabled::NoCollision);
    assert!(scene.dirty_nodes().contains(&key));
    scene.take_dirty_nodes();

    // Same value again: nothing to report
    scene.set_collision_enabled(key, CollisionEnabled::NoCollision);
    assert!(scene.dirty_nodes().is_empty());
}

#[test]
fn test_collision_profile_change_marks_node_dirty() {
    let mut scene = Scene::new(DMat4::IDENTITY);
    let key = scene.insert_node(node(1));
    scene.take_dirty_nodes();
    let profile = CollisionProfile { default_response: CollisionResponse::Overlap, ..Default::default() };

    scene.apply_collision_profile(key, &profile);
    assert!(scene.dirty_nodes().contains(&key));
    scene.take_dirty_nodes();

    scene.apply_collision_profile(key, &profile);
    assert!(scene.dirty_nodes().is_empty());
}
