/// Tests for MainThreadQueue and Tile queries

use super::*;
use crate::scene::TileNodeKey;
use slotmap::KeyData;
use std::sync::{Arc, Mutex};

// ============================================================================
// MainThreadQueue
// ============================================================================

#[test]
fn test_post_never_runs_inline() {
    let queue = MainThreadQueue::new();
    let ran = Arc::new(Mutex::new(false));
    let flag = ran.clone();

    queue.post(Box::new(move || *flag.lock().unwrap() = true));

    assert!(!*ran.lock().unwrap());
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.dispatch(), 1);
    assert!(*ran.lock().unwrap());
    assert!(queue.is_empty());
}

#[test]
fn test_dispatch_preserves_order() {
    let queue = MainThreadQueue::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let order = order.clone();
        queue.post(Box::new(move || order.lock().unwrap().push(i)));
    }

    queue.dispatch();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_task_posted_during_dispatch_runs_next_time() {
    let queue = Arc::new(MainThreadQueue::new());
    let count = Arc::new(Mutex::new(0));

    let inner_queue = queue.clone();
    let inner_count = count.clone();
    queue.post(Box::new(move || {
        *inner_count.lock().unwrap() += 1;
        let again = inner_count.clone();
        inner_queue.post(Box::new(move || *again.lock().unwrap() += 10));
    }));

    assert_eq!(queue.dispatch(), 1);
    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(queue.dispatch(), 1);
    assert_eq!(*count.lock().unwrap(), 11);
}

// ============================================================================
// Tile
// ============================================================================

#[test]
fn test_render_node_requires_done_state() {
    let key = TileNodeKey::from(KeyData::from_ffi(1));
    let mut tile = Tile::new(TileId(4));
    tile.render_content = Some(TileRenderContent {
        render_resources: Some(key),
        lod_transition_fade_percentage: 0.5,
    });

    tile.load_state = TileLoadState::ContentLoaded;
    assert_eq!(tile.render_node(), None);

    tile.load_state = TileLoadState::Done;
    assert_eq!(tile.render_node(), Some(key));
    assert_eq!(tile.fade_percentage(), Some(0.5));
}

#[test]
fn test_tile_id_display() {
    assert_eq!(TileId(12).to_string(), "tile#12");
}
