//! Tileset module
//!
//! The per-frame driver: configuration, engine lifecycle, frame
//! synchronization and load-failure notification.

mod config;
mod frame_synchronizer;
mod lifecycle;
mod load_failure;
mod tileset;

pub use config::TilesetConfig;
pub use frame_synchronizer::{FrameSettings, FrameSynchronizer};
pub use lifecycle::TilesetLifecycle;
pub use load_failure::{LoadFailureNotifier, SubscriptionId};
pub use tileset::{Tileset, TilesetServices};
