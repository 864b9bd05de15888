//! Selection engine contract
//!
//! Interface of the external tile-selection engine and the host
//! collaborators it is constructed with.

mod tile;
mod selection_engine;
mod externals;

pub use tile::{Tile, TileId, TileLoadState, TileRenderContent};
pub use selection_engine::{
    SelectionEngine, SelectionOptions, SelectionStatistics, ViewUpdateResult,
    TilesetAttachment, AttachmentKind, LoadError, LoadRequestType, LoadErrorCallback,
};
pub use externals::{
    AssetAccessor, TaskProcessor, CreditSink, MainThreadQueue,
    TilesetExternals, TilesetSource, SelectionEngineFactory,
};

// Scripted selection engine for tests
#[cfg(test)]
pub mod mock_selection_engine;

#[cfg(test)]
#[path = "externals_tests.rs"]
mod externals_tests;
