/*!
# Galaxy 3D Tiles

Frame synchronization and resource preparation for streamed 3D tiles.

An external selection engine decides which tiles to render for a set of
views; this crate turns tile content into device resources and scene
nodes, feeds the engine cameras and occlusion results, and applies its
per-frame decisions to the scene.

## Architecture

- **Tileset**: per-frame driver ticked by the host
- **CameraCollector**: viewpoints from viewers, captures, tool viewports and registered cameras
- **FrameSynchronizer**: show/hide/fade/collision and load progress
- **TileResourcePreparer**: two-phase tile content to device resource conversion
- **OcclusionProxyPool**: reusable per-tile occlusion query proxies
- **AmortizedDestructor**: deferred destruction of released device resources
- **GraphicsDevice**: device resource creation trait implemented by the host renderer
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod content;
pub mod scene;
pub mod lifetime;
pub mod selection;
pub mod occlusion;
pub mod preparer;
pub mod camera;
pub mod tileset;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device resource traits and descriptors
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Tile content payloads
    pub mod content {
        pub use crate::content::*;
    }

    // Scene nodes
    pub mod scene {
        pub use crate::scene::*;
    }

    // Tiles pipeline
    pub mod tiles {
        pub use crate::camera::*;
        pub use crate::lifetime::*;
        pub use crate::occlusion::*;
        pub use crate::preparer::*;
        pub use crate::selection::*;
        pub use crate::tileset::*;
    }
}

// Re-export math library at crate root
pub use glam;
