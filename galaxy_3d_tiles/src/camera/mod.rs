//! Camera module - viewpoint collection and dataset-space view states.
//!
//! Cameras are rebuilt every frame from the host's viewers, captures,
//! tool viewports and explicitly registered cameras. They are never
//! persisted.

mod camera;
mod view_state;
mod camera_collector;
mod camera_registry;
mod providers;

pub use camera::Camera;
pub use view_state::{ViewState, build_view_state};
pub use camera_collector::{CameraCollector, CameraCollectionContext, CameraProvider, CameraSource};
pub use camera_registry::CameraRegistry;
pub use providers::{
    PlayerViewProvider, PlayerViewer, StereoEye, StereoRendering,
    SceneCaptureProvider, SceneCapture,
    ToolViewportProvider, ToolViewport,
};
