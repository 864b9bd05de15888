/// CameraCollector - gathers every active viewpoint once per frame.
///
/// Sources are concatenated in `CameraSource` order: primary viewers,
/// scene captures, tool viewports, then registered cameras. Within one
/// source, built-in providers come before host-supplied ones. Degenerate
/// cameras are dropped.

use super::camera::Camera;
use super::camera_registry::CameraRegistry;
use super::providers::{PlayerViewProvider, SceneCaptureProvider, ToolViewportProvider};

/// Priority of a camera source (lowest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CameraSource {
    PrimaryViewer,
    SecondaryCapture,
    ToolViewport,
    Registered,
}

impl CameraSource {
    pub const ALL: [CameraSource; 4] = [
        CameraSource::PrimaryViewer,
        CameraSource::SecondaryCapture,
        CameraSource::ToolViewport,
        CameraSource::Registered,
    ];
}

/// Host context for one collection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraCollectionContext {
    /// Divide viewport sizes by the display's DPI scale
    pub scale_using_dpi: bool,
    /// Running inside an authoring tool
    pub authoring_context: bool,
    /// Simulation (play mode) is running
    pub live_simulation: bool,
    /// World units per meter, for stereo eye offsets
    pub world_to_meters: f64,
}

impl Default for CameraCollectionContext {
    fn default() -> Self {
        Self {
            scale_using_dpi: true,
            authoring_context: false,
            live_simulation: true,
            world_to_meters: 100.0,
        }
    }
}

/// Source of cameras for one collection pass
pub trait CameraProvider: Send + Sync {
    fn source(&self) -> CameraSource;

    /// Append this provider's cameras
    fn collect_cameras(&self, context: &CameraCollectionContext, cameras: &mut Vec<Camera>);
}

#[derive(Default)]
pub struct CameraCollector {
    player_views: PlayerViewProvider,
    scene_captures: SceneCaptureProvider,
    tool_viewports: ToolViewportProvider,
    registry: CameraRegistry,
    custom: Vec<Box<dyn CameraProvider>>,
}

impl CameraCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host-defined provider, collected after the built-in one of its source
    pub fn add_provider(&mut self, provider: Box<dyn CameraProvider>) {
        self.custom.push(provider);
    }

    /// All cameras of this frame, in priority order, degenerate ones removed
    pub fn collect(&self, context: &CameraCollectionContext) -> Vec<Camera> {
        let mut cameras = Vec::new();

        for source in CameraSource::ALL {
            self.builtin(source).collect_cameras(context, &mut cameras);
            for provider in self.custom.iter().filter(|p| p.source() == source) {
                provider.collect_cameras(context, &mut cameras);
            }
        }

        cameras.retain(|camera| !camera.is_degenerate());
        cameras
    }

    fn builtin(&self, source: CameraSource) -> &dyn CameraProvider {
        match source {
            CameraSource::PrimaryViewer => &self.player_views,
            CameraSource::SecondaryCapture => &self.scene_captures,
            CameraSource::ToolViewport => &self.tool_viewports,
            CameraSource::Registered => &self.registry,
        }
    }

    // ===== PROVIDER ACCESS =====

    pub fn player_views_mut(&mut self) -> &mut PlayerViewProvider {
        &mut self.player_views
    }

    pub fn scene_captures_mut(&mut self) -> &mut SceneCaptureProvider {
        &mut self.scene_captures
    }

    pub fn tool_viewports_mut(&mut self) -> &mut ToolViewportProvider {
        &mut self.tool_viewports
    }

    pub fn registry(&self) -> &CameraRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CameraRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
#[path = "camera_collector_tests.rs"]
mod tests;
