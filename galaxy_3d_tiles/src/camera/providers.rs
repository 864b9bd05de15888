/// Built-in camera providers: primary viewers (with stereo), scene
/// captures and tool viewports.
///
/// The host refreshes each provider's viewpoint list every frame before
/// `Tileset::tick`.

use std::sync::Arc;
use glam::{DMat4, DQuat, DVec2, DVec3};
use super::camera::{Camera, is_degenerate_size, rotation_from_direction};
use super::camera_collector::{CameraCollectionContext, CameraProvider, CameraSource};

// ============================================================================
// Primary viewers
// ============================================================================

/// Eye of a stereo device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoEye {
    Left,
    Right,
}

/// Stereo rendering device (head-mounted display)
pub trait StereoRendering: Send + Sync {
    fn is_stereo_enabled(&self) -> bool;

    /// Viewport of `eye` given the full viewer viewport
    fn adjust_view_rect(&self, eye: StereoEye, viewport_size: DVec2) -> DVec2;

    /// Eye pose given the viewer pose
    fn calculate_eye_view_offset(
        &self,
        eye: StereoEye,
        location: DVec3,
        rotation: DQuat,
        world_to_meters: f64,
    ) -> (DVec3, DQuat);

    fn eye_projection_matrix(&self, eye: StereoEye) -> DMat4;
}

/// An active primary viewer (player view)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerViewer {
    pub viewport_size: DVec2,
    pub location: DVec3,
    pub rotation: DQuat,
    pub field_of_view_degrees: f64,
    /// UI scale of the viewer's display
    pub dpi_scale: f64,
}

/// One camera per primary viewer, or one per eye in stereo mode
#[derive(Default)]
pub struct PlayerViewProvider {
    viewers: Vec<PlayerViewer>,
    stereo: Option<Arc<dyn StereoRendering>>,
}

impl PlayerViewProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewers(&mut self, viewers: Vec<PlayerViewer>) {
        self.viewers = viewers;
    }

    pub fn set_stereo_rendering(&mut self, stereo: Option<Arc<dyn StereoRendering>>) {
        self.stereo = stereo;
    }

    fn push_eye(
        stereo: &dyn StereoRendering,
        eye: StereoEye,
        viewer: &PlayerViewer,
        world_to_meters: f64,
        cameras: &mut Vec<Camera>,
    ) {
        let size = stereo.adjust_view_rect(eye, viewer.viewport_size);
        if is_degenerate_size(size) {
            return;
        }
        let (location, rotation) = stereo.calculate_eye_view_offset(
            eye, viewer.location, viewer.rotation, world_to_meters,
        );
        let one_over_tan_half_fov = stereo.eye_projection_matrix(eye).x_axis.x;
        let fov = (2.0 * (1.0 / one_over_tan_half_fov).atan()).to_degrees();
        cameras.push(Camera::new(size, location, rotation, fov));
    }
}

impl CameraProvider for PlayerViewProvider {
    fn source(&self) -> CameraSource {
        CameraSource::PrimaryViewer
    }

    fn collect_cameras(&self, context: &CameraCollectionContext, cameras: &mut Vec<Camera>) {
        let stereo = self.stereo.as_deref().filter(|s| s.is_stereo_enabled());

        for viewer in &self.viewers {
            if is_degenerate_size(viewer.viewport_size) {
                continue;
            }
            match stereo {
                Some(stereo) => {
                    for eye in [StereoEye::Left, StereoEye::Right] {
                        Self::push_eye(stereo, eye, viewer, context.world_to_meters, cameras);
                    }
                }
                None => {
                    let mut size = viewer.viewport_size;
                    if context.scale_using_dpi && viewer.dpi_scale > 0.0 {
                        size /= viewer.dpi_scale;
                    }
                    cameras.push(Camera::new(
                        size, viewer.location, viewer.rotation, viewer.field_of_view_degrees,
                    ));
                }
            }
        }
    }
}

// ============================================================================
// Scene captures
// ============================================================================

/// Secondary viewpoint rendering into a target (scene capture)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCapture {
    pub active: bool,
    /// None without a render target
    pub target_size: Option<DVec2>,
    pub perspective: bool,
    pub location: DVec3,
    pub rotation: DQuat,
    pub field_of_view_degrees: f64,
}

#[derive(Debug, Default)]
pub struct SceneCaptureProvider {
    captures: Vec<SceneCapture>,
}

impl SceneCaptureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_captures(&mut self, captures: Vec<SceneCapture>) {
        self.captures = captures;
    }
}

impl CameraProvider for SceneCaptureProvider {
    fn source(&self) -> CameraSource {
        CameraSource::SecondaryCapture
    }

    fn collect_cameras(&self, _context: &CameraCollectionContext, cameras: &mut Vec<Camera>) {
        for capture in &self.captures {
            if !capture.active || !capture.perspective {
                continue;
            }
            let Some(size) = capture.target_size else { continue };
            if is_degenerate_size(size) {
                continue;
            }
            cameras.push(Camera::new(
                size, capture.location, capture.rotation, capture.field_of_view_degrees,
            ));
        }
    }
}

// ============================================================================
// Tool viewports
// ============================================================================

/// Editor/tool viewport, only considered in an authoring context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolViewport {
    pub visible: bool,
    pub realtime: bool,
    pub perspective: bool,
    pub viewport_size: DVec2,
    pub location: DVec3,
    pub rotation: DQuat,
    /// Set for orbit cameras; orientation then looks at this point
    pub orbit_look_at: Option<DVec3>,
    pub field_of_view_degrees: f64,
    /// Width / height constraint of the viewport, if any
    pub aspect_ratio_constraint: Option<f64>,
    pub dpi_scale: f64,
}

#[derive(Debug, Default)]
pub struct ToolViewportProvider {
    viewports: Vec<ToolViewport>,
}

impl ToolViewportProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewports(&mut self, viewports: Vec<ToolViewport>) {
        self.viewports = viewports;
    }
}

impl CameraProvider for ToolViewportProvider {
    fn source(&self) -> CameraSource {
        CameraSource::ToolViewport
    }

    fn collect_cameras(&self, context: &CameraCollectionContext, cameras: &mut Vec<Camera>) {
        if !context.authoring_context || context.live_simulation {
            return;
        }

        for viewport in &self.viewports {
            if !viewport.visible || !viewport.realtime || !viewport.perspective {
                continue;
            }
            if is_degenerate_size(viewport.viewport_size) {
                continue;
            }

            let mut size = viewport.viewport_size;
            if context.scale_using_dpi && viewport.dpi_scale > 0.0 {
                size /= viewport.dpi_scale;
            }

            let rotation = match viewport.orbit_look_at {
                Some(target) => rotation_from_direction(target - viewport.location),
                None => viewport.rotation,
            };

            let camera = Camera::new(size, viewport.location, rotation, viewport.field_of_view_degrees);
            cameras.push(match viewport.aspect_ratio_constraint {
                Some(ratio) => camera.with_override_aspect_ratio(ratio),
                None => camera,
            });
        }
    }
}

#[cfg(test)]
#[path = "providers_tests.rs"]
mod tests;
