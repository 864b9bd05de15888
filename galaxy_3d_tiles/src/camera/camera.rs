/// Camera - one viewpoint in world space, rebuilt every frame.
///
/// Local frame: forward is +X, up is +Z. The field of view is horizontal,
/// in degrees. An override aspect ratio requests letterboxing of the
/// viewport (see `build_view_state`).

use glam::{DQuat, DVec2, DVec3};

/// Viewpoint gathered from the host. A passive data container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    viewport_size: DVec2,
    location: DVec3,
    rotation: DQuat,
    field_of_view_degrees: f64,
    override_aspect_ratio: Option<f64>,
}

impl Camera {
    pub fn new(viewport_size: DVec2, location: DVec3, rotation: DQuat, field_of_view_degrees: f64) -> Self {
        Self {
            viewport_size,
            location,
            rotation,
            field_of_view_degrees,
            override_aspect_ratio: None,
        }
    }

    /// Same camera, constrained to `ratio` (width / height)
    pub fn with_override_aspect_ratio(mut self, ratio: f64) -> Self {
        self.override_aspect_ratio = Some(ratio);
        self
    }

    // ===== GETTERS =====

    /// Viewport size in pixels (fractional after DPI scaling)
    pub fn viewport_size(&self) -> DVec2 {
        self.viewport_size
    }

    pub fn location(&self) -> DVec3 {
        self.location
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// Horizontal field of view, degrees
    pub fn field_of_view_degrees(&self) -> f64 {
        self.field_of_view_degrees
    }

    pub fn override_aspect_ratio(&self) -> Option<f64> {
        self.override_aspect_ratio
    }

    /// World-space forward direction
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// World-space up direction
    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// True when the viewport is smaller than one pixel on either axis
    pub fn is_degenerate(&self) -> bool {
        is_degenerate_size(self.viewport_size)
    }

    // ===== SETTERS =====

    pub fn set_viewport_size(&mut self, size: DVec2) {
        self.viewport_size = size;
    }

    pub fn set_location(&mut self, location: DVec3) {
        self.location = location;
    }

    pub fn set_rotation(&mut self, rotation: DQuat) {
        self.rotation = rotation;
    }

    pub fn set_field_of_view_degrees(&mut self, degrees: f64) {
        self.field_of_view_degrees = degrees;
    }

    pub fn set_override_aspect_ratio(&mut self, ratio: Option<f64>) {
        self.override_aspect_ratio = ratio;
    }
}

/// Viewport smaller than one pixel in either axis (NaN included)
pub(crate) fn is_degenerate_size(size: DVec2) -> bool {
    !(size.x >= 1.0 && size.y >= 1.0)
}

/// Orientation looking along `direction`, without roll
pub(crate) fn rotation_from_direction(direction: DVec3) -> DQuat {
    let yaw = direction.y.atan2(direction.x);
    let pitch = direction.z.atan2(direction.truncate().length());
    DQuat::from_rotation_z(yaw) * DQuat::from_rotation_y(-pitch)
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
