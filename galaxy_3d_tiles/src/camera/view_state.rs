/// ViewState - a camera expressed in dataset space, as consumed by the
/// selection engine.

use glam::{DMat3, DMat4, DVec2, DVec3};
use super::camera::Camera;

/// Renderer-agnostic view in dataset space.
///
/// `direction` and `up` are unit length and mutually orthogonal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub position: DVec3,
    pub direction: DVec3,
    pub up: DVec3,
    /// Effective viewport in pixels, after letterboxing
    pub viewport_size: DVec2,
    /// Radians
    pub horizontal_field_of_view: f64,
    /// Radians
    pub vertical_field_of_view: f64,
}

/// Build the dataset-space view of `camera`.
///
/// With an override aspect ratio, the axis carrying the larger black bar
/// is shrunk so the effective viewport matches the ratio. When both bars
/// are equal the viewport is kept as is.
pub fn build_view_state(camera: &Camera, world_to_dataset: &DMat4) -> ViewState {
    let horizontal_fov = camera.field_of_view_degrees().to_radians();
    let mut size = camera.viewport_size();

    let aspect_ratio = match camera.override_aspect_ratio() {
        Some(ratio) => {
            let computed_x = ratio * size.y;
            let computed_y = size.x / ratio;
            let bar_width = size.x - computed_x;
            let bar_height = size.y - computed_y;

            if bar_width > 0.0 && bar_width > bar_height {
                size.x = computed_x;
            } else if bar_height > 0.0 && bar_height > bar_width {
                size.y = computed_y;
            }
            ratio
        }
        None => size.x / size.y,
    };

    let vertical_fov = 2.0 * ((horizontal_fov * 0.5).tan() / aspect_ratio).atan();

    let linear = DMat3::from_mat4(*world_to_dataset);
    let position = world_to_dataset.transform_point3(camera.location());
    let direction = unit_or(linear * camera.forward(), DVec3::X);
    let up = orthogonal_up(direction, unit_or(linear * camera.up(), DVec3::Z));

    ViewState {
        position,
        direction,
        up,
        viewport_size: size,
        horizontal_field_of_view: horizontal_fov,
        vertical_field_of_view: vertical_fov,
    }
}

fn unit_or(v: DVec3, fallback: DVec3) -> DVec3 {
    let n = v.normalize_or_zero();
    if n == DVec3::ZERO { fallback } else { n }
}

/// Gram-Schmidt `up` against the unit `direction`
fn orthogonal_up(direction: DVec3, up: DVec3) -> DVec3 {
    let projected = (up - direction * up.dot(direction)).normalize_or_zero();
    if projected == DVec3::ZERO {
        direction.any_orthonormal_vector()
    } else {
        projected
    }
}

#[cfg(test)]
#[path = "view_state_tests.rs"]
mod tests;
