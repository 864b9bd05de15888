/// Tile bounding volumes in dataset space

use glam::{DMat3, DMat4, DVec3};

/// Bounding volume of a tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingVolume {
    /// Oriented box: center plus the three half-axis vectors (columns)
    OrientedBox { center: DVec3, half_axes: DMat3 },
    Sphere { center: DVec3, radius: f64 },
}

impl BoundingVolume {
    pub fn center(&self) -> DVec3 {
        match self {
            BoundingVolume::OrientedBox { center, .. } => *center,
            BoundingVolume::Sphere { center, .. } => *center,
        }
    }

    /// Apply an affine transform
    pub fn transformed(&self, matrix: &DMat4) -> BoundingVolume {
        let linear = DMat3::from_mat4(*matrix);
        match self {
            BoundingVolume::OrientedBox { center, half_axes } => BoundingVolume::OrientedBox {
                center: matrix.transform_point3(*center),
                half_axes: linear * *half_axes,
            },
            BoundingVolume::Sphere { center, radius } => {
                let scale = linear.x_axis.length()
                    .max(linear.y_axis.length())
                    .max(linear.z_axis.length());
                BoundingVolume::Sphere {
                    center: matrix.transform_point3(*center),
                    radius: radius * scale,
                }
            }
        }
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        BoundingVolume::Sphere { center: DVec3::ZERO, radius: 0.0 }
    }
}
