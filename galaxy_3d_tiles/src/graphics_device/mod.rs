/// Graphics device module - device resource traits and descriptors

pub mod graphics_device;
pub mod render_resource;
pub mod texture;
pub mod mesh;

pub use graphics_device::*;
pub use render_resource::*;
pub use texture::*;
pub use mesh::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
