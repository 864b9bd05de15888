/// GraphicsDevice trait - factory for tile render resources

use std::sync::Arc;
use crate::error::Result;
use super::texture::{Texture, TextureDesc, CompressedFormats};
use super::mesh::{Mesh, MeshDesc, CollisionMesh, CollisionMeshDesc};

/// Factory interface for device resources.
///
/// Implemented per graphics backend. Only called from the main thread
/// (the main-thread halves of resource preparation); load-thread code
/// builds descriptors and never touches the device.
pub trait GraphicsDevice: Send + Sync {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a renderable mesh
    fn create_mesh(&mut self, desc: MeshDesc) -> Result<Arc<dyn Mesh>>;

    /// Cook a physics collision mesh
    fn create_collision_mesh(&mut self, desc: CollisionMeshDesc) -> Result<Arc<dyn CollisionMesh>>;

    /// Block-compressed formats this device can sample
    fn supported_compressed_formats(&self) -> CompressedFormats;
}
