/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Mock resources count their destruction calls so tests can assert
/// exactly-once finalization, and can be held "not ready" to exercise
/// the deferred destruction path.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    GraphicsDevice, RenderResource, ResourceLifecycle,
    Texture, TextureDesc, TextureInfo, CompressedFormats,
    Mesh, MeshDesc, MeshInfo, CollisionMesh, CollisionMeshDesc,
};

// ============================================================================
// Shared destruction bookkeeping
// ============================================================================

#[derive(Debug)]
pub struct MockDestruction {
    pub ready: AtomicBool,
    pub begin_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
}

impl MockDestruction {
    fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            begin_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn begin_calls(&self) -> usize {
        self.begin_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub name: String,
    pub info: TextureInfo,
    pub lifecycle: ResourceLifecycle,
    pub destruction: MockDestruction,
}

impl MockTexture {
    pub fn from_desc(desc: &TextureDesc) -> Self {
        Self {
            name: desc.name.clone(),
            info: TextureInfo::from_desc(desc),
            lifecycle: ResourceLifecycle::new(),
            destruction: MockDestruction::new(),
        }
    }
}

impl RenderResource for MockTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &ResourceLifecycle {
        &self.lifecycle
    }

    fn begin_destroy(&self) {
        self.destruction.begin_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_ready_for_finish_destroy(&self) -> bool {
        self.destruction.ready.load(Ordering::SeqCst)
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn release_platform_data(&self) {
        self.destruction.release_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Mesh
// ============================================================================

#[derive(Debug)]
pub struct MockMesh {
    pub name: String,
    pub info: MeshInfo,
    pub lifecycle: ResourceLifecycle,
    pub destruction: MockDestruction,
}

impl MockMesh {
    pub fn from_desc(desc: &MeshDesc) -> Self {
        Self {
            name: desc.name.clone(),
            info: MeshInfo::from_desc(desc),
            lifecycle: ResourceLifecycle::new(),
            destruction: MockDestruction::new(),
        }
    }
}

impl RenderResource for MockMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &ResourceLifecycle {
        &self.lifecycle
    }

    fn begin_destroy(&self) {
        self.destruction.begin_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_ready_for_finish_destroy(&self) -> bool {
        self.destruction.ready.load(Ordering::SeqCst)
    }
}

impl Mesh for MockMesh {
    fn info(&self) -> &MeshInfo {
        &self.info
    }

    fn release_render_data(&self) {
        self.destruction.release_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock CollisionMesh
// ============================================================================

#[derive(Debug)]
pub struct MockCollisionMesh {
    pub name: String,
    pub triangles: usize,
    pub lifecycle: ResourceLifecycle,
    pub destruction: MockDestruction,
}

impl RenderResource for MockCollisionMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &ResourceLifecycle {
        &self.lifecycle
    }
}

impl CollisionMesh for MockCollisionMesh {
    fn triangle_count(&self) -> usize {
        self.triangles
    }

    fn clear_cooked_data(&self) {
        self.destruction.release_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that records every resource it creates
pub struct MockGraphicsDevice {
    pub textures: Arc<Mutex<Vec<Arc<MockTexture>>>>,
    pub meshes: Arc<Mutex<Vec<Arc<MockMesh>>>>,
    pub collision_meshes: Arc<Mutex<Vec<Arc<MockCollisionMesh>>>>,
    pub supported_formats: CompressedFormats,
    /// Make every texture creation fail
    pub fail_textures: bool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            textures: Arc::new(Mutex::new(Vec::new())),
            meshes: Arc::new(Mutex::new(Vec::new())),
            collision_meshes: Arc::new(Mutex::new(Vec::new())),
            supported_formats: CompressedFormats::BC1_RGB | CompressedFormats::BC3_RGBA,
            fail_textures: false,
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.lock().unwrap().len()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        if self.fail_textures {
            engine_bail!("galaxy3d::tiles::MockGraphicsDevice", "Texture '{}' rejected", desc.name);
        }
        let texture = Arc::new(MockTexture::from_desc(&desc));
        self.textures.lock().unwrap().push(texture.clone());
        Ok(texture)
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> Result<Arc<dyn Mesh>> {
        let mesh = Arc::new(MockMesh::from_desc(&desc));
        self.meshes.lock().unwrap().push(mesh.clone());
        Ok(mesh)
    }

    fn create_collision_mesh(&mut self, desc: CollisionMeshDesc) -> Result<Arc<dyn CollisionMesh>> {
        let mesh = Arc::new(MockCollisionMesh {
            name: desc.name.clone(),
            triangles: desc.triangles.len(),
            lifecycle: ResourceLifecycle::new(),
            destruction: MockDestruction::new(),
        });
        self.collision_meshes.lock().unwrap().push(mesh.clone());
        Ok(mesh)
    }

    fn supported_compressed_formats(&self) -> CompressedFormats {
        self.supported_formats
    }
}
