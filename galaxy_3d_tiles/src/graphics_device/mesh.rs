/// Mesh and collision mesh traits and descriptors

use glam::{Vec2, Vec3, Vec4};
use super::render_resource::RenderResource;

// ===== MESH DESC =====

/// Descriptor for creating a renderable mesh.
///
/// Vertex attributes are stored as separate streams; `interleaved_vertex_bytes`
/// packs them for backends that want a single vertex buffer.
#[derive(Debug, Clone, Default)]
pub struct MeshDesc {
    /// Debug name
    pub name: String,
    /// Positions, relative to the tile transform
    pub positions: Vec<Vec3>,
    /// Normals (same length as positions)
    pub normals: Vec<Vec3>,
    /// Tangents, xyz + handedness (empty when not requested)
    pub tangents: Vec<Vec4>,
    /// One stream per texture coordinate set
    pub tex_coords: Vec<Vec<Vec2>>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshDesc {
    /// Bytes per interleaved vertex for this layout
    pub fn vertex_stride(&self) -> usize {
        let mut stride = std::mem::size_of::<Vec3>() * 2;
        if !self.tangents.is_empty() {
            stride += std::mem::size_of::<Vec4>();
        }
        stride + self.tex_coords.len() * std::mem::size_of::<Vec2>()
    }

    /// Pack all streams into one interleaved vertex buffer
    /// (position, normal, [tangent], uv0..uvN).
    pub fn interleaved_vertex_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.positions.len() * self.vertex_stride());
        for (i, position) in self.positions.iter().enumerate() {
            bytes.extend_from_slice(bytemuck::bytes_of(position));
            let normal = self.normals.get(i).copied().unwrap_or(Vec3::Z);
            bytes.extend_from_slice(bytemuck::bytes_of(&normal));
            if !self.tangents.is_empty() {
                let tangent = self.tangents.get(i).copied().unwrap_or(Vec4::X);
                bytes.extend_from_slice(bytemuck::bytes_of(&tangent));
            }
            for set in &self.tex_coords {
                let uv = set.get(i).copied().unwrap_or(Vec2::ZERO);
                bytes.extend_from_slice(bytemuck::bytes_of(&uv));
            }
        }
        bytes
    }
}

/// Read-only properties of a created mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshInfo {
    pub vertex_count: u32,
    pub index_count: u32,
    pub tex_coord_sets: u32,
}

impl MeshInfo {
    pub fn from_desc(desc: &MeshDesc) -> Self {
        Self {
            vertex_count: desc.positions.len() as u32,
            index_count: desc.indices.len() as u32,
            tex_coord_sets: desc.tex_coords.len() as u32,
        }
    }
}

/// Renderable mesh resource trait
pub trait Mesh: RenderResource {
    fn info(&self) -> &MeshInfo;

    /// Free vertex/index buffers. Called once, on final destruction.
    fn release_render_data(&self);
}

// ===== COLLISION MESH =====

/// Descriptor for creating a physics collision mesh
#[derive(Debug, Clone, Default)]
pub struct CollisionMeshDesc {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

/// Cooked physics mesh resource trait
pub trait CollisionMesh: RenderResource {
    fn triangle_count(&self) -> usize;

    /// Drop cooked physics caches. Called once, on final destruction.
    fn clear_cooked_data(&self);
}
