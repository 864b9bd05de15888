/// LoadedModel - load-thread result of preparing a tile model.
///
/// Built from `Model` content without touching the device: mesh and
/// collision descriptors, material parameters, and shared textures.
/// Moved into the main-thread phase, which creates the device resources.

use std::sync::Arc;
use glam::{DMat4, Vec2, Vec3, Vec4};
use crate::content::{FeatureIdSet, Material, Model, Primitive};
use crate::graphics_device::{CollisionMeshDesc, CompressedFormats, MeshDesc, TextureFilter};
use super::loaded_texture::{LoadedTexture, TextureCache, TextureSampling};

const SOURCE: &str = "galaxy3d::tiles::LoadedModel";

/// How models are turned into renderer resources
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrepareOptions {
    /// Generate tangents when the model has none
    pub always_include_tangents: bool,
    /// Cook collision meshes
    pub create_physics_meshes: bool,
    /// Render unlit materials as lit
    pub ignore_khr_materials_unlit: bool,
    /// Generated normals are smooth (shared vertices) instead of flat
    pub generate_smooth_normals: bool,
    /// Upload feature ID and property textures
    pub encode_features: bool,
    pub texture_filter: TextureFilter,
    pub use_mipmaps: bool,
    /// Compressed formats the device can sample
    pub supported_formats: CompressedFormats,
}

impl Default for ModelPrepareOptions {
    fn default() -> Self {
        Self {
            always_include_tangents: false,
            create_physics_meshes: true,
            ignore_khr_materials_unlit: false,
            generate_smooth_normals: false,
            encode_features: true,
            texture_filter: TextureFilter::Bilinear,
            use_mipmaps: true,
            supported_formats: CompressedFormats::all(),
        }
    }
}

/// Material of a loaded primitive
#[derive(Debug, Clone)]
pub struct LoadedMaterial {
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<Arc<LoadedTexture>>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub unlit: bool,
    pub double_sided: bool,
}

impl Default for LoadedMaterial {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            metallic_factor: 0.0,
            roughness_factor: 1.0,
            unlit: false,
            double_sided: false,
        }
    }
}

/// One primitive ready for device creation
#[derive(Debug)]
pub struct LoadedPrimitive {
    pub mesh: MeshDesc,
    pub collision: Option<CollisionMeshDesc>,
    pub material: LoadedMaterial,
    pub feature_textures: Vec<Arc<LoadedTexture>>,
}

/// Load-thread result for one tile
#[derive(Debug)]
pub struct LoadedModel {
    pub(crate) transform: DMat4,
    pub(crate) primitives: Vec<LoadedPrimitive>,
}

impl LoadedModel {
    /// Convert `model`. Invalid primitives and textures are logged and skipped.
    pub fn build(model: &Model, transform: DMat4, options: &ModelPrepareOptions) -> Self {
        let mut caches = TextureCaches::default();
        let primitives = model.primitives
            .iter()
            .enumerate()
            .filter_map(|(index, primitive)| load_primitive(model, index, primitive, options, &mut caches))
            .collect();
        Self { transform, primitives }
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    pub fn primitives(&self) -> &[LoadedPrimitive] {
        &self.primitives
    }

    /// Distinct textures referenced by this model
    pub fn texture_count(&self) -> usize {
        let mut seen: Vec<*const LoadedTexture> = Vec::new();
        for primitive in &self.primitives {
            let textures = primitive.material.base_color_texture.iter().chain(&primitive.feature_textures);
            for texture in textures {
                let ptr = Arc::as_ptr(texture);
                if !seen.contains(&ptr) {
                    seen.push(ptr);
                }
            }
        }
        seen.len()
    }
}

// ============================================================================
// Primitive conversion
// ============================================================================

/// Color and feature data never share a texture: they sample the same
/// image differently.
#[derive(Default)]
struct TextureCaches {
    material: TextureCache,
    features: TextureCache,
}

fn load_primitive(
    model: &Model,
    index: usize,
    primitive: &Primitive,
    options: &ModelPrepareOptions,
    caches: &mut TextureCaches,
) -> Option<LoadedPrimitive> {
    if primitive.positions.is_empty() || primitive.triangle_count() == 0 {
        crate::engine_debug!(SOURCE, "Primitive {} has no triangles, skipped", index);
        return None;
    }

    let vertex_count = primitive.positions.len();
    let indices: Vec<u32> = match &primitive.indices {
        Some(indices) => {
            if indices.iter().any(|&i| i as usize >= vertex_count) {
                crate::engine_warn!(SOURCE, "Primitive {} has out-of-range indices, skipped", index);
                return None;
            }
            indices[..indices.len() - indices.len() % 3].to_vec()
        }
        None => (0..(vertex_count - vertex_count % 3) as u32).collect(),
    };

    let mut mesh = MeshDesc {
        name: format!("primitive {index}"),
        positions: primitive.positions.clone(),
        normals: Vec::new(),
        tangents: Vec::new(),
        tex_coords: primitive.tex_coords.iter()
            .filter(|set| set.len() == vertex_count)
            .cloned()
            .collect(),
        indices,
    };

    if let Some(tangents) = primitive.tangents.as_ref().filter(|t| t.len() == vertex_count) {
        mesh.tangents = tangents.clone();
    }

    match &primitive.normals {
        Some(normals) if normals.len() == vertex_count => mesh.normals = normals.clone(),
        _ if options.generate_smooth_normals => mesh.normals = smooth_normals(&mesh.positions, &mesh.indices),
        _ => {
            // Flat shading needs one vertex per triangle corner
            mesh = deindex(mesh);
            mesh.normals = flat_normals(&mesh.positions);
        }
    }

    if mesh.tangents.is_empty() && options.always_include_tangents {
        mesh.tangents = generate_tangents(&mesh);
    }

    let collision = options.create_physics_meshes.then(|| collision_desc(&mesh));

    let material = primitive.material
        .and_then(|m| model.materials.get(m))
        .map(|m| load_material(model, m, options, &mut caches.material))
        .unwrap_or_default();

    let feature_textures = if options.encode_features {
        feature_textures(model, primitive, options, &mut caches.features)
    } else {
        Vec::new()
    };

    Some(LoadedPrimitive { mesh, collision, material, feature_textures })
}

fn load_material(
    model: &Model,
    material: &Material,
    options: &ModelPrepareOptions,
    cache: &mut TextureCache,
) -> LoadedMaterial {
    let base_color_texture = material.base_color_texture.and_then(|texture_ref| {
        let image = model.image(texture_ref.image)?;
        let sampling = TextureSampling::material(options.texture_filter, options.use_mipmaps);
        cache.get_or_load(texture_ref.image, image, sampling, options.supported_formats).ok()
    });

    LoadedMaterial {
        base_color_factor: material.base_color_factor,
        base_color_texture,
        metallic_factor: material.metallic_factor,
        roughness_factor: material.roughness_factor,
        unlit: material.unlit && !options.ignore_khr_materials_unlit,
        double_sided: material.double_sided,
    }
}

/// Feature ID textures of the primitive, then the model's property textures
fn feature_textures(
    model: &Model,
    primitive: &Primitive,
    options: &ModelPrepareOptions,
    cache: &mut TextureCache,
) -> Vec<Arc<LoadedTexture>> {
    let feature_images = primitive.feature_id_sets.iter().filter_map(|set| match set {
        FeatureIdSet::Texture { image, .. } => Some(*image),
        _ => None,
    });
    let property_images = model.property_textures
        .iter()
        .flat_map(|texture| texture.properties.iter().map(|p| p.image));

    let mut textures: Vec<Arc<LoadedTexture>> = Vec::new();
    for index in feature_images.chain(property_images) {
        let Some(image) = model.image(index) else {
            crate::engine_warn!(SOURCE, "Feature texture references missing image {}", index);
            continue;
        };
        let Ok(texture) = cache.get_or_load(index, image, TextureSampling::feature_data(), options.supported_formats) else {
            continue;
        };
        if !textures.iter().any(|t| Arc::ptr_eq(t, &texture)) {
            textures.push(texture);
        }
    }
    textures
}

// ============================================================================
// Geometry helpers
// ============================================================================

/// One vertex per index, indices become 0..n
fn deindex(mesh: MeshDesc) -> MeshDesc {
    let pick3 = |v: &[Vec3]| mesh.indices.iter().map(|&i| v[i as usize]).collect::<Vec<_>>();
    let positions = pick3(&mesh.positions);
    let normals = if mesh.normals.is_empty() { Vec::new() } else { pick3(&mesh.normals) };
    let tangents = if mesh.tangents.is_empty() {
        Vec::new()
    } else {
        mesh.indices.iter().map(|&i| mesh.tangents[i as usize]).collect()
    };
    let tex_coords = mesh.tex_coords
        .iter()
        .map(|set| mesh.indices.iter().map(|&i| set[i as usize]).collect::<Vec<Vec2>>())
        .collect();
    let indices = (0..positions.len() as u32).collect();

    MeshDesc { name: mesh.name, positions, normals, tangents, tex_coords, indices }
}

/// Face normal per corner of a de-indexed triangle list
fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    positions
        .chunks_exact(3)
        .flat_map(|tri| {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            let normal = if normal == Vec3::ZERO { Vec3::Z } else { normal };
            [normal; 3]
        })
        .collect()
}

/// Area-weighted vertex normals
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { Vec3::Z } else { n }
        })
        .collect()
}

/// Per-vertex tangents from the first texture coordinate set.
///
/// Without texture coordinates any direction orthogonal to the normal
/// is used.
fn generate_tangents(mesh: &MeshDesc) -> Vec<Vec4> {
    let Some(uvs) = mesh.tex_coords.first() else {
        return mesh.normals.iter().map(|n| n.any_orthonormal_vector().extend(1.0)).collect();
    };

    let mut tangents = vec![Vec3::ZERO; mesh.positions.len()];
    let mut bitangents = vec![Vec3::ZERO; mesh.positions.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let e1 = mesh.positions[b] - mesh.positions[a];
        let e2 = mesh.positions[c] - mesh.positions[a];
        let d1 = uvs[b] - uvs[a];
        let d2 = uvs[c] - uvs[a];
        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let t = (e1 * d2.y - e2 * d1.y) * r;
        let bt = (e2 * d1.x - e1 * d2.x) * r;
        for v in [a, b, c] {
            tangents[v] += t;
            bitangents[v] += bt;
        }
    }

    mesh.normals
        .iter()
        .zip(tangents.iter().zip(&bitangents))
        .map(|(&n, (&t, &bt))| {
            let t = (t - n * n.dot(t)).normalize_or_zero();
            let t = if t == Vec3::ZERO { n.any_orthonormal_vector() } else { t };
            let w = if n.cross(t).dot(bt) < 0.0 { -1.0 } else { 1.0 };
            t.extend(w)
        })
        .collect()
}

/// Collision triangles, degenerate ones removed
fn collision_desc(mesh: &MeshDesc) -> CollisionMeshDesc {
    let triangles = mesh.indices
        .chunks_exact(3)
        .map(|tri| [tri[0], tri[1], tri[2]])
        .filter(|[a, b, c]| {
            let [pa, pb, pc] = [mesh.positions[*a as usize], mesh.positions[*b as usize], mesh.positions[*c as usize]];
            (pb - pa).cross(pc - pa).length_squared() > 0.0
        })
        .collect();

    CollisionMeshDesc {
        name: format!("{} collision", mesh.name),
        vertices: mesh.positions.clone(),
        triangles,
    }
}

#[cfg(test)]
#[path = "loaded_model_tests.rs"]
mod tests;
