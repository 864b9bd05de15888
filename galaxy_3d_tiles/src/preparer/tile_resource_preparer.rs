/// TileResourcePreparer - PrepareRendererResources backed by a
/// GraphicsDevice, a Scene and an AmortizedDestructor.

use std::any::Any;
use std::sync::{Arc, Mutex, RwLock};
use glam::{DMat4, DVec2};
use crate::content::{ImageData, TileContent};
use crate::graphics_device::{GraphicsDevice, Texture, TextureAddress};
use crate::lifetime::{AmortizedDestructor, DestroyableResource};
use crate::scene::{MaterialInstance, OverlayLayer, Scene, TileMesh, TileNode, TileNodeKey};
use crate::selection::Tile;
use super::loaded_model::{LoadedModel, LoadedPrimitive, ModelPrepareOptions};
use super::loaded_texture::{LoadedTexture, TextureSampling};
use super::prepare_renderer_resources::{
    PrepareRendererResources, RasterOverlayTile, RasterRendererOptions,
};

const SOURCE: &str = "galaxy3d::tiles::TileResourcePreparer";

pub struct TileResourcePreparer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    scene: Arc<Mutex<Scene>>,
    destructor: Arc<Mutex<AmortizedDestructor>>,
    /// Used when the engine passes no ModelPrepareOptions of its own
    model_options: RwLock<ModelPrepareOptions>,
}

impl TileResourcePreparer {
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        scene: Arc<Mutex<Scene>>,
        destructor: Arc<Mutex<AmortizedDestructor>>,
    ) -> Self {
        Self {
            device,
            scene,
            destructor,
            model_options: RwLock::new(ModelPrepareOptions::default()),
        }
    }

    pub fn model_options(&self) -> ModelPrepareOptions {
        self.model_options.read().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn set_model_options(&self, options: ModelPrepareOptions) {
        if let Ok(mut current) = self.model_options.write() {
            *current = options;
        }
    }

    pub fn scene(&self) -> &Arc<Mutex<Scene>> {
        &self.scene
    }

    fn create_tile_mesh(
        device: &mut dyn GraphicsDevice,
        tile: &Tile,
        primitive: LoadedPrimitive,
    ) -> Option<TileMesh> {
        let mesh = match device.create_mesh(primitive.mesh) {
            Ok(mesh) => mesh,
            Err(e) => {
                crate::engine_error!(SOURCE, "{}: mesh creation failed: {}", tile.id, e);
                return None;
            }
        };

        let collision = primitive.collision.and_then(|desc| {
            device.create_collision_mesh(desc)
                .map_err(|e| crate::engine_warn!(SOURCE, "{}: collision mesh skipped: {}", tile.id, e))
                .ok()
        });

        let base_color_texture = primitive.material.base_color_texture
            .and_then(|texture| Self::create_texture(device, tile, &texture));
        let feature_textures = primitive.feature_textures
            .iter()
            .filter_map(|texture| Self::create_texture(device, tile, texture))
            .collect();

        let material = MaterialInstance {
            base_color_factor: primitive.material.base_color_factor,
            base_color_texture,
            metallic_factor: primitive.material.metallic_factor,
            roughness_factor: primitive.material.roughness_factor,
            unlit: primitive.material.unlit,
            double_sided: primitive.material.double_sided,
        };

        Some(TileMesh { mesh, collision, material, feature_textures })
    }

    fn create_texture(
        device: &mut dyn GraphicsDevice,
        tile: &Tile,
        texture: &LoadedTexture,
    ) -> Option<Arc<dyn Texture>> {
        texture.create_gpu(device)
            .map_err(|e| crate::engine_warn!(SOURCE, "{}: texture '{}' skipped: {}", tile.id, texture.name(), e))
            .ok()
    }
}

impl PrepareRendererResources for TileResourcePreparer {
    fn prepare_in_load_thread(
        &self,
        content: &TileContent,
        transform: &DMat4,
        options: &dyn Any,
    ) -> Option<LoadedModel> {
        let model = content.model()?;
        let loaded = match options.downcast_ref::<ModelPrepareOptions>() {
            Some(options) => LoadedModel::build(model, *transform, options),
            None => LoadedModel::build(model, *transform, &self.model_options()),
        };
        Some(loaded)
    }

    fn prepare_in_main_thread(&self, tile: &Tile, loaded: LoadedModel) -> Option<TileNodeKey> {
        let meshes: Vec<TileMesh> = {
            let mut device = match self.device.lock() {
                Ok(device) => device,
                Err(_) => {
                    crate::engine_error!(SOURCE, "{}: graphics device lock poisoned", tile.id);
                    return None;
                }
            };
            loaded.primitives
                .into_iter()
                .filter_map(|primitive| Self::create_tile_mesh(&mut *device, tile, primitive))
                .collect()
        };

        let mut scene = match self.scene.lock() {
            Ok(scene) => scene,
            Err(_) => {
                crate::engine_error!(SOURCE, "{}: scene lock poisoned", tile.id);
                return None;
            }
        };
        let key = scene.insert_node(TileNode::new(tile.id, loaded.transform, meshes));
        crate::engine_trace!(SOURCE, "{}: prepared node {:?}", tile.id, key);
        Some(key)
    }

    fn free(&self, tile: &Tile, load_thread: Option<LoadedModel>, main_thread: Option<TileNodeKey>) {
        drop(load_thread);

        let Some(key) = main_thread else { return };
        let node = match self.scene.lock() {
            Ok(mut scene) => scene.remove_node(key),
            Err(_) => None,
        };
        let Some(node) = node else {
            crate::engine_warn!(SOURCE, "{}: node {:?} already gone", tile.id, key);
            return;
        };
        if let Ok(mut destructor) = self.destructor.lock() {
            destructor.destroy_tile_node(node);
        }
    }

    fn prepare_raster_in_load_thread(&self, image: &ImageData, options: &dyn Any) -> Option<LoadedTexture> {
        let Some(options) = options.downcast_ref::<RasterRendererOptions>() else {
            crate::engine_error!(SOURCE, "Raster preparation called without RasterRendererOptions");
            return None;
        };

        let sampling = TextureSampling {
            filter: options.filter,
            group: options.group,
            address_u: TextureAddress::Clamp,
            address_v: TextureAddress::Clamp,
            use_mipmaps: options.use_mipmaps,
            srgb: true,
        };
        LoadedTexture::from_image("raster overlay", image, sampling, options.supported_formats).ok()
    }

    fn prepare_raster_in_main_thread(
        &self,
        raster_tile: &RasterOverlayTile,
        loaded: LoadedTexture,
    ) -> Option<Arc<dyn Texture>> {
        // The image may have been replaced since the load-thread phase
        loaded.rebind_image(&raster_tile.image).ok()?;

        let mut device = self.device.lock().ok()?;
        loaded.create_gpu(&mut *device)
            .map_err(|e| crate::engine_warn!(SOURCE, "Raster tile {}: texture skipped: {}", raster_tile.id, e))
            .ok()
    }

    fn free_raster(
        &self,
        _raster_tile: &RasterOverlayTile,
        load_thread: Option<LoadedTexture>,
        main_thread: Option<Arc<dyn Texture>>,
    ) {
        drop(load_thread);

        if let Some(texture) = main_thread {
            if let Ok(mut destructor) = self.destructor.lock() {
                destructor.destroy(DestroyableResource::Texture(texture));
            }
        }
    }

    fn attach_raster_in_main_thread(
        &self,
        tile: &Tile,
        overlay_texture_coordinate_id: i32,
        _raster_tile: &RasterOverlayTile,
        texture: &Arc<dyn Texture>,
        translation: DVec2,
        scale: DVec2,
    ) {
        let Some(key) = tile.render_content.and_then(|c| c.render_resources) else { return };
        if let Ok(mut scene) = self.scene.lock() {
            let layer = OverlayLayer { texture: texture.clone(), translation, scale };
            scene.set_overlay_layer(key, overlay_texture_coordinate_id, layer);
        }
    }

    fn detach_raster_in_main_thread(
        &self,
        tile: &Tile,
        overlay_texture_coordinate_id: i32,
        _raster_tile: &RasterOverlayTile,
        texture: &Arc<dyn Texture>,
    ) {
        let Some(key) = tile.render_content.and_then(|c| c.render_resources) else { return };
        let Ok(mut scene) = self.scene.lock() else { return };

        let bound = scene.node(key)
            .and_then(|node| node.overlay_layer(overlay_texture_coordinate_id))
            .is_some_and(|layer| Arc::ptr_eq(&layer.texture, texture));
        if bound {
            scene.clear_overlay_layer(key, overlay_texture_coordinate_id);
        }
    }
}

#[cfg(test)]
#[path = "tile_resource_preparer_tests.rs"]
mod tests;
