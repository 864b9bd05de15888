use super::*;
use crate::content::{Material, Model, Primitive, TextureRef};
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{CompressedFormats, TextureFilter, TextureFormat, TextureGroup};
use crate::selection::{TileId, TileLoadState, TileRenderContent};
use glam::{Vec2, Vec3};

struct Fixture {
    device: Arc<Mutex<MockGraphicsDevice>>,
    scene: Arc<Mutex<Scene>>,
    destructor: Arc<Mutex<AmortizedDestructor>>,
    preparer: TileResourcePreparer,
}

fn fixture() -> Fixture {
    let device = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let scene = Arc::new(Mutex::new(Scene::new(DMat4::IDENTITY)));
    let destructor = Arc::new(Mutex::new(AmortizedDestructor::new()));
    let dyn_device: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    let preparer = TileResourcePreparer::new(dyn_device, scene.clone(), destructor.clone());
    Fixture { device, scene, destructor, preparer }
}

fn triangle(material: Option<usize>) -> Primitive {
    Primitive {
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        normals: Some(vec![Vec3::Z; 3]),
        tex_coords: vec![vec![Vec2::ZERO, Vec2::X, Vec2::Y]],
        material,
        ..Default::default()
    }
}

/// Two primitives whose materials share image 0
fn shared_image_content() -> TileContent {
    let material = Material {
        base_color_texture: Some(TextureRef { image: 0, tex_coord: 0 }),
        ..Default::default()
    };
    TileContent::Model(Model {
        primitives: vec![triangle(Some(0)), triangle(Some(1))],
        materials: vec![material.clone(), material],
        images: vec![Arc::new(ImageData::rgba8(2, 2, vec![200; 16]))],
        ..Default::default()
    })
}

fn tile(id: u64) -> Tile {
    Tile::new(TileId(id))
}

fn rendered_tile(id: u64, key: TileNodeKey) -> Tile {
    let mut tile = tile(id);
    tile.load_state = TileLoadState::Done;
    tile.render_content = Some(TileRenderContent {
        render_resources: Some(key),
        lod_transition_fade_percentage: 1.0,
    });
    tile
}

fn prepare(f: &Fixture, id: u64, content: &TileContent) -> TileNodeKey {
    let loaded = f.preparer
        .prepare_in_load_thread(content, &DMat4::IDENTITY, &())
        .unwrap();
    f.preparer.prepare_in_main_thread(&tile(id), loaded).unwrap()
}

// ============================================================================
// Model preparation
// ============================================================================

#[test]
fn test_non_model_content_yields_nothing() {
    let f = fixture();
    assert!(f.preparer.prepare_in_load_thread(&TileContent::Empty, &DMat4::IDENTITY, &()).is_none());
    assert!(f.preparer.prepare_in_load_thread(&TileContent::External, &DMat4::IDENTITY, &()).is_none());
}

#[test]
fn test_main_thread_creates_detached_hidden_node() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());

    let scene = f.scene.lock().unwrap();
    let node = scene.node(key).unwrap();
    assert_eq!(node.tile(), TileId(1));
    assert_eq!(node.meshes().len(), 2);
    assert!(!node.is_attached());
    assert!(!node.is_visible());
    assert_eq!(node.collision_enabled(), crate::scene::CollisionEnabled::NoCollision);
}

#[test]
fn test_shared_image_creates_one_gpu_texture() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());

    assert_eq!(f.device.lock().unwrap().texture_count(), 1);
    let scene = f.scene.lock().unwrap();
    assert_eq!(scene.node(key).unwrap().textures().len(), 1);
}

#[test]
fn test_options_override_stored_options() {
    let f = fixture();
    let options = ModelPrepareOptions { create_physics_meshes: false, ..Default::default() };

    let loaded = f.preparer
        .prepare_in_load_thread(&shared_image_content(), &DMat4::IDENTITY, &options)
        .unwrap();
    f.preparer.prepare_in_main_thread(&tile(1), loaded).unwrap();

    assert!(f.device.lock().unwrap().collision_meshes.lock().unwrap().is_empty());
}

#[test]
fn test_stored_options_used_by_default() {
    let f = fixture();
    f.preparer.set_model_options(ModelPrepareOptions { always_include_tangents: true, ..Default::default() });

    let loaded = f.preparer
        .prepare_in_load_thread(&shared_image_content(), &DMat4::IDENTITY, &())
        .unwrap();

    assert!(!loaded.primitives()[0].mesh.tangents.is_empty());
}

#[test]
fn test_texture_failure_keeps_meshes() {
    let f = fixture();
    f.device.lock().unwrap().fail_textures = true;

    let key = prepare(&f, 1, &shared_image_content());

    let scene = f.scene.lock().unwrap();
    let node = scene.node(key).unwrap();
    assert_eq!(node.meshes().len(), 2);
    assert!(node.textures().is_empty());
}

// ============================================================================
// Free
// ============================================================================

#[test]
fn test_free_load_thread_result_touches_nothing() {
    let f = fixture();
    let loaded = f.preparer
        .prepare_in_load_thread(&shared_image_content(), &DMat4::IDENTITY, &())
        .unwrap();

    f.preparer.free(&tile(1), Some(loaded), None);

    assert_eq!(f.device.lock().unwrap().texture_count(), 0);
    assert_eq!(f.scene.lock().unwrap().node_count(), 0);
}

#[test]
fn test_free_main_thread_result_destroys_resources() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());

    f.preparer.free(&tile(1), None, Some(key));

    assert!(!f.scene.lock().unwrap().contains(key));
    let device = f.device.lock().unwrap();
    assert_eq!(device.textures.lock().unwrap()[0].destruction.release_calls(), 1);
    for mesh in device.meshes.lock().unwrap().iter() {
        assert_eq!(mesh.destruction.release_calls(), 1);
    }
    assert_eq!(device.collision_meshes.lock().unwrap().len(), 2);
    assert!(f.destructor.lock().unwrap().is_empty());
}

#[test]
fn test_free_defers_busy_resources() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());
    f.device.lock().unwrap().textures.lock().unwrap()[0].destruction.set_ready(false);

    f.preparer.free(&tile(1), None, Some(key));

    assert_eq!(f.destructor.lock().unwrap().pending_count(), 1);
}

#[test]
fn test_free_twice_is_harmless() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());

    f.preparer.free(&tile(1), None, Some(key));
    f.preparer.free(&tile(1), None, Some(key));

    assert_eq!(f.scene.lock().unwrap().node_count(), 0);
}

// ============================================================================
// Rasters
// ============================================================================

fn raster_tile(width: u32) -> RasterOverlayTile {
    RasterOverlayTile {
        id: 9,
        image: Arc::new(ImageData::rgba8(width, width, vec![7; (width * width * 4) as usize])),
    }
}

fn raster_options() -> RasterRendererOptions {
    RasterRendererOptions {
        filter: TextureFilter::Trilinear,
        group: TextureGroup::Overlay,
        use_mipmaps: false,
        supported_formats: CompressedFormats::all(),
    }
}

#[test]
fn test_raster_without_options_rejected() {
    let f = fixture();
    let image = raster_tile(2).image;

    assert!(f.preparer.prepare_raster_in_load_thread(&image, &()).is_none());
    assert!(f.preparer.prepare_raster_in_load_thread(&image, &ModelPrepareOptions::default()).is_none());
}

#[test]
fn test_raster_uses_clamp_srgb_and_options() {
    let f = fixture();
    let raster = raster_tile(4);

    let loaded = f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap();
    assert_eq!(loaded.sampling().address_u, TextureAddress::Clamp);
    assert!(loaded.sampling().srgb);

    let texture = f.preparer.prepare_raster_in_main_thread(&raster, loaded).unwrap();
    assert_eq!(texture.info().format, TextureFormat::R8G8B8A8_SRGB);
    assert_eq!(texture.info().filter, TextureFilter::Trilinear);
    assert_eq!(texture.info().group, TextureGroup::Overlay);
}

#[test]
fn test_raster_main_thread_uses_current_image() {
    let f = fixture();
    let loaded = f.preparer
        .prepare_raster_in_load_thread(&raster_tile(2).image, &raster_options())
        .unwrap();

    let texture = f.preparer.prepare_raster_in_main_thread(&raster_tile(16), loaded).unwrap();

    assert_eq!(texture.info().width, 16);
}

#[test]
fn test_free_raster_destroys_texture() {
    let f = fixture();
    let raster = raster_tile(2);
    let loaded = f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap();
    let texture = f.preparer.prepare_raster_in_main_thread(&raster, loaded).unwrap();

    f.preparer.free_raster(&raster, None, Some(texture));

    assert_eq!(f.device.lock().unwrap().textures.lock().unwrap()[0].destruction.release_calls(), 1);
}

#[test]
fn test_attach_and_detach_raster() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());
    let raster = raster_tile(2);
    let loaded = f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap();
    let texture = f.preparer.prepare_raster_in_main_thread(&raster, loaded).unwrap();
    let tile = rendered_tile(1, key);

    f.preparer.attach_raster_in_main_thread(
        &tile, 0, &raster, &texture, DVec2::new(0.5, 0.0), DVec2::new(2.0, 2.0),
    );
    {
        let scene = f.scene.lock().unwrap();
        let layer = scene.node(key).unwrap().overlay_layer(0).unwrap();
        assert_eq!(layer.scale, DVec2::new(2.0, 2.0));
    }

    f.preparer.detach_raster_in_main_thread(&tile, 0, &raster, &texture);
    assert_eq!(f.scene.lock().unwrap().node(key).unwrap().overlay_layer_count(), 0);
}

#[test]
fn test_detach_other_texture_keeps_layer() {
    let f = fixture();
    let key = prepare(&f, 1, &shared_image_content());
    let raster = raster_tile(2);
    let first = f.preparer
        .prepare_raster_in_main_thread(&raster, f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap())
        .unwrap();
    let second = f.preparer
        .prepare_raster_in_main_thread(&raster, f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap())
        .unwrap();
    let tile = rendered_tile(1, key);

    f.preparer.attach_raster_in_main_thread(&tile, 0, &raster, &first, DVec2::ZERO, DVec2::ONE);
    f.preparer.detach_raster_in_main_thread(&tile, 0, &raster, &second);

    assert_eq!(f.scene.lock().unwrap().node(key).unwrap().overlay_layer_count(), 1);
}

#[test]
fn test_raster_attach_without_render_resources_is_noop() {
    let f = fixture();
    let raster = raster_tile(2);
    let loaded = f.preparer.prepare_raster_in_load_thread(&raster.image, &raster_options()).unwrap();
    let texture = f.preparer.prepare_raster_in_main_thread(&raster, loaded).unwrap();

    f.preparer.attach_raster_in_main_thread(&tile(1), 0, &raster, &texture, DVec2::ZERO, DVec2::ONE);
    f.preparer.detach_raster_in_main_thread(&tile(1), 0, &raster, &texture);

    assert_eq!(f.scene.lock().unwrap().node_count(), 0);
}
