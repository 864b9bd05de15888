/// LoadedTexture - a texture built off the main thread, created on the
/// device later.
///
/// The load thread turns an image into a `TextureDesc`. The main thread
/// calls `create_gpu` once; every later call returns the same device
/// texture, which is how shared images end up as a single GPU texture.

use std::sync::{Arc, Mutex, Weak};
use rustc_hash::FxHashMap;
use crate::content::{ImageData, ImageIndex};
use crate::error::{Error, Result};
use crate::graphics_device::{
    CompressedFormats, GraphicsDevice, Texture, TextureAddress, TextureDesc,
    TextureFilter, TextureFormat, TextureGroup,
};
use crate::engine_bail;

const SOURCE: &str = "galaxy3d::tiles::LoadedTexture";

/// Sampler and color-space settings of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSampling {
    pub filter: TextureFilter,
    pub group: TextureGroup,
    pub address_u: TextureAddress,
    pub address_v: TextureAddress,
    pub use_mipmaps: bool,
    pub srgb: bool,
}

impl TextureSampling {
    /// Material color texture
    pub fn material(filter: TextureFilter, use_mipmaps: bool) -> Self {
        Self {
            filter,
            group: TextureGroup::World,
            address_u: TextureAddress::Wrap,
            address_v: TextureAddress::Wrap,
            use_mipmaps,
            srgb: true,
        }
    }

    /// Encoded feature IDs or properties: exact texel values, no filtering
    pub fn feature_data() -> Self {
        Self {
            filter: TextureFilter::Nearest,
            group: TextureGroup::FeatureData,
            address_u: TextureAddress::Clamp,
            address_v: TextureAddress::Clamp,
            use_mipmaps: false,
            srgb: false,
        }
    }
}

struct LoadedTextureState {
    /// Pending descriptor; taken when the device texture is created
    desc: Option<TextureDesc>,
    texture: Option<Arc<dyn Texture>>,
}

pub struct LoadedTexture {
    name: String,
    sampling: TextureSampling,
    supported_formats: CompressedFormats,
    state: Mutex<LoadedTextureState>,
}

impl LoadedTexture {
    /// Build the device-independent half from `image`.
    ///
    /// Fails on invalid images, unsupported pixel layouts, and
    /// compressed formats missing from `supported_formats`.
    pub fn from_image(
        name: impl Into<String>,
        image: &ImageData,
        sampling: TextureSampling,
        supported_formats: CompressedFormats,
    ) -> Result<Self> {
        let name = name.into();
        let desc = build_texture_desc(&name, image, &sampling, supported_formats)?;
        Ok(Self {
            name,
            sampling,
            supported_formats,
            state: Mutex::new(LoadedTextureState { desc: Some(desc), texture: None }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sampling(&self) -> &TextureSampling {
        &self.sampling
    }

    /// Replace the pixel source before the device texture exists.
    ///
    /// No-op once `create_gpu` succeeded.
    pub fn rebind_image(&self, image: &ImageData) -> Result<()> {
        let mut state = self.lock_state()?;
        if state.texture.is_some() {
            return Ok(());
        }
        state.desc = Some(build_texture_desc(&self.name, image, &self.sampling, self.supported_formats)?);
        Ok(())
    }

    /// Device texture, creating it on first call
    pub fn create_gpu(&self, device: &mut dyn GraphicsDevice) -> Result<Arc<dyn Texture>> {
        let mut state = self.lock_state()?;
        if let Some(texture) = &state.texture {
            return Ok(texture.clone());
        }

        let Some(desc) = state.desc.take() else {
            engine_bail!(SOURCE, "Texture '{}' has no pixel source", self.name);
        };
        if desc.format.is_compressed() && !device.supported_compressed_formats().supports(desc.format) {
            engine_bail!(SOURCE, "Texture '{}': device cannot sample {:?}", self.name, desc.format);
        }

        let texture = device.create_texture(desc)?;
        state.texture = Some(texture.clone());
        Ok(texture)
    }

    /// Device texture if already created
    pub fn texture(&self) -> Option<Arc<dyn Texture>> {
        self.state.lock().ok().and_then(|state| state.texture.clone())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, LoadedTextureState>> {
        self.state.lock()
            .map_err(|_| Error::InvalidState(format!("LoadedTexture '{}' lock poisoned", self.name)))
    }
}

impl std::fmt::Debug for LoadedTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedTexture")
            .field("name", &self.name)
            .field("sampling", &self.sampling)
            .field("created", &self.texture().is_some())
            .finish()
    }
}

// ============================================================================
// Dedup cache
// ============================================================================

/// Per-model cache of textures by source image.
///
/// Holds only weak references: the prepared primitives own the textures.
/// A dead entry is replaced by a fresh texture.
#[derive(Default)]
pub struct TextureCache {
    entries: FxHashMap<ImageIndex, Weak<LoadedTexture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared texture of `image`, building it on first use.
    ///
    /// The first caller's sampling wins for a given image.
    pub fn get_or_load(
        &mut self,
        index: ImageIndex,
        image: &ImageData,
        sampling: TextureSampling,
        supported_formats: CompressedFormats,
    ) -> Result<Arc<LoadedTexture>> {
        if let Some(texture) = self.entries.get(&index).and_then(Weak::upgrade) {
            return Ok(texture);
        }
        let texture = Arc::new(LoadedTexture::from_image(
            format!("image {index}"), image, sampling, supported_formats,
        )?);
        self.entries.insert(index, Arc::downgrade(&texture));
        Ok(texture)
    }

    /// Number of live entries
    pub fn live_count(&self) -> usize {
        self.entries.values().filter(|w| w.strong_count() > 0).count()
    }
}

// ============================================================================
// Descriptor building
// ============================================================================

fn build_texture_desc(
    name: &str,
    image: &ImageData,
    sampling: &TextureSampling,
    supported_formats: CompressedFormats,
) -> Result<TextureDesc> {
    if !image.is_valid() {
        engine_bail!(SOURCE, "Texture '{}': invalid {}x{} image", name, image.width, image.height);
    }

    let (format, data) = match image.compressed_format {
        Some(format) => {
            if !supported_formats.supports(format) {
                engine_bail!(SOURCE, "Texture '{}': unsupported compressed format {:?}", name, format);
            }
            (format, image.pixel_data.clone())
        }
        None => uncompressed_pixels(name, image, sampling.srgb)?,
    };

    // Pre-built mips are kept as is; compressed data cannot be mipmapped on upload
    let mip_offsets = if sampling.use_mipmaps { image.mip_positions.clone() } else { Vec::new() };
    let use_mipmaps = sampling.use_mipmaps && (!format.is_compressed() || !mip_offsets.is_empty());

    Ok(TextureDesc {
        name: name.to_string(),
        width: image.width,
        height: image.height,
        format,
        filter: sampling.filter,
        group: sampling.group,
        address_u: sampling.address_u,
        address_v: sampling.address_v,
        use_mipmaps,
        mip_offsets,
        data,
    })
}

fn uncompressed_pixels(name: &str, image: &ImageData, srgb: bool) -> Result<(TextureFormat, Vec<u8>)> {
    let base = &image.pixel_data[..image.expected_size()];
    let result = match (image.channels, image.bytes_per_channel) {
        (1, 1) => (TextureFormat::R8_UNORM, base.to_vec()),
        (2, 1) => (TextureFormat::R8G8_UNORM, base.to_vec()),
        (3, 1) => (rgba_format(srgb), expand_rgb_to_rgba(base)),
        (4, 1) => (rgba_format(srgb), base.to_vec()),
        (1, 2) => (TextureFormat::R16_UINT, base.to_vec()),
        (1, 4) => (TextureFormat::R32_SFLOAT, base.to_vec()),
        (channels, bytes) => {
            engine_bail!(
                SOURCE,
                "Texture '{}': unsupported layout ({} channels, {} bytes per channel)",
                name, channels, bytes
            );
        }
    };
    Ok(result)
}

fn rgba_format(srgb: bool) -> TextureFormat {
    if srgb { TextureFormat::R8G8B8A8_SRGB } else { TextureFormat::R8G8B8A8_UNORM }
}

fn expand_rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let texels: &[[u8; 3]] = bytemuck::cast_slice(&rgb[..rgb.len() - rgb.len() % 3]);
    let rgba: Vec<[u8; 4]> = texels.iter().map(|[r, g, b]| [*r, *g, *b, 255]).collect();
    bytemuck::cast_slice(&rgba).to_vec()
}

#[cfg(test)]
#[path = "loaded_texture_tests.rs"]
mod tests;
