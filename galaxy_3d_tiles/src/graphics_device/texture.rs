/// Texture trait, texture descriptor, and compressed format support

use bitflags::bitflags;
use super::render_resource::RenderResource;

/// Pixel format of a device texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Uncompressed
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16_UINT,
    R32_SFLOAT,

    // Block compressed
    ETC1_RGB,
    ETC2_RGBA,
    ETC2_EAC_R11,
    ETC2_EAC_RG11,
    BC1_RGB,
    BC3_RGBA,
    BC4_R,
    BC5_RG,
    BC7_RGBA,
    ASTC_4x4_RGBA,
    PVRTC2_4_RGBA,
}

impl TextureFormat {
    /// Capability bit a device must advertise to sample this format.
    /// Uncompressed formats need none.
    pub fn required_capability(&self) -> CompressedFormats {
        match self {
            TextureFormat::ETC1_RGB => CompressedFormats::ETC1_RGB,
            TextureFormat::ETC2_RGBA => CompressedFormats::ETC2_RGBA,
            TextureFormat::ETC2_EAC_R11 => CompressedFormats::ETC2_EAC_R11,
            TextureFormat::ETC2_EAC_RG11 => CompressedFormats::ETC2_EAC_RG11,
            TextureFormat::BC1_RGB => CompressedFormats::BC1_RGB,
            TextureFormat::BC3_RGBA => CompressedFormats::BC3_RGBA,
            TextureFormat::BC4_R => CompressedFormats::BC4_R,
            TextureFormat::BC5_RG => CompressedFormats::BC5_RG,
            TextureFormat::BC7_RGBA => CompressedFormats::BC7_RGBA,
            TextureFormat::ASTC_4x4_RGBA => CompressedFormats::ASTC_4X4_RGBA,
            TextureFormat::PVRTC2_4_RGBA => CompressedFormats::PVRTC2_4_RGBA,
            _ => CompressedFormats::empty(),
        }
    }

    pub fn is_compressed(&self) -> bool {
        !self.required_capability().is_empty()
    }
}

bitflags! {
    /// Block-compressed formats a device can sample
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompressedFormats: u32 {
        const ETC1_RGB       = 1 << 0;
        const ETC2_RGBA      = 1 << 1;
        const BC1_RGB        = 1 << 2;
        const BC3_RGBA       = 1 << 3;
        const BC4_R          = 1 << 4;
        const BC5_RG         = 1 << 5;
        const BC7_RGBA       = 1 << 6;
        const ASTC_4X4_RGBA  = 1 << 7;
        const PVRTC2_4_RGBA  = 1 << 8;
        const ETC2_EAC_R11   = 1 << 9;
        const ETC2_EAC_RG11  = 1 << 10;
    }
}

impl CompressedFormats {
    /// Whether a texture of `format` can be created on a device with these capabilities
    pub fn supports(&self, format: TextureFormat) -> bool {
        self.contains(format.required_capability())
    }
}

/// Sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Bilinear,
    Trilinear,
    Anisotropic,
}

/// Streaming / LOD group the texture is budgeted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureGroup {
    #[default]
    World,
    Overlay,
    FeatureData,
}

/// Texture coordinate addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureAddress {
    #[default]
    Wrap,
    Clamp,
    Mirror,
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Sampling filter
    pub filter: TextureFilter,
    /// Budget group
    pub group: TextureGroup,
    /// U addressing
    pub address_u: TextureAddress,
    /// V addressing
    pub address_v: TextureAddress,
    /// Generate (or keep supplied) mip chain
    pub use_mipmaps: bool,
    /// Byte offsets of each mip level inside `data` (empty = single level)
    pub mip_offsets: Vec<usize>,
    /// Pixel bytes, tightly packed
    pub data: Vec<u8>,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub filter: TextureFilter,
    pub group: TextureGroup,
    pub mip_levels: u32,
}

impl TextureInfo {
    pub fn from_desc(desc: &TextureDesc) -> Self {
        let mip_levels = if !desc.mip_offsets.is_empty() {
            desc.mip_offsets.len() as u32
        } else if desc.use_mipmaps {
            32 - desc.width.max(desc.height).max(1).leading_zeros()
        } else {
            1
        };
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            filter: desc.filter,
            group: desc.group,
            mip_levels,
        }
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
pub trait Texture: RenderResource {
    /// Read-only properties
    fn info(&self) -> &TextureInfo;

    /// Free the platform pixel storage. Called once, on final destruction.
    fn release_platform_data(&self);
}

impl std::fmt::Debug for dyn Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Texture({})", self.name())
    }
}
