/// Decoded image payload attached to models and raster overlay tiles

use crate::graphics_device::TextureFormat;

/// Decoded (or still block-compressed) image
///
/// Uncompressed images carry `channels` interleaved channels of
/// `bytes_per_channel` bytes each. Compressed images carry the raw
/// blocks and name their format in `compressed_format`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub bytes_per_channel: u32,
    pub compressed_format: Option<TextureFormat>,
    /// Byte offsets of pre-built mip levels (empty = base level only)
    pub mip_positions: Vec<usize>,
    pub pixel_data: Vec<u8>,
}

impl ImageData {
    /// 8-bit RGBA image
    pub fn rgba8(width: u32, height: u32, pixel_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels: 4,
            bytes_per_channel: 1,
            compressed_format: None,
            mip_positions: Vec::new(),
            pixel_data,
        }
    }

    /// Block-compressed image
    pub fn compressed(width: u32, height: u32, format: TextureFormat, pixel_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels: 4,
            bytes_per_channel: 1,
            compressed_format: Some(format),
            mip_positions: Vec::new(),
            pixel_data,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_format.is_some()
    }

    /// Bytes expected for the base level of an uncompressed image
    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize * self.bytes_per_channel as usize
    }

    /// Whether the payload is large enough to describe the declared image
    pub fn is_valid(&self) -> bool {
        if self.width == 0 || self.height == 0 || self.pixel_data.is_empty() {
            return false;
        }
        self.is_compressed() || self.pixel_data.len() >= self.expected_size()
    }
}
