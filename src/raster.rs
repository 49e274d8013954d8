//! # 栅格模块
//!
//! 编解码器不直接依赖任何图像容器格式，而是通过 [`RasterCodec`] 这个能力接口
//! 在"容器字节"和"原始 RGBA 像素"之间转换。
//! 默认实现 [`ImageCodec`] 基于 `image` crate；测试可以换成任意内存实现。

use crate::constants::DEFAULT_CARRIER_EXTENSION;
use crate::error::RasterError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// 通道数：R、G、B、A。
pub const CHANNELS: usize = 4;

/// 行优先的 RGBA8 原始栅格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// 用已有的像素缓冲区构建栅格，缓冲区长度必须恰好是 `width * height * 4`。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = buffer_len(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// 构建一张所有像素都等于 `fill` 的栅格。
    pub fn filled(width: u32, height: u32, fill: [u8; 4]) -> Result<Self, RasterError> {
        let len = buffer_len(width, height)?;
        let pixels = fill.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// 栅格宽度 (像素)。
    pub fn width(&self) -> u32 {
        self.width
    }

    /// 栅格高度 (像素)。
    pub fn height(&self) -> u32 {
        self.height
    }

    /// 行优先的 RGBA 像素缓冲区。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 可写的像素缓冲区。
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// 像素 `(x, y)` 在缓冲区中的起始偏移。
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

fn buffer_len(width: u32, height: u32) -> Result<usize, RasterError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(RasterError::Dimensions { width, height })
}

/// 图像容器与原始栅格之间的双向转换能力。
pub trait RasterCodec {
    /// 把一个标准图像容器的字节解码为 RGBA 栅格。
    fn decode_raster(&self, bytes: &[u8]) -> Result<Raster, RasterError>;

    /// 把 RGBA 栅格编码为标准图像容器的字节。
    fn encode_raster(&self, raster: &Raster) -> Result<Vec<u8>, RasterError>;
}

/// 基于 `image` crate 的默认实现。
///
/// 解码接受 crate 启用的所有格式；编码只允许无损格式，
/// 否则嵌入的最低有效位会在压缩时丢失。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCodec {
    format: ImageFormat,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
        }
    }
}

impl ImageCodec {
    /// 以指定格式输出。只接受 PNG、BMP、TIFF、WebP (无损) 和 QOI。
    pub fn with_format(format: ImageFormat) -> Result<Self, RasterError> {
        match format {
            ImageFormat::Png
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::WebP
            | ImageFormat::Qoi => Ok(Self { format }),
            other => Err(RasterError::UnsupportedFormat(format!("{other:?}"))),
        }
    }

    /// 根据文件扩展名选择输出格式，空扩展名时使用 PNG。
    pub fn for_extension(extension: &str) -> Result<Self, RasterError> {
        let extension = if extension.is_empty() {
            DEFAULT_CARRIER_EXTENSION
        } else {
            extension
        };
        let format = ImageFormat::from_extension(extension)
            .ok_or_else(|| RasterError::UnsupportedFormat(extension.to_string()))?;
        Self::with_format(format)
    }

    /// 输出使用的容器格式。
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl RasterCodec for ImageCodec {
    fn decode_raster(&self, bytes: &[u8]) -> Result<Raster, RasterError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Raster::new(width, height, img.into_raw())
    }

    fn encode_raster(&self, raster: &Raster) -> Result<Vec<u8>, RasterError> {
        let img = RgbaImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
            .ok_or(RasterError::Dimensions {
                width: raster.width(),
                height: raster.height(),
            })?;

        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), self.format)?;
        Ok(output)
    }
}
