//! # 错误类型模块
//!
//! 编解码器的三类错误：栅格容器错误、编码前置条件错误和解码失败。
//! 库内部一律返回这些带类型的错误，由上层 (`handler`) 用 `anyhow` 附加上下文。

use thiserror::Error;

/// 图像容器与原始栅格之间转换时的错误。
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("image container error: {0}")]
    Image(#[from] image::ImageError),

    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("invalid raster dimensions: {width}x{height}")]
    Dimensions { width: u32, height: u32 },

    #[error("unsupported carrier format: {0}")]
    UnsupportedFormat(String),
}

/// 编码前置条件检查失败。
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("extension is {len} bytes long, the frame allows at most 255")]
    ExtensionTooLong { len: usize },

    #[error("extension {0:?} contains non-ASCII characters")]
    NonAsciiExtension(String),

    #[error("payload of {len} bytes does not fit in a 32-bit frame")]
    PayloadTooLarge { len: usize },

    #[error("carrier of side {side} holds {capacity} bits, frame needs {needed}")]
    CapacityShortfall {
        side: u32,
        capacity: usize,
        needed: usize,
    },

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// 解码失败。
///
/// 所有变体对调用方都不是致命的：拿到任何一个错误后，
/// 调用方都可以把图像当作普通的二进制文件处理。
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image of height {height} has an empty capacity region")]
    ImageTooSmall { height: u32 },

    #[error("capacity region holds {bits} bits, fewer than the 32-bit length field")]
    HeaderTooSmall { bits: usize },

    #[error("invalid header length {length} (max: {max})")]
    InvalidHeaderLength { length: u32, max: usize },

    #[error("header of {length} bytes is shorter than the 5-byte minimum")]
    HeaderTooShort { length: usize },

    #[error("malformed header: extension length {ext_len} does not fit in {header_len} header bytes")]
    MalformedHeader { ext_len: u8, header_len: usize },

    #[error("not enough bits for file data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("decode failed: {0}")]
    DecodeFault(#[from] RasterError),
}

impl DecodeError {
    /// 失败是否发生在帧头解析阶段 (即图像多半根本没有嵌入数据)。
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            DecodeError::HeaderTooSmall { .. }
                | DecodeError::InvalidHeaderLength { .. }
                | DecodeError::HeaderTooShort { .. }
                | DecodeError::MalformedHeader { .. }
        )
    }
}
