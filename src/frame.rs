//! # 帧格式模块
//!
//! 嵌入图像的逻辑消息布局 (所有多比特字段高位在前)：
//!
//! ```text
//! [TotalLength: u32][ExtLen: u8][Extension: ExtLen 字节][PayloadSize: u32][Payload]
//! ```
//!
//! `TotalLength` 覆盖 `ExtLen` 之后的全部内容 (包括载荷本身)，而不只是元数据。

use crate::constants::{
    BITS_PER_PIXEL, CAPACITY_FRACTION, LENGTH_FIELD_BITS, MAX_EXTENSION_LEN, MIN_CARRIER_SIDE,
    PAYLOAD_SIZE_BYTES,
};
use crate::error::EncodeError;
use crate::steganography::{bytes_to_bits, capacity_bits};

/// 待嵌入的帧，借用载荷和扩展名。
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    extension: &'a str,
    payload: &'a [u8],
    total_length: u32,
}

impl<'a> Frame<'a> {
    /// 构建帧。扩展名开头的一个 `.` 会被去掉。
    ///
    /// # Errors
    ///
    /// * 扩展名含非 ASCII 字符。
    /// * 扩展名超过 255 字节。
    /// * `TotalLength` 超出 u32 范围。
    pub fn new(payload: &'a [u8], extension: &'a str) -> Result<Self, EncodeError> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);

        if !extension.is_ascii() {
            return Err(EncodeError::NonAsciiExtension(extension.to_string()));
        }

        let total_length = total_length(extension.len(), payload.len())?;

        Ok(Self {
            extension,
            payload,
            total_length,
        })
    }

    pub fn extension(&self) -> &'a str {
        self.extension
    }

    /// `1 + ExtLen + 4 + PayloadSize`。
    pub fn total_length(&self) -> u32 {
        self.total_length
    }

    /// 整个帧 (含 32 位长度前缀) 的比特数。
    pub fn total_bits(&self) -> usize {
        LENGTH_FIELD_BITS + self.total_length as usize * 8
    }

    /// 按嵌入顺序惰性展开整个帧的比特流。
    pub fn bits(self) -> impl Iterator<Item = u8> + 'a {
        let payload_size = self.payload.len() as u32;

        owned_bits(self.total_length.to_be_bytes())
            .chain(owned_bits([self.extension.len() as u8]))
            .chain(bytes_to_bits(self.extension.as_bytes()))
            .chain(owned_bits(payload_size.to_be_bytes()))
            .chain(bytes_to_bits(self.payload))
    }
}

fn owned_bits<const N: usize>(bytes: [u8; N]) -> impl Iterator<Item = u8> {
    bytes
        .into_iter()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
}

/// 计算 `TotalLength`，同时检查扩展名长度和 u32 上限。
pub fn total_length(ext_len: usize, payload_len: usize) -> Result<u32, EncodeError> {
    if ext_len > MAX_EXTENSION_LEN {
        return Err(EncodeError::ExtensionTooLong { len: ext_len });
    }

    (1 + ext_len + PAYLOAD_SIZE_BYTES)
        .checked_add(payload_len)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(EncodeError::PayloadTooLarge { len: payload_len })
}

/// 根据扩展名和载荷长度估算正方形载体的边长。
///
/// 假设只有 60% 的像素可用、每个像素 3 个比特：
/// `side = max(ceil(sqrt(ceil(totalBits / 1.8))), 64)`。
pub fn carrier_side(ext_len: usize, payload_len: usize) -> Result<u32, EncodeError> {
    let total_length = total_length(ext_len, payload_len)?;
    let total_bits = LENGTH_FIELD_BITS as f64 + total_length as f64 * 8.0;

    let pixels_needed = (total_bits / (CAPACITY_FRACTION * BITS_PER_PIXEL as f64)).ceil();
    let side = pixels_needed.sqrt().ceil() as u32;

    Ok(side.max(MIN_CARRIER_SIDE))
}

/// 边长为 `side` 的正方形载体的容量区域是否足以容纳 `total_bits` 个比特。
pub fn carrier_capacity_fits(side: u32, total_bits: usize) -> bool {
    capacity_bits(side, side) >= total_bits
}
