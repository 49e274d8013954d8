//! # 解码器模块
//!
//! 从任意图像中读出容量区域的最低有效位并解析帧。
//! 每一步都先做边界检查再读取，任何检查失败立即返回对应的错误，
//! 绝不返回部分或被截断的载荷。

use crate::constants::{LENGTH_FIELD_BITS, MIN_HEADER_BYTES, PAYLOAD_SIZE_BYTES};
use crate::error::DecodeError;
use crate::raster::{ImageCodec, Raster, RasterCodec};
use crate::steganography::{bits_to_bytes, capacity_region, extract_bits};
use log::{debug, warn};

/// 解码得到的文件内容和扩展名 (不带前导 `.`)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    pub extension: String,
}

/// 载荷是如何拼出来的。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assembly {
    /// 载荷恰好完整地落在长度受限的头部读取中。
    Exact,
    /// 头部之后还需要继续读取比特。
    Extended,
    /// 头部里的字节比 `PayloadSize` 多，截断到 `PayloadSize`。
    /// 编码器产生的图像不会走到这里。
    Truncated,
}

/// 用 `codec` 解码图像容器，再从栅格中恢复载荷。
///
/// 容器解码失败会变成 [`DecodeError::DecodeFault`]。
pub fn decode<C>(codec: &C, bytes: &[u8]) -> Result<Decoded, DecodeError>
where
    C: RasterCodec + ?Sized,
{
    let raster = codec.decode_raster(bytes).map_err(|e| {
        warn!("Decode failed: {e}");
        DecodeError::from(e)
    })?;
    decode_raster(&raster)
}

/// 从任意 `image` crate 支持的无损容器中恢复载荷。
pub fn decode_image(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    decode(&ImageCodec::default(), bytes)
}

/// 从原始栅格中恢复载荷。
pub fn decode_raster(raster: &Raster) -> Result<Decoded, DecodeError> {
    let region = capacity_region(raster.height());
    if region.is_empty() {
        warn!("Image too small for decoding: height {}", raster.height());
        return Err(DecodeError::ImageTooSmall {
            height: raster.height(),
        });
    }

    let bits = extract_bits(raster);
    let (decoded, assembly) = read_frame(&bits).inspect_err(|e| warn!("{e}"))?;

    if assembly == Assembly::Truncated {
        warn!(
            "Header carried more payload bytes than its PayloadSize field, truncated to {}",
            decoded.data.len()
        );
    }
    debug!(
        "Decoded {} bytes (.{}) from a {}x{} image",
        decoded.data.len(),
        decoded.extension,
        raster.width(),
        raster.height()
    );

    Ok(decoded)
}

/// 解析扁平的比特缓冲区。
pub(crate) fn read_frame(bits: &[u8]) -> Result<(Decoded, Assembly), DecodeError> {
    let bit_count = bits.len();
    if bit_count < LENGTH_FIELD_BITS {
        return Err(DecodeError::HeaderTooSmall { bits: bit_count });
    }

    let total_length = bits[..LENGTH_FIELD_BITS]
        .iter()
        .fold(0u32, |acc, &bit| (acc << 1) | bit as u32);

    // 之后的所有读取都依赖这里的上限，必须先于任何读取。
    let max_allowed = (bit_count - LENGTH_FIELD_BITS) / 8;
    if total_length == 0 || total_length as usize > max_allowed {
        return Err(DecodeError::InvalidHeaderLength {
            length: total_length,
            max: max_allowed,
        });
    }

    let header_bit_count = total_length as usize * 8;
    let header = bits_to_bytes(bits, LENGTH_FIELD_BITS, header_bit_count);
    if header.len() < MIN_HEADER_BYTES {
        return Err(DecodeError::HeaderTooShort {
            length: header.len(),
        });
    }

    let ext_len = header[0];
    let metadata_size = 1 + ext_len as usize + PAYLOAD_SIZE_BYTES;
    if header.len() < metadata_size {
        return Err(DecodeError::MalformedHeader {
            ext_len,
            header_len: header.len(),
        });
    }

    let extension: String = header[1..1 + ext_len as usize]
        .iter()
        .map(|&byte| byte as char)
        .collect();

    let payload_size = header[1 + ext_len as usize..metadata_size]
        .iter()
        .fold(0u32, |acc, &byte| (acc << 8) | byte as u32) as usize;

    let part1 = &header[metadata_size..];
    let header_end_bit = LENGTH_FIELD_BITS + header_bit_count;

    let (data, assembly) = match payload_size.checked_sub(part1.len()) {
        None => (part1[..payload_size].to_vec(), Assembly::Truncated),
        Some(0) => (part1.to_vec(), Assembly::Exact),
        Some(remaining) => {
            let needed = remaining * 8;
            let available = bit_count - header_end_bit;
            if available < needed {
                return Err(DecodeError::InsufficientData { needed, available });
            }

            let mut data = Vec::with_capacity(payload_size);
            data.extend_from_slice(part1);
            data.extend(bits_to_bytes(bits, header_end_bit, needed));
            (data, Assembly::Extended)
        }
    };

    if data.len() != payload_size {
        return Err(DecodeError::SizeMismatch {
            expected: payload_size,
            actual: data.len(),
        });
    }

    Ok((Decoded { data, extension }, assembly))
}
