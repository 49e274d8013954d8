//! # 编码器模块
//!
//! 根据载荷大小生成一张中性灰的正方形载体，把帧写进容量区域的最低有效位。

use crate::constants::NEUTRAL_FILL;
use crate::error::EncodeError;
use crate::frame::{Frame, carrier_capacity_fits, carrier_side};
use crate::raster::{ImageCodec, Raster, RasterCodec};
use crate::steganography::{capacity_bits, embed_bits};
use log::debug;

/// 生成嵌入了 `payload` 和 `extension` 的原始载体栅格。
///
/// # Errors
///
/// * 扩展名不是 ASCII 或超过 255 字节。
/// * 帧长度超出 32 位范围。
/// * 估算出的载体放不下整个帧。
pub fn encode_raster(payload: &[u8], extension: &str) -> Result<Raster, EncodeError> {
    let frame = Frame::new(payload, extension)?;
    let side = carrier_side(frame.extension().len(), payload.len())?;
    let needed = frame.total_bits();

    if !carrier_capacity_fits(side, needed) {
        return Err(EncodeError::CapacityShortfall {
            side,
            capacity: capacity_bits(side, side),
            needed,
        });
    }

    debug!(
        "Encoding {} payload bytes (.{}) into a {side}x{side} carrier, {needed} bits",
        payload.len(),
        frame.extension()
    );

    let mut carrier = Raster::filled(side, side, NEUTRAL_FILL)?;
    let written = embed_bits(&mut carrier, frame.bits());
    debug_assert_eq!(written, needed);

    Ok(carrier)
}

/// 生成载体并用 `codec` 编码为图像容器字节。
pub fn encode<C>(codec: &C, payload: &[u8], extension: &str) -> Result<Vec<u8>, EncodeError>
where
    C: RasterCodec + ?Sized,
{
    let carrier = encode_raster(payload, extension)?;
    Ok(codec.encode_raster(&carrier)?)
}

/// 生成 PNG 格式的载体。
pub fn encode_png(payload: &[u8], extension: &str) -> Result<Vec<u8>, EncodeError> {
    encode(&ImageCodec::default(), payload, extension)
}
