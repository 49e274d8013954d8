//! # LSB 比特读写模块
//!
//! 只负责"比特流 <-> 像素最低有效位"的搬运，不关心帧格式。
//! 读写顺序固定：容量区域内逐行从上到下，行内逐列从左到右，
//! 每个像素依次使用 R、G、B 三个通道的最低位，Alpha 永远不碰。

use crate::constants::{BITS_PER_PIXEL, MARGIN_DIVISOR};
use crate::raster::Raster;
use std::ops::Range;

/// 容量区域的行范围 `[floor(H/5), H - floor(H/5))`，与宽度无关。
pub fn capacity_region(height: u32) -> Range<u32> {
    let margin = height / MARGIN_DIVISOR;
    margin..height - margin
}

/// 容量区域能容纳的比特数。
pub fn capacity_bits(width: u32, height: u32) -> usize {
    capacity_region(height).len() * width as usize * BITS_PER_PIXEL
}

/// 把 `bits` (每项为 0 或 1) 写入容量区域的最低有效位，返回实际写入的比特数。
///
/// 比特流耗尽时立即停止，当前像素剩余的通道保持原样；
/// 比特流比容量长时，多出的部分被丢弃，由调用方根据返回值判断。
pub fn embed_bits<I>(raster: &mut Raster, bits: I) -> usize
where
    I: IntoIterator<Item = u8>,
{
    let width = raster.width();
    let mut bits = bits.into_iter().peekable();
    let mut written = 0;

    'rows: for y in capacity_region(raster.height()) {
        for x in 0..width {
            let idx = raster.offset(x, y);
            let pixel = &mut raster.pixels_mut()[idx..idx + BITS_PER_PIXEL];

            for channel in pixel.iter_mut() {
                let Some(bit) = bits.next() else {
                    break 'rows;
                };
                *channel = (*channel & 0xFE) | (bit & 1);
                written += 1;
            }

            if bits.peek().is_none() {
                break 'rows;
            }
        }
    }

    written
}

/// 读出容量区域内所有 R、G、B 通道的最低有效位，长度恰为 [`capacity_bits`]。
pub fn extract_bits(raster: &Raster) -> Vec<u8> {
    let width = raster.width();
    let mut bits = Vec::with_capacity(capacity_bits(width, raster.height()));

    for y in capacity_region(raster.height()) {
        let row_start = raster.offset(0, y);
        let row = &raster.pixels()[row_start..raster.offset(width, y)];
        for pixel in row.chunks_exact(4) {
            bits.extend(pixel[..BITS_PER_PIXEL].iter().map(|channel| channel & 1));
        }
    }

    bits
}

/// 从 `bits[offset..]` 开始按高位在前打包出 `bit_count / 8` 个字节。
///
/// 调用方必须保证 `offset + bit_count <= bits.len()`。
pub fn bits_to_bytes(bits: &[u8], offset: usize, bit_count: usize) -> Vec<u8> {
    bits[offset..offset + (bit_count / 8) * 8]
        .chunks_exact(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | bit))
        .collect()
}

/// 把字节序列按高位在前展开为比特流。
pub fn bytes_to_bits<'a, I>(bytes: I) -> impl Iterator<Item = u8> + 'a
where
    I: IntoIterator<Item = &'a u8>,
    I::IntoIter: 'a,
{
    bytes
        .into_iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
}
