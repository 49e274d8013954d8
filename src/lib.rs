//! # lsb_carrier 库
//!
//! 把任意文件 (连同扩展名) 藏进自动生成的载体图像的最低有效位，
//! 之后再从图像中无损地恢复出来。
//!
//! 编解码器本身不做任何文件或网络 I/O，图像容器的读写通过
//! [`raster::RasterCodec`] 注入。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod handler;
pub mod raster;
pub mod steganography;

pub use decoder::{Decoded, decode, decode_image, decode_raster};
pub use encoder::{encode, encode_png, encode_raster};
pub use error::{DecodeError, EncodeError, RasterError};
pub use raster::{ImageCodec, Raster, RasterCodec};
