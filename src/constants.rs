/// 载体图像的中性填充色 (R, G, B, A)。
/// 编码器在写入任何比特之前，先用这个颜色填满整张图像。
pub const NEUTRAL_FILL: [u8; 4] = [128, 128, 128, 255];

/// 自动生成的载体图像的最小边长 (像素)。
pub const MIN_CARRIER_SIDE: u32 = 64;

/// 帧开头 `TotalLength` 字段的比特数 (大端 u32)。
pub const LENGTH_FIELD_BITS: usize = 32;

/// `PayloadSize` 字段的字节数 (大端 u32)。
pub const PAYLOAD_SIZE_BYTES: usize = 4;

/// 每个像素可用的比特数：R、G、B 各一个最低有效位，Alpha 不参与。
pub const BITS_PER_PIXEL: usize = 3;

/// 容量区域的边距除数。
/// 顶部和底部各跳过 `floor(H / 5)` 行，只使用中间约 60% 的行。
pub const MARGIN_DIVISOR: u32 = 5;

/// 尺寸估算时假定的容量区域比例。
pub const CAPACITY_FRACTION: f64 = 0.6;

/// 合法头部的最小字节数：1 字节 `ExtLen` + 0 字节扩展名 + 4 字节 `PayloadSize`。
pub const MIN_HEADER_BYTES: usize = 1 + PAYLOAD_SIZE_BYTES;

/// 扩展名的最大字节数，受 8 位 `ExtLen` 字段限制。
pub const MAX_EXTENSION_LEN: usize = u8::MAX as usize;

/// 默认输出的载体图像扩展名。
pub const DEFAULT_CARRIER_EXTENSION: &str = "png";
