/// BMP 文件的标准头部大小 (字节)。
/// 14 字节文件头 + 40 字节 BITMAPINFOHEADER，原样复制，不参与隐写。
pub const BMP_HEADER_SIZE: usize = 54;

/// 头部中图像宽度字段的偏移 (4 字节小端整数)。
pub const BMP_WIDTH_OFFSET: usize = 18;

/// 头部中图像高度字段的偏移 (4 字节小端整数)。
pub const BMP_HEIGHT_OFFSET: usize = 22;

/// 24 位 BMP 中每个像素占用的字节数。
pub const BYTES_PER_PIXEL: u64 = 3;

/// 标记的字节数。
pub const MAGIC_MARKER_LEN: usize = 2;

/// 嵌入在像素数据最前面的标记，用于识别隐写图像。
pub const MAGIC_MARKER: &[u8; MAGIC_MARKER_LEN] = b"#*";

/// 隐写单个字节所需的载体字节数。
/// 每个载体字节的最低位存放 1 bit，因此 8 bits 需要 8 个载体字节。
pub const BYTE_CARRIER_LEN: usize = 8;

/// 隐写一个 32 位长度字段所需的载体字节数。
pub const LENGTH_CARRIER_LEN: usize = 32;

/// 扩展名 (含前导 '.') 允许的最大字节数。
pub const MAX_EXTENSION_LEN: usize = 16;

/// 流式处理时每批次的负载字节数。
pub const CHUNK_PAYLOAD_LEN: usize = 4096;

/// 未指定输出路径时隐写图像的默认文件名。
pub const DEFAULT_STEGO_NAME: &str = "stego.bmp";

/// 未指定输出路径时恢复文件的默认文件名。
pub const DEFAULT_DECODE_NAME: &str = "decode.txt";
