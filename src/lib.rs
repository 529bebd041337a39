//! # bmp_lsb 库
//!
//! 本库包含 BMP 最低有效位隐写工具的核心逻辑：
//! 位打包 ([`lsb`])、容量规划 ([`capacity`])、载体流 ([`carrier`])、
//! 编码器 ([`encoder`]) 与解码器 ([`decoder`])。
//!
//! 隐写布局依次为：标记 `#*`、扩展名长度、扩展名、负载长度、负载，
//! 每个负载比特占用一个像素字节的最低位。

// 声明库包含的所有模块。

pub mod capacity;
pub mod carrier;
pub mod cli;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod lsb;
pub mod payload;

pub use decoder::{StegoDecoder, decode};
pub use encoder::{StegoEncoder, encode};
pub use error::StegoError;
pub use payload::Extension;
