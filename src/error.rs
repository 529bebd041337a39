//! # 错误类型模块
//!
//! [`StegoError`] 覆盖编码与解码流程中所有会中止当前操作的失败情形。
//! 所有错误都是终止性的，不会自动重试。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegoError {
    /// 命令行参数不合法，例如缺少文件名或扩展名无效。
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// 源图像、秘密文件或输出文件无法打开。
    #[error("Unable to open file: {}", .path.display())]
    FileOpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 图像容量不足以容纳全部负载。
    #[error("Not enough space in the image. Required: {required} bytes, Available: {available} bytes")]
    CapacityExceeded { required: u64, available: u64 },

    /// 解码时标记不匹配，图像中没有隐写数据。
    #[error("The image does not contain a hidden payload (magic marker mismatch)")]
    NotSteganographic,

    /// 解码得到的扩展名未通过合法性检查。
    #[error("Recovered extension is not valid: {0}")]
    ExtensionMismatch(String),

    /// 剩余的载体字节少于某个字段所需的数量。
    #[error("Truncated stream while reading {field}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        field: &'static str,
        needed: u64,
        available: u64,
    },

    /// 无法识别的操作模式。
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// 压缩、调色板或非标准头部的 BMP 变体。
    #[error("Unsupported BMP image: {0}")]
    UnsupportedImage(String),

    /// 其余所有 `std::io::Error`。
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StegoError>;
