//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构。每个子命令同时响应短标志，
//! 因此 `bmp_lsb -e source.bmp secret.txt stego.bmp` 与 `bmp_lsb encode ...` 等价。

use crate::error::StegoError;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位无压缩 BMP 图像中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(version, about, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏)、decode (恢复) 与 capacity (容量查询)。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 把秘密文件隐藏到 BMP 图像中。
    #[command(short_flag = 'e', long_flag = "encode")]
    Encode(HideArgs),

    /// 从隐写图像中恢复秘密文件。
    #[command(short_flag = 'd', long_flag = "decode")]
    Decode(RecoverArgs),

    /// 查询 BMP 图像的容量。
    #[command(short_flag = 'c', long_flag = "capacity")]
    Capacity(CapacityArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct HideArgs {
    /// 用于隐写的源 BMP 图像，只读打开。
    #[arg(value_name = "SOURCE.bmp")]
    pub image: PathBuf,

    /// 要隐藏的秘密文件，扩展名会随数据一起隐写。
    #[arg(value_name = "SECRET")]
    pub secret: PathBuf,

    /// 输出的隐写图像路径，默认为 `stego.bmp`。
    #[arg(value_name = "STEGO.bmp")]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// 包含隐藏数据的 BMP 图像。
    #[arg(value_name = "STEGO.bmp")]
    pub image: PathBuf,

    /// 恢复文件的保存路径，默认为 `decode.txt`。
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// 要查询的 BMP 图像。
    #[arg(value_name = "IMAGE.bmp")]
    pub image: PathBuf,

    /// 计算最大负载时假定的扩展名。
    #[arg(short, long, default_value = ".txt")]
    pub extension: String,
}

/// 把 clap 的解析错误归类为 [`StegoError`]。
///
/// 无法识别的标志或子命令属于 `UnsupportedOperation`，其余用法错误属于 `InvalidArguments`。
pub fn classify_parse_error(err: &clap::Error) -> StegoError {
    let message = err.kind().as_str().unwrap_or("invalid usage").to_string();
    match err.kind() {
        ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument => {
            StegoError::UnsupportedOperation(message)
        }
        _ => StegoError::InvalidArguments(message),
    }
}
