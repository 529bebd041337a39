//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责校验参数、打开文件、调用核心编解码器以及向用户报告结果。
//! 所有文件句柄都由各函数自身持有，在任何退出路径上都会被关闭。

use crate::capacity::max_payload_bytes;
use crate::carrier::{BmpHeader, CarrierSource};
use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::constants::{DEFAULT_DECODE_NAME, DEFAULT_STEGO_NAME};
use crate::decoder::StegoDecoder;
use crate::encoder::StegoEncoder;
use crate::error::StegoError;
use crate::payload::Extension;
use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

fn open_file(path: &Path) -> Result<File, StegoError> {
    File::open(path).map_err(|source| StegoError::FileOpenFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn create_file(path: &Path) -> Result<File, StegoError> {
    File::create(path).map_err(|source| StegoError::FileOpenFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// 图像路径必须以 `.bmp` 结尾 (不区分大小写)。
fn ensure_bmp_path(path: &Path) -> Result<(), StegoError> {
    let is_bmp = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"));
    if is_bmp {
        Ok(())
    } else {
        Err(StegoError::InvalidArguments(format!(
            "'{}' is not a .bmp file",
            path.display()
        )))
    }
}

/// 输出文件已存在且未指定 `--force` 时拒绝覆盖；输出也不能与任何输入是同一个文件。
fn ensure_writable(inputs: &[&Path], output: &Path, force: bool) -> Result<(), StegoError> {
    if !output.exists() {
        return Ok(());
    }
    if !force {
        return Err(StegoError::InvalidArguments(format!(
            "Output file already exists: {}. Use --force to overwrite it.",
            output.display()
        )));
    }
    let Ok(canonical_output) = fs::canonicalize(output) else {
        return Ok(());
    };
    for input in inputs {
        if fs::canonicalize(input).is_ok_and(|input| input == canonical_output) {
            return Err(StegoError::InvalidArguments(format!(
                "Output file {} is the same as the input file {}",
                output.display(),
                input.display()
            )));
        }
    }
    Ok(())
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 先完成参数校验、头部校验与容量检查，全部通过后才创建目标文件，
/// 随后按顺序写入头部、标记、扩展名、负载并复制剩余像素。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 参数不合法 (非 `.bmp` 图像或输出、秘密文件没有扩展名或不是普通文件、输出已存在或与输入相同)。
/// * 无法打开图像、秘密文件或目标文件。
/// * 图像不是受支持的 24 位无压缩 BMP，或容量不足。
/// * 写入过程中出现 I/O 错误；此时目标文件不完整，应当丢弃。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    ensure_bmp_path(&args.image)?;
    let extension = Extension::from_path(&args.secret)
        .map_err(StegoError::InvalidArguments)
        .with_context(|| {
            format!(
                "Unable to use secret file: {}",
                args.secret.to_string_lossy().red().bold()
            )
        })?;
    let dest = args
        .dest
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STEGO_NAME));
    ensure_bmp_path(&dest)?;
    ensure_writable(&[&args.image, &args.secret], &dest, args.force)?;

    info!("Encoding started");
    let image = open_file(&args.image)?;
    let secret = open_file(&args.secret)?;
    let metadata = secret.metadata().with_context(|| {
        format!(
            "Unable to read the size of secret file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;
    // 管道和设备文件报告的长度为 0，无法预先确定负载长度
    if !metadata.is_file() {
        return Err(StegoError::InvalidArguments(format!(
            "'{}' is not a regular file",
            args.secret.display()
        ))
        .into());
    }
    let secret_len = metadata.len();
    info!("Opening of files successful");

    let encoder = StegoEncoder::plan(BufReader::new(image), extension, secret_len).with_context(
        || {
            format!(
                "Unable to hide {} in {}",
                args.secret.to_string_lossy().red().bold(),
                args.image.to_string_lossy().red().bold()
            )
        },
    )?;

    let stego = create_file(&dest)?;
    let summary = encoder
        .embed_into(BufReader::new(secret), BufWriter::new(stego))
        .with_context(|| {
            format!(
                "Failed to hide the secret file. \nThe output file {} is incomplete and must be discarded.",
                dest.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "Used {} of {} carrier bytes.",
        summary.embedded_bytes.to_string().green().bold(),
        summary.report.available_bytes.to_string().green().bold()
    );
    println!(
        "The secret file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 标记、扩展名和负载长度全部校验通过后才创建输出文件，
/// 负载随提取过程逐批写出。源图像只会被读取。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 参数不合法或输出文件已存在。
/// * 无法打开隐写图像或输出文件。
/// * 图像中没有隐写标记、扩展名无效或长度字段超出图像数据范围。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    ensure_bmp_path(&args.image)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DECODE_NAME));
    ensure_writable(&[&args.image], &output, args.force)?;

    info!("Decoding started");
    let image = open_file(&args.image)?;
    let decoder = StegoDecoder::open(BufReader::new(image)).with_context(|| {
        format!(
            "Failed to recover a secret file from '{}'. \nThe image may not contain a hidden file or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let recovered_ext = decoder.extension().clone();
    let requested_ext = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()));
    if requested_ext.as_deref() != Some(recovered_ext.as_str()) {
        warn!(
            "The hidden file was a '{}' file, but it is being saved as {}",
            recovered_ext,
            output.display()
        );
    }

    let file = create_file(&output)?;
    let written = decoder
        .extract_to(BufWriter::new(file))
        .with_context(|| {
            format!(
                "Failed to write the recovered data to {}",
                output.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "Recovered {} bytes of a '{}' file.",
        written.to_string().green().bold(),
        recovered_ext.to_string().green().bold()
    );
    println!(
        "The secret file has been successfully recovered and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：报告图像尺寸、载体容量以及可容纳的最大负载。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    ensure_bmp_path(&args.image)?;
    let extension = Extension::parse(args.extension.as_bytes())
        .map_err(StegoError::InvalidArguments)?;

    let image = open_file(&args.image)?;
    let mut source = CarrierSource::new(BufReader::new(image))?;
    let header = BmpHeader::parse(source.read_header()?).with_context(|| {
        format!(
            "Unable to inspect image: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    // 以头部声明与文件实际像素字节数中较小者为准
    let capacity = header.capacity_bytes().min(source.remaining());
    let max_payload = max_payload_bytes(capacity, extension.as_bytes().len() as u64);

    println!(
        "Image: {} x {} pixels",
        header.width().to_string().green().bold(),
        header.height().to_string().green().bold()
    );
    println!(
        "Carrier capacity: {} bytes",
        capacity.to_string().green().bold()
    );
    println!(
        "Largest '{}' file that fits: {} bytes",
        extension,
        max_payload.to_string().green().bold()
    );
    Ok(())
}
