//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `inspect` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用编解码器以及向用户报告结果。

use crate::cli::{HideArgs, InspectArgs, RecoverArgs};
use crate::constants::{DEFAULT_CARRIER_EXTENSION, LENGTH_FIELD_BITS};
use crate::decoder::{decode, decode_raster};
use crate::encoder::encode;
use crate::raster::{ImageCodec, RasterCodec};
use crate::steganography::{capacity_bits, capacity_region};
use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 读取要隐藏的文件，生成足够大的载体图像，并按目标路径的扩展名编码保存。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取要隐藏的文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 目标扩展名不是受支持的无损格式。
/// * 扩展名或文件大小超出帧格式的限制。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let payload = fs::read(&args.file).with_context(|| {
        format!(
            "Unable to read payload file: {}",
            args.file.to_string_lossy().red().bold()
        )
    })?;

    let extension = args
        .ext
        .clone()
        .unwrap_or_else(|| extension_of(&args.file).to_string());

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_carrier_path(&args.file));
    ensure_writable(&dest, args.force)?;

    let codec = ImageCodec::for_extension(extension_of(&dest)).with_context(|| {
        format!(
            "Unsupported carrier format: {}. \nUse a lossless format such as png, bmp, tiff, webp or qoi.",
            dest.to_string_lossy().red().bold()
        )
    })?;

    let carrier = encode(&codec, &payload, &extension).with_context(|| {
        format!(
            "Failed to hide {} ({} bytes) in a carrier image.",
            args.file.to_string_lossy().red().bold(),
            payload.len().to_string().red().bold()
        )
    })?;

    fs::write(&dest, carrier).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    info!("Hid {} bytes from {}", payload.len(), args.file.display());
    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 读取载体图像并恢复其中的文件。指定 `--passthrough` 时，
/// 没有可解码帧的图像会被当作普通二进制文件原样保存。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有可解码的帧，且未指定 `--passthrough`。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let (content, extension) = match decode(&ImageCodec::default(), &picture) {
        Ok(decoded) => (decoded.data, decoded.extension),
        Err(e) if args.passthrough => {
            println!(
                "No hidden file found ({}), keeping the image as ordinary binary.",
                e.to_string().yellow()
            );
            (picture, extension_of(&args.image).to_string())
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to recover a hidden file from '{}'. \nThe image may not contain a hidden file or is corrupted.",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
    };

    let output = match args.output.clone() {
        Some(path) => path,
        None => {
            let dir = parent_dir(&args.image);
            next_filename(dir, &file_stem_of(&args.image), &extension)?
        }
    };
    ensure_writable(&output, args.force)?;

    fs::write(&output, &content).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    info!("Recovered {} bytes into {}", content.len(), output.display());
    println!(
        "The file has been successfully recovered and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Inspect' 命令的执行逻辑。
///
/// 报告图像尺寸、容量区域和容量，并尝试解码其中的帧。
/// 图像中没有帧并不算错误。
///
/// # Errors
///
/// 无法读取或解码图像容器时返回错误。
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let raster = ImageCodec::default()
        .decode_raster(&picture)
        .with_context(|| {
            format!(
                "Unable to decode image file: {}",
                args.image.to_string_lossy().red().bold()
            )
        })?;

    let region = capacity_region(raster.height());
    let bits = capacity_bits(raster.width(), raster.height());
    let max_total_length = bits.saturating_sub(LENGTH_FIELD_BITS) / 8;

    println!(
        "Dimensions: {}x{}",
        raster.width().to_string().green(),
        raster.height().to_string().green()
    );
    println!(
        "Capacity region: rows {}..{} ({} bits, frame length up to {} bytes)",
        region.start,
        region.end,
        bits.to_string().green().bold(),
        max_total_length.to_string().green().bold()
    );

    match decode_raster(&raster) {
        Ok(decoded) => println!(
            "Hidden file: {} bytes, extension {}",
            decoded.data.len().to_string().green().bold(),
            format!("{:?}", decoded.extension).green().bold()
        ),
        Err(e) => println!("No hidden file: {}", e.to_string().yellow()),
    }

    Ok(())
}

/// 目标已存在且未指定 `--force` 时拒绝覆盖。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 在 `dir` 中找出下一个可用的 `<prefix>_NNN.<extension>`。
///
/// 编号为已有同名文件中最大的三位编号加一，从 `001` 开始。
///
/// # Errors
///
/// 扩展名来自图像，不可信：含有 ASCII 字母数字、`.`、`-`、`_` 以外的字符，
/// 或含有 `..` 时返回错误，保证结果始终位于 `dir` 之内。
pub fn next_filename(dir: &Path, prefix: &str, extension: &str) -> Result<PathBuf> {
    ensure_safe_extension(extension)?;

    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };

    let entries = fs::read_dir(dir).with_context(|| {
        format!(
            "Unable to list directory: {}",
            dir.to_string_lossy().red().bold()
        )
    })?;

    let mut max_num = 0u32;
    for entry in entries {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let number = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            .filter(|digits| digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u32>().ok());
        if let Some(number) = number {
            max_num = max_num.max(number);
        }
    }

    Ok(dir.join(format!("{prefix}_{:03}{suffix}", max_num + 1)))
}

/// 扩展名只能是单个文件名片段的一部分。
fn ensure_safe_extension(extension: &str) -> Result<()> {
    anyhow::ensure!(
        extension
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
            && !extension.contains(".."),
        "Refusing unsafe file extension {}. \nUse --output to choose the destination explicitly.",
        format!("{extension:?}").red().bold()
    );
    Ok(())
}

/// `hide` 的默认输出：源文件旁的 `carrier_<文件名>.png`。
fn default_carrier_path(file: &Path) -> PathBuf {
    let name = format!(
        "carrier_{}.{}",
        file_stem_of(file),
        DEFAULT_CARRIER_EXTENSION
    );
    file.with_file_name(name)
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
}

fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
