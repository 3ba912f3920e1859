//! # 命令处理逻辑模块
//!
//! 包含处理各子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心编解码器以及向用户报告结果；编解码器本身从不接触文件系统。

use crate::bitmap::{BitmapImage, convert_to_bmp};
use crate::capacity::CapacityReport;
use crate::cli::{CapacityArgs, ConvertArgs, HideArgs, RecoverArgs};
use crate::codec::{decode, encode, inspect};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned())
}

/// `hide` 的默认输出路径：与载体同目录的 `stego_<stem>.bmp`。
pub fn default_stego_path(image: &Path) -> PathBuf {
    image.with_file_name(format!("stego_{}.bmp", file_stem(image)))
}

/// `recover` 的默认输出路径：与图像同目录的 `recovered_<stem>[.<ext>]`。
pub fn default_recovered_path(image: &Path, extension: &str) -> PathBuf {
    let stem = file_stem(image);
    if extension.is_empty() {
        image.with_file_name(format!("recovered_{stem}"))
    } else {
        image.with_file_name(format!("recovered_{stem}.{extension}"))
    }
}

/// `convert` 的默认输出路径。输入本身就是 `.bmp` 时改用 `<stem>_24bit.bmp`，避免覆盖输入。
pub fn default_converted_path(input: &Path) -> PathBuf {
    let candidate = input.with_extension("bmp");
    if candidate == input {
        input.with_file_name(format!("{}_24bit.bmp", file_stem(input)))
    } else {
        candidate
    }
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Unable to read {} file: {}",
            what,
            path.to_string_lossy().red().bold()
        )
    })
}

fn write_file(path: &Path, what: &str, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| {
        format!(
            "Unable to write to target {} file: {}",
            what,
            path.to_string_lossy().red().bold()
        )
    })
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和秘密文件、检查隐写空间是否足够、调用编码器，
/// 最后将结果写入目标图像文件。秘密文件的扩展名会随数据一起嵌入。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或秘密文件。
/// * 目标文件已存在且未指定 `--force`。
/// * 图像不是 24 位 BMP，或没有足够的空间来隐藏文件。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_stego_path(&args.image));
    ensure_writable(&dest, args.force)?;

    let picture = read_file(&args.image, "image")?;
    let secret = read_file(&args.secret, "secret")?;
    let extension = args
        .secret
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    // 只看容量，不读取旧的嵌入头：损坏的旧数据不应阻止重新隐写
    let capacity = BitmapImage::parse(&picture)
        .map(|image| CapacityReport::for_image(&image))
        .with_context(|| {
            format!(
                "Unsupported carrier image: {}",
                args.image.to_string_lossy().red().bold()
            )
        })?;
    anyhow::ensure!(
        capacity.payload_bytes >= secret.len(),
        "Not enough space in the image to hide the file. \nRequired: {}, Available: {}",
        secret.len().to_string().red().bold(),
        capacity.payload_bytes.to_string().green().bold()
    );

    let stego = encode(&picture, &secret, &extension, &args.magic).with_context(|| {
        format!(
            "Failed to hide {} in the image.",
            args.secret.to_string_lossy().red().bold()
        )
    })?;

    write_file(&dest, "image", &stego)?;

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用解码器恢复数据和原扩展名，
/// 最后将恢复的内容写入目标文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有隐藏数据，或密码错误、数据已损坏。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let picture = read_file(&args.image, "image")?;

    let secret = decode(&picture, &args.magic).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_recovered_path(&args.image, &secret.extension));
    ensure_writable(&output, args.force)?;
    write_file(&output, "output", &secret.payload)?;

    println!(
        "The file has been successfully recovered and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：打印位槽总数、嵌入头占用和可隐藏的最大字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = read_file(&args.image, "image")?;
    let inspection = inspect(&picture).with_context(|| {
        format!(
            "Unsupported carrier image: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let capacity = inspection.capacity;

    println!(
        "Bit slots: {}, header: {}, usable payload: {} bytes",
        capacity.total_bits.to_string().green().bold(),
        capacity.header_bits.to_string().yellow(),
        capacity.payload_bytes.to_string().green().bold()
    );
    match inspection.hidden {
        Some(header) => println!(
            "Hidden data detected: {} bytes, extension '{}'",
            header.length.to_string().red().bold(),
            header.extension.red().bold()
        ),
        None => println!("No hidden data detected."),
    }
    Ok(())
}

/// 处理 'Convert' 命令：把输入图像重新编码为未压缩的 24 位 BMP。
pub fn handle_convert(args: ConvertArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_converted_path(&args.input));
    ensure_writable(&output, args.force)?;

    let input = read_file(&args.input, "input")?;
    let bitmap = convert_to_bmp(&input).with_context(|| {
        format!(
            "Failed to convert {} to a 24-bit bitmap.",
            args.input.to_string_lossy().red().bold()
        )
    })?;
    write_file(&output, "bitmap", &bitmap)?;

    println!(
        "The image has been converted and saved: {}",
        output.to_string_lossy().green().bold()
    );
    Ok(())
}
