//! # 命令行接口模块
//!
//! 定义 `hide`、`recover`、`capacity`、`convert` 四个子命令及其参数。
//! 隐藏与恢复都要求提供魔术字符串；所有输出路径均可省略，省略时由 `handler` 推导默认值。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用魔术字符串 (密码) 将任意文件隐藏在 24 位 BMP 图像中，或将其恢复。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用魔术字符串 (密码) 将任意文件隐藏在 24 位 BMP 图像中，或将其恢复。\n嵌入顺序和内容掩码都由密码决定，密码错误时恢复会失败而不是输出乱码。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 24 位 BMP 图像中隐藏任意文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 显示图像的隐写容量，以及是否检测到隐藏数据。
    Capacity(CapacityArgs),

    /// 将任意支持的图像转换为未压缩的 24 位 BMP。
    Convert(ConvertArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的 24 位 BMP 载体图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径。其扩展名会一同保存。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 魔术字符串 (密码)。
    #[arg(short, long)]
    pub magic: String,

    /// 结果图像的输出路径，默认为 `stego_<原图名>.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 魔术字符串 (密码)。
    #[arg(short, long)]
    pub magic: String,

    /// 恢复文件的输出路径，默认为 `recovered_<图像名>.<原扩展名>`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,
}

/// 'convert' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// 输入图像 (PNG, TIFF, WebP, QOI, BMP)。
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出 BMP 的路径，默认与输入同名但扩展名为 `.bmp`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}
