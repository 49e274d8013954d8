//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

/// 把任意文件藏进自动生成的载体图像 (LSB 隐写)，或从载体图像中恢复文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "把任意文件 (连同扩展名) 藏进自动生成的无损载体图像的最低有效位，之后再从图像中无损恢复。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 日志级别 (off, error, warn, info, debug, trace)，`RUST_LOG` 优先。
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 inspect (检查)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 生成一张藏有指定文件的载体图像。
    Hide(HideArgs),

    /// 从载体图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 报告图像的容量信息以及其中是否藏有文件。
    Inspect(InspectArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub file: PathBuf,

    /// 记录在帧中的扩展名。默认取文件自身的扩展名。
    #[arg(short, long)]
    pub ext: Option<String>,

    /// 载体图像的输出路径，扩展名决定容器格式 (png, bmp, tiff, webp, qoi)。
    /// 默认在源文件旁生成 `carrier_<文件名>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 目标文件已存在时覆盖它。
    #[arg(long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 载体图像的路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的保存路径。
    /// 默认在图像旁生成下一个可用的 `<图像名>_NNN.<扩展名>`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 目标文件已存在时覆盖它。
    #[arg(long)]
    pub force: bool,

    /// 图像中没有可解码的帧时，把图像本身当作普通二进制文件原样保存。
    #[arg(long)]
    pub passthrough: bool,
}

/// 'inspect' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// 要检查的图像路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
