//! 命令行子命令
//!
//! 按功能分组的命令处理器

mod convert;
mod download;
mod region;

pub use convert::*;
pub use download::*;
pub use region::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 输出调试日志 (RUST_LOG 优先)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 在 WGS84 / GCJ-02 / BD-09 之间转换单个坐标
    Convert(ConvertArgs),
    /// 读取绘制区域，输出每个区域的 WGS84 边界框与瓦片数
    Bounds(BoundsArgs),
    /// 读取绘制区域并调用外部程序下载历史影像
    Download(DownloadArgs),
}

/// 执行子命令
pub async fn dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Convert(args) => convert(args),
        Command::Bounds(args) => bounds(args).await,
        Command::Download(args) => download(args).await,
    }
}
