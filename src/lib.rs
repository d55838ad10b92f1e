//! mapgrab - 历史影像区域下载工具
//!
//! 把地图上绘制的区域 (GCJ-02) 转换为 WGS84，再交给外部下载程序拉取历史影像。
//!
//! # 模块结构
//!
//! - `datum`: WGS84 / GCJ-02 / BD-09 坐标系转换
//! - `region`: 绘制区域 GeoJSON 读取
//! - `projection`: Web 墨卡托投影与瓦片估算
//! - `downloader`: 外部下载程序调度
//! - `config`: 下载参数
//! - `error`: 错误类型
//! - `types`: 公共类型定义
//! - `commands`: 命令行子命令

pub mod commands;
pub mod config;
pub mod datum;
pub mod downloader;
pub mod error;
pub mod projection;
pub mod region;
pub mod types;

pub use datum::{
    bd09_to_gcj02, bd09_to_wgs84, gcj02_to_bd09, gcj02_to_wgs84, wgs84_to_bd09, wgs84_to_gcj02,
    Datum, LngLat,
};

use clap::Parser;
use commands::Cli;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 命令行入口
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli.command))
}
