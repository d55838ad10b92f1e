//! 影像下载命令

use super::region::load_regions;
use crate::config::{self, DownloadConfig, DEFAULT_PROVIDER, MAX_ZOOM, MIN_ZOOM};
use crate::datum::Datum;
use crate::downloader::Downloader;
use crate::region;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// 地图导出的 GeoJSON 文件
    pub geojson: PathBuf,
    /// 输出目录，默认与 GeoJSON 文件同目录
    #[arg(short, long, env = "MAPGRAB_OUTPUT")]
    pub output: Option<PathBuf>,
    /// 缩放级别
    #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u8).range(i64::from(MIN_ZOOM)..=i64::from(MAX_ZOOM)))]
    pub zoom: u8,
    /// 影像日期 (YYYY-MM-DD)
    #[arg(long, default_value = "2024-01-01", value_parser = config::parse_date)]
    pub date: NaiveDate,
    /// 外部下载程序路径，默认在本程序旁边查找
    #[arg(long, env = "MAPGRAB_EXE")]
    pub exe: Option<PathBuf>,
    /// 区域坐标所用坐标系
    #[arg(long, default_value = "gcj02")]
    pub from: Datum,
    /// 单个区域超时 (秒)
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,
    /// 影像服务商
    #[arg(long, default_value = DEFAULT_PROVIDER)]
    pub provider: String,
}

impl DownloadArgs {
    fn to_config(&self) -> DownloadConfig {
        let output_dir = self.output.clone().unwrap_or_else(|| {
            self.geojson
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let mut config = DownloadConfig::new(output_dir);
        if let Some(exe) = &self.exe {
            config.exe = exe.clone();
        }
        config.zoom = self.zoom;
        config.date = self.date;
        config.provider = self.provider.clone();
        config.timeout = Duration::from_secs(self.timeout);
        config.source_datum = self.from;
        config
    }
}

pub async fn download(args: DownloadArgs) -> Result<()> {
    let config = args.to_config();
    config.validate().context("下载参数无效")?;

    let rings = load_regions(args.geojson.clone()).await?;
    if rings.is_empty() {
        tracing::warn!(file = ?args.geojson, "GeoJSON 中没有找到区域坐标，跳过下载");
        return Ok(());
    }

    // 下载程序只接受 WGS84
    let rings = region::to_wgs84(&rings, config.source_datum);
    tracing::info!(
        regions = rings.len(),
        output = ?config.output_dir,
        zoom = config.zoom,
        date = %config.date_string(),
        "开始下载"
    );

    let downloader = Downloader::new(config).with_progress(Box::new(|p| {
        tracing::info!("下载进度: {}% ({}/{})", p.percent, p.region, p.total);
    }));
    let report = downloader.run(&rings).await?;

    for output in &report.outputs {
        println!("{}", output.display());
    }
    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("区域 {} 下载失败: {}", failure.index, failure.message);
        }
        bail!("{}/{} 个区域下载失败", report.failures.len(), report.total);
    }

    tracing::info!("全部下载完成");
    Ok(())
}
