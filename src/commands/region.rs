//! 区域查询命令

use crate::config::{MAX_ZOOM, MIN_ZOOM};
use crate::datum::Datum;
use crate::region;
use crate::types::Ring;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BoundsArgs {
    /// 地图导出的 GeoJSON 文件
    pub geojson: PathBuf,
    /// 区域坐标所用坐标系
    #[arg(long, default_value = "gcj02")]
    pub from: Datum,
    /// 用于估算瓦片数的缩放级别
    #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u8).range(i64::from(MIN_ZOOM)..=i64::from(MAX_ZOOM)))]
    pub zoom: u8,
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 在阻塞线程池中读取区域文件，避免阻塞运行时
pub async fn load_regions(path: PathBuf) -> Result<Vec<Ring>> {
    let display = path.clone();
    tokio::task::spawn_blocking(move || region::read_regions(&path))
        .await
        .context("读取任务异常退出")?
        .with_context(|| format!("无法加载区域文件: {:?}", display))
}

pub async fn bounds(args: BoundsArgs) -> Result<()> {
    let rings = load_regions(args.geojson).await?;
    let rings = region::to_wgs84(&rings, args.from);
    let summaries = region::summarize(&rings, args.zoom);
    tracing::info!(regions = summaries.len(), "区域读取完成");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for s in &summaries {
        println!(
            "#{} 点数 {} 左下 {} 右上 {} 中心 {},{} z{} 瓦片 {}",
            s.index,
            s.point_count,
            s.bounds.lower_left(),
            s.bounds.upper_right(),
            s.bounds.center_lat,
            s.bounds.center_lng,
            s.tiles.zoom,
            s.tile_count
        );
    }
    Ok(())
}
