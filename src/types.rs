//! 公共类型定义
//!
//! 集中管理跨模块共享的数据传输对象 (DTO)

use crate::datum::LngLat;
use crate::projection::TileRange;
use serde::Serialize;
use std::path::PathBuf;

/// 多边形环 (首尾闭合的坐标序列)
pub type Ring = Vec<LngLat>;

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
    pub center_lng: f64,
    pub center_lat: f64,
}

impl Bounds {
    pub fn from_corners(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
            center_lng: (min_lng + max_lng) / 2.0,
            center_lat: (min_lat + max_lat) / 2.0,
        }
    }

    /// 计算一组坐标的边界框，空序列返回 None
    pub fn of_points(points: &[LngLat]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_lng = f64::MAX;
        let mut min_lat = f64::MAX;
        let mut max_lng = f64::MIN;
        let mut max_lat = f64::MIN;

        for p in points {
            min_lng = min_lng.min(p.lng);
            min_lat = min_lat.min(p.lat);
            max_lng = max_lng.max(p.lng);
            max_lat = max_lat.max(p.lat);
        }

        Some(Self::from_corners(min_lng, min_lat, max_lng, max_lat))
    }

    /// 左下角，格式 `纬度,经度`
    pub fn lower_left(&self) -> String {
        format!("{},{}", self.min_lat, self.min_lng)
    }

    /// 右上角，格式 `纬度,经度`
    pub fn upper_right(&self) -> String {
        format!("{},{}", self.max_lat, self.max_lng)
    }
}

/// 区域摘要
#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    /// 从 1 开始的区域序号
    pub index: usize,
    pub point_count: usize,
    pub bounds: Bounds,
    pub tiles: TileRange,
    pub tile_count: u64,
}

/// 单个区域的下载失败记录
#[derive(Debug, Clone, Serialize)]
pub struct RegionFailure {
    pub index: usize,
    pub message: String,
}

/// 下载结果
#[derive(Debug, Default, Clone, Serialize)]
pub struct DownloadReport {
    pub total: usize,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<RegionFailure>,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
