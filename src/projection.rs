//! Web 墨卡托投影 (EPSG:3857) 与瓦片编号
//!
//! 影像下载工具按 XYZ 瓦片拉取数据，这里用来在调用外部程序之前
//! 估算一个 WGS84 边界框在指定缩放级别下覆盖多少张瓦片。

use crate::types::Bounds;
use serde::Serialize;
use std::f64::consts::PI;

/// 地球赤道半周长（米）
/// 计算方式：地球半径 6378137m × π
const EARTH_HALF_CIRCUMFERENCE: f64 = 20037508.342789244;

/// Web 墨卡托可表示的最大纬度
const MAX_LATITUDE: f64 = 85.051129;

/// 将 WGS84 经纬度转换为 Web 墨卡托坐标（米）
///
/// 纬度被限制在 ±85.051129 之内，避免 tan 在极点附近发散。
#[inline]
pub fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * EARTH_HALF_CIRCUMFERENCE / 180.0;
    let lat_rad = (90.0 + lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)) * PI / 360.0;
    let y = lat_rad.tan().ln() * EARTH_HALF_CIRCUMFERENCE / PI;
    (x, y)
}

/// 将 Web 墨卡托坐标转换回 WGS84 经纬度
#[inline]
pub fn mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 180.0 / EARTH_HALF_CIRCUMFERENCE;
    let lat = (2.0 * (y * PI / EARTH_HALF_CIRCUMFERENCE).exp().atan() - PI / 2.0) * 180.0 / PI;
    (lon, lat)
}

/// 经纬度所在的 XYZ 瓦片编号 (原点在左上角)
pub fn lonlat_to_tile(lon: f64, lat: f64, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom);
    let max_index = (1u32 << zoom) - 1;

    // 墨卡托坐标归一化到 [0, 1]
    let (mx, my) = lonlat_to_mercator(lon.clamp(-180.0, 180.0), lat);
    let fx = (mx + EARTH_HALF_CIRCUMFERENCE) / (2.0 * EARTH_HALF_CIRCUMFERENCE);
    let fy = (EARTH_HALF_CIRCUMFERENCE - my) / (2.0 * EARTH_HALF_CIRCUMFERENCE);

    let x = ((fx * n).floor().max(0.0) as u32).min(max_index);
    let y = ((fy * n).floor().max(0.0) as u32).min(max_index);
    (x, y)
}

/// 边界框覆盖的瓦片范围 (闭区间)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileRange {
    pub fn covering(bounds: &Bounds, zoom: u8) -> Self {
        let (min_x, min_y) = lonlat_to_tile(bounds.min_lng, bounds.max_lat, zoom);
        let (max_x, max_y) = lonlat_to_tile(bounds.max_lng, bounds.min_lat, zoom);
        Self {
            zoom,
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// 瓦片总数
    pub fn count(&self) -> u64 {
        let w = u64::from(self.max_x - self.min_x) + 1;
        let h = u64::from(self.max_y - self.min_y) + 1;
        w * h
    }
}
