//! 国内地图坐标系转换 (WGS84 / GCJ-02 / BD-09)
//!
//! - WGS84: GPS 原始坐标
//! - GCJ-02: 国测局加密坐标 ("火星坐标"，高德、腾讯、谷歌中国)
//! - BD-09: 百度坐标，在 GCJ-02 基础上再次偏移
//!
//! 所有函数都是纯函数，参数与返回值均为 `(经度, 纬度)`，单位为度。
//! 公式为经验公式，常量不可调整；GCJ-02 -> WGS84 为近似逆变换，
//! 往返转换存在微小残差。

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// BD-09 极坐标偏移使用的 π 缩放
const X_PI: f64 = PI * 3000.0 / 180.0;

/// 克拉索夫斯基椭球长半轴 (米)
const A: f64 = 6378245.0;

/// 椭球第一偏心率平方
#[allow(clippy::excessive_precision)]
const EE: f64 = 0.00669342162296594323;

/// BD-09 相对 GCJ-02 的固定偏移
const BD_LNG_OFFSET: f64 = 0.0065;
const BD_LAT_OFFSET: f64 = 0.006;

/// 地理坐标点 (十进制度)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for (f64, f64) {
    fn from(p: LngLat) -> Self {
        (p.lng, p.lat)
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

/// 坐标系标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datum {
    Wgs84,
    Gcj02,
    Bd09,
}

impl Datum {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datum::Wgs84 => "wgs84",
            Datum::Gcj02 => "gcj02",
            Datum::Bd09 => "bd09",
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知坐标系: {0} (可选 wgs84 / gcj02 / bd09)")]
pub struct ParseDatumError(pub String);

impl FromStr for Datum {
    type Err = ParseDatumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "wgs84" | "gps" => Ok(Datum::Wgs84),
            "gcj02" | "mars" | "amap" | "gaode" => Ok(Datum::Gcj02),
            "bd09" | "baidu" => Ok(Datum::Bd09),
            _ => Err(ParseDatumError(s.to_string())),
        }
    }
}

/// 火星坐标 (GCJ-02) 转百度坐标 (BD-09)
pub fn gcj02_to_bd09(lng: f64, lat: f64) -> (f64, f64) {
    let z = (lng * lng + lat * lat).sqrt() + 0.00002 * (lat * X_PI).sin();
    let theta = lat.atan2(lng) + 0.000003 * (lng * X_PI).cos();
    let bd_lng = z * theta.cos() + BD_LNG_OFFSET;
    let bd_lat = z * theta.sin() + BD_LAT_OFFSET;
    (bd_lng, bd_lat)
}

/// 百度坐标 (BD-09) 转火星坐标 (GCJ-02)
pub fn bd09_to_gcj02(bd_lng: f64, bd_lat: f64) -> (f64, f64) {
    let x = bd_lng - BD_LNG_OFFSET;
    let y = bd_lat - BD_LAT_OFFSET;
    let z = (x * x + y * y).sqrt() - 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000003 * (x * X_PI).cos();
    (z * theta.cos(), z * theta.sin())
}

/// WGS84 转火星坐标 (GCJ-02)，国外坐标原样返回
pub fn wgs84_to_gcj02(lng: f64, lat: f64) -> (f64, f64) {
    if out_of_china(lng, lat) {
        return (lng, lat);
    }
    let (dlng, dlat) = offset(lng, lat);
    (lng + dlng, lat + dlat)
}

/// 火星坐标 (GCJ-02) 转 WGS84，国外坐标原样返回
///
/// 把 GCJ-02 点当作 WGS84 点求偏移量，再用 `2 × 原坐标 − 正向结果`
/// 近似求逆，不是精确逆变换。
pub fn gcj02_to_wgs84(lng: f64, lat: f64) -> (f64, f64) {
    if out_of_china(lng, lat) {
        return (lng, lat);
    }
    let (dlng, dlat) = offset(lng, lat);
    let mg_lng = lng + dlng;
    let mg_lat = lat + dlat;
    (lng * 2.0 - mg_lng, lat * 2.0 - mg_lat)
}

/// 百度坐标 (BD-09) 转 WGS84
pub fn bd09_to_wgs84(bd_lng: f64, bd_lat: f64) -> (f64, f64) {
    let (lng, lat) = bd09_to_gcj02(bd_lng, bd_lat);
    gcj02_to_wgs84(lng, lat)
}

/// WGS84 转百度坐标 (BD-09)
pub fn wgs84_to_bd09(lng: f64, lat: f64) -> (f64, f64) {
    let (lng, lat) = wgs84_to_gcj02(lng, lat);
    gcj02_to_bd09(lng, lat)
}

/// 判断是否在国内，不在国内不做偏移 (边界上视为国外)
pub fn out_of_china(lng: f64, lat: f64) -> bool {
    !(lng > 73.66 && lng < 135.05 && lat > 3.86 && lat < 53.55)
}

/// 在任意两个坐标系之间转换
pub fn convert(point: LngLat, from: Datum, to: Datum) -> LngLat {
    let f: fn(f64, f64) -> (f64, f64) = match (from, to) {
        (Datum::Wgs84, Datum::Gcj02) => wgs84_to_gcj02,
        (Datum::Gcj02, Datum::Wgs84) => gcj02_to_wgs84,
        (Datum::Gcj02, Datum::Bd09) => gcj02_to_bd09,
        (Datum::Bd09, Datum::Gcj02) => bd09_to_gcj02,
        (Datum::Wgs84, Datum::Bd09) => wgs84_to_bd09,
        (Datum::Bd09, Datum::Wgs84) => bd09_to_wgs84,
        _ => return point,
    };
    f(point.lng, point.lat).into()
}

/// 逐点转换一个坐标序列 (多边形环)
pub fn convert_ring(points: &[LngLat], from: Datum, to: Datum) -> Vec<LngLat> {
    points.iter().map(|&p| convert(p, from, to)).collect()
}

/// 按纬度处的椭球曲率缩放后的 (经度偏移, 纬度偏移)
fn offset(lng: f64, lat: f64) -> (f64, f64) {
    let dlat = transform_lat(lng - 105.0, lat - 35.0);
    let dlng = transform_lng(lng - 105.0, lat - 35.0);
    let radlat = lat / 180.0 * PI;
    let magic = radlat.sin();
    let magic = 1.0 - EE * magic * magic;
    let sqrtmagic = magic.sqrt();
    let dlat = (dlat * 180.0) / ((A * (1.0 - EE)) / (magic * sqrtmagic) * PI);
    let dlng = (dlng * 180.0) / (A / sqrtmagic * radlat.cos() * PI);
    (dlng, dlat)
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BEIJING: (f64, f64) = (116.3975, 39.9087);
    const GUANGZHOU: (f64, f64) = (113.2644, 23.1291);
    const SHANGHAI: (f64, f64) = (121.4737, 31.2304);

    #[test]
    fn test_identity_outside_china() {
        let samples = [
            (2.3522, 48.8566),   // 巴黎
            (-74.006, 40.7128),  // 纽约
            (73.66, 30.0),       // 西边界
            (135.05, 30.0),      // 东边界
            (100.0, 3.86),       // 南边界
            (100.0, 53.55),      // 北边界
            (139.6917, 35.6895), // 东京
        ];
        for (lng, lat) in samples {
            assert_eq!(wgs84_to_gcj02(lng, lat), (lng, lat));
            assert_eq!(gcj02_to_wgs84(lng, lat), (lng, lat));
        }
    }

    #[test]
    fn test_boundary_is_strict() {
        assert!(out_of_china(73.66, 30.0));
        assert!(!out_of_china(73.67, 30.0));
        assert!(out_of_china(135.05, 30.0));
        assert!(out_of_china(100.0, 3.86));
        assert!(out_of_china(100.0, 53.55));
        assert!(!out_of_china(BEIJING.0, BEIJING.1));
    }

    #[test]
    fn test_composition_is_bit_exact() {
        for (lng, lat) in [BEIJING, GUANGZHOU, SHANGHAI, (113.224367, 25.69346)] {
            let (g_lng, g_lat) = bd09_to_gcj02(lng, lat);
            assert_eq!(bd09_to_wgs84(lng, lat), gcj02_to_wgs84(g_lng, g_lat));

            let (g_lng, g_lat) = wgs84_to_gcj02(lng, lat);
            assert_eq!(wgs84_to_bd09(lng, lat), gcj02_to_bd09(g_lng, g_lat));
        }
    }

    #[test]
    fn test_golden_bd09_to_wgs84() {
        let (lng, lat) = bd09_to_wgs84(113.224367, 25.69346);
        assert_relative_eq!(lng, 113.21226155590992, epsilon = 1e-12);
        assert_relative_eq!(lat, 25.69073030457616, epsilon = 1e-12);
    }

    #[test]
    fn test_wgs84_to_gcj02_beijing() {
        let (lng, lat) = wgs84_to_gcj02(BEIJING.0, BEIJING.1);
        assert_relative_eq!(lng, 116.40374357265176, epsilon = 1e-12);
        assert_relative_eq!(lat, 39.91010349934476, epsilon = 1e-12);
    }

    #[test]
    fn test_bd09_round_values() {
        let (lng, lat) = gcj02_to_bd09(BEIJING.0, BEIJING.1);
        assert_relative_eq!(lng, 116.40387297451515, epsilon = 1e-12);
        assert_relative_eq!(lat, 39.915043351185915, epsilon = 1e-12);

        let (lng, lat) = bd09_to_gcj02(BEIJING.0, BEIJING.1);
        assert_relative_eq!(lng, 116.39110932600329, epsilon = 1e-12);
        assert_relative_eq!(lat, 39.902389798326105, epsilon = 1e-12);
    }

    #[test]
    fn test_approximate_round_trip() {
        let (g_lng, g_lat) = wgs84_to_gcj02(BEIJING.0, BEIJING.1);
        let (lng, lat) = gcj02_to_wgs84(g_lng, g_lat);
        assert!((lng - BEIJING.0).abs() < 1e-6);
        assert!((lat - BEIJING.1).abs() < 1e-6);

        // 近似逆变换的残差随位置变化，国内一般在 2e-5 度以内
        for (lng0, lat0) in [GUANGZHOU, SHANGHAI] {
            let (g_lng, g_lat) = wgs84_to_gcj02(lng0, lat0);
            let (lng, lat) = gcj02_to_wgs84(g_lng, g_lat);
            assert!((lng - lng0).abs() < 5e-5, "lng residual {}", lng - lng0);
            assert!((lat - lat0).abs() < 5e-5, "lat residual {}", lat - lat0);
            // 但不是精确逆
            assert_ne!((lng, lat), (lng0, lat0));
        }
    }

    #[test]
    fn test_bd09_offset_bounds() {
        for lng in [80.0, 95.5, 105.0, 116.3975, 121.4737, 130.0] {
            for lat in [10.0, 23.1291, 31.2304, 39.9087, 50.0] {
                let (b_lng, b_lat) = gcj02_to_bd09(lng, lat);
                let d = (b_lng - lng).hypot(b_lat - lat);
                assert!(d > 0.0085 && d < 0.0095, "displacement {} at ({}, {})", d, lng, lat);
            }
        }
    }

    #[test]
    fn test_convert_dispatch() {
        let p = LngLat::from(BEIJING);
        assert_eq!(convert(p, Datum::Gcj02, Datum::Gcj02), p);
        assert_eq!(
            convert(p, Datum::Bd09, Datum::Wgs84),
            bd09_to_wgs84(p.lng, p.lat).into()
        );
        assert_eq!(
            convert(p, Datum::Wgs84, Datum::Gcj02),
            wgs84_to_gcj02(p.lng, p.lat).into()
        );

        let ring = [p, LngLat::new(116.4, 39.91), LngLat::new(116.41, 39.92)];
        let converted = convert_ring(&ring, Datum::Gcj02, Datum::Wgs84);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[1], gcj02_to_wgs84(116.4, 39.91).into());
    }

    #[test]
    fn test_parse_datum() {
        assert_eq!("WGS84".parse::<Datum>(), Ok(Datum::Wgs84));
        assert_eq!("gcj-02".parse::<Datum>(), Ok(Datum::Gcj02));
        assert_eq!("amap".parse::<Datum>(), Ok(Datum::Gcj02));
        assert_eq!("BD_09".parse::<Datum>(), Ok(Datum::Bd09));
        assert_eq!("baidu".parse::<Datum>(), Ok(Datum::Bd09));
        assert!("utm".parse::<Datum>().is_err());
        assert_eq!(Datum::Gcj02.to_string(), "gcj02");
    }
}
