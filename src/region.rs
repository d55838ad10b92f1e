//! 绘制区域读取
//!
//! 地图绘制工具导出的 GeoJSON 里，每个 Polygon 的每个环、每个 MultiPolygon
//! 中每个多边形的每个环都是一个待下载区域。其他几何类型直接跳过。

use crate::datum::{convert_ring, Datum, LngLat};
use crate::error::RegionError;
use crate::projection::TileRange;
use crate::types::{Bounds, RegionSummary, Ring};
use geojson::{GeoJson, Value};
use std::path::Path;

/// 从文件读取所有区域 (阻塞 I/O)
pub fn read_regions(path: &Path) -> Result<Vec<Ring>, RegionError> {
    let text = std::fs::read_to_string(path).map_err(|source| RegionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_regions(&text)
}

/// 解析 GeoJSON 文本，按文档顺序返回所有环
pub fn parse_regions(text: &str) -> Result<Vec<Ring>, RegionError> {
    let geojson: GeoJson = text.parse()?;
    let mut rings = Vec::new();

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for (index, feature) in collection.features.iter().enumerate() {
                if let Some(geometry) = &feature.geometry {
                    collect_rings(&geometry.value, index, &mut rings)?;
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_rings(&geometry.value, 0, &mut rings)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_rings(&geometry.value, 0, &mut rings)?,
    }

    Ok(rings)
}

fn collect_rings(value: &Value, feature: usize, rings: &mut Vec<Ring>) -> Result<(), RegionError> {
    match value {
        Value::Polygon(polygon) => {
            for ring in polygon {
                rings.push(to_ring(ring, feature)?);
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    rings.push(to_ring(ring, feature)?);
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_rings(&geometry.value, feature, rings)?;
            }
        }
        _ => tracing::debug!(feature, "跳过非多边形要素"),
    }
    Ok(())
}

fn to_ring(positions: &[Vec<f64>], feature: usize) -> Result<Ring, RegionError> {
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [lng, lat, ..] => Ok(LngLat::new(*lng, *lat)),
            _ => Err(RegionError::InvalidPosition { feature }),
        })
        .collect()
}

/// 把所有环从 `from` 坐标系逐点转换到 WGS84
pub fn to_wgs84(rings: &[Ring], from: Datum) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| convert_ring(ring, from, Datum::Wgs84))
        .collect()
}

/// 为每个非空环计算边界框与瓦片数量，序号从 1 开始
pub fn summarize(rings: &[Ring], zoom: u8) -> Vec<RegionSummary> {
    rings
        .iter()
        .enumerate()
        .filter_map(|(i, ring)| {
            let bounds = Bounds::of_points(ring)?;
            let tiles = TileRange::covering(&bounds, zoom);
            Some(RegionSummary {
                index: i + 1,
                point_count: ring.len(),
                bounds,
                tiles,
                tile_count: tiles.count(),
            })
        })
        .collect()
}
