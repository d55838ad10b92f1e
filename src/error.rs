//! 错误类型
//!
//! 坐标转换本身没有失败路径，这里只覆盖区域读取、下载调度和配置校验。

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("无法读取 GeoJSON 文件 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GeoJSON 解析失败: {0}")]
    Parse(#[from] geojson::Error),

    #[error("第 {feature} 个要素含有无效坐标: 至少需要经度和纬度")]
    InvalidPosition { feature: usize },
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("输出目录不存在: {0:?}")]
    OutputDir(PathBuf),

    #[error("区域没有坐标")]
    EmptyRegion,

    #[error("无法启动下载程序 {exe:?}: {source}")]
    Spawn {
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("下载超时 ({0:?})")]
    Timeout(Duration),

    #[error("下载程序异常退出 (退出码 {code:?}): {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缩放级别 {0} 超出范围 (1-20)")]
    InvalidZoom(u8),

    #[error("日期格式无效 {0:?}，应为 YYYY-MM-DD")]
    InvalidDate(String, #[source] chrono::ParseError),

    #[error("超时时间必须大于 0")]
    InvalidTimeout,

    #[error("影像服务商不能为空")]
    EmptyProvider,
}
