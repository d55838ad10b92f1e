//! 下载参数
//!
//! 默认值与桌面版保持一致：缩放级别 18，日期 2024-01-01，服务商 TM，
//! 单个区域超时 5 分钟，下载程序放在当前可执行文件旁边。

use crate::datum::Datum;
use crate::error::ConfigError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 20;
pub const DEFAULT_ZOOM: u8 = 18;
pub const DEFAULT_PROVIDER: &str = "TM";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "GEHistoricalImagery.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "GEHistoricalImagery";

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// 外部下载程序
    pub exe: PathBuf,
    /// 输出目录，同时作为下载程序的工作目录
    pub output_dir: PathBuf,
    pub zoom: u8,
    pub date: NaiveDate,
    pub provider: String,
    pub timeout: Duration,
    /// 输入区域所用坐标系，下载前统一转换为 WGS84
    pub source_datum: Datum,
}

impl DownloadConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            exe: default_executable(),
            output_dir: output_dir.into(),
            zoom: DEFAULT_ZOOM,
            date: default_date(),
            provider: DEFAULT_PROVIDER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            source_datum: Datum::Gcj02,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            return Err(ConfigError::InvalidZoom(self.zoom));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.provider.trim().is_empty() {
            return Err(ConfigError::EmptyProvider);
        }
        Ok(())
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// 解析 `YYYY-MM-DD` 日期
pub fn parse_date(s: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| ConfigError::InvalidDate(s.to_string(), e))
}

fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// 当前可执行文件所在目录下的下载程序，取不到时退回到 PATH 查找
pub fn default_executable() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .map(|dir| dir.join(EXECUTABLE_NAME))
        .unwrap_or_else(|| PathBuf::from(EXECUTABLE_NAME))
}
