//! 外部影像下载程序调度
//!
//! 每个区域调用一次下载程序，命令行约定固定：
//!
//! ```text
//! <exe> download --lower-left "<lat>,<lng>" --upper-right "<lat>,<lng>"
//!       --zoom <int> --date <YYYY-MM-DD> --provider TM --output <file>.tif
//! ```
//!
//! 区域按顺序处理；单个区域失败 (退出码非 0、超时、无法启动) 只记录，
//! 不中断后续区域。

use crate::config::DownloadConfig;
use crate::datum::LngLat;
use crate::error::DownloadError;
use crate::projection::TileRange;
use crate::types::{Bounds, DownloadReport, RegionFailure, Ring};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// 输出文件名前缀
pub const OUTPUT_PREFIX: &str = "historical_img_";

/// 下载进度回调
pub type ProgressCallback = Box<dyn Fn(DownloadProgress) + Send + Sync>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DownloadProgress {
    /// 刚完成的区域序号 (从 1 开始)
    pub region: usize,
    pub total: usize,
    pub percent: u8,
}

/// 构建一次下载的参数列表 (不含程序路径)
pub fn build_args(config: &DownloadConfig, bounds: &Bounds, output: &Path) -> Vec<OsString> {
    vec![
        "download".into(),
        "--lower-left".into(),
        bounds.lower_left().into(),
        "--upper-right".into(),
        bounds.upper_right().into(),
        "--zoom".into(),
        config.zoom.to_string().into(),
        "--date".into(),
        config.date_string().into(),
        "--provider".into(),
        config.provider.clone().into(),
        "--output".into(),
        output.as_os_str().to_os_string(),
    ]
}

/// 从 `start` 开始找第一个没有被任何已有文件名作为前缀占用的序号
pub async fn next_output_stem(dir: &Path, start: usize) -> std::io::Result<(usize, String)> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    let mut j = start;
    loop {
        let stem = format!("{OUTPUT_PREFIX}{j}");
        if !names.iter().any(|name| name.starts_with(&stem)) {
            return Ok((j, stem));
        }
        j += 1;
    }
}

pub struct Downloader {
    config: DownloadConfig,
    progress: Option<ProgressCallback>,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// 依次下载所有区域 (坐标必须已是 WGS84)
    ///
    /// 只有输出目录不可用时返回 Err，单个区域的失败记录在报告里。
    pub async fn run(&self, regions: &[Ring]) -> Result<DownloadReport, DownloadError> {
        let dir = &self.config.output_dir;
        let is_dir = tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(DownloadError::OutputDir(dir.clone()));
        }

        let total = regions.len();
        let mut report = DownloadReport {
            total,
            ..Default::default()
        };
        let mut j = 0;

        for (i, ring) in regions.iter().enumerate() {
            let index = i + 1;
            match self.download_region(ring, j).await {
                Ok((next, output)) => {
                    tracing::info!(region = index, output = ?output, "区域下载完成");
                    report.outputs.push(output);
                    j = next + 1;

                    if let Some(callback) = &self.progress {
                        callback(DownloadProgress {
                            region: index,
                            total,
                            percent: (index * 100 / total) as u8,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(region = index, error = %e, "区域下载失败");
                    report.failures.push(RegionFailure {
                        index,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn download_region(
        &self,
        ring: &[LngLat],
        start: usize,
    ) -> Result<(usize, PathBuf), DownloadError> {
        let bounds = Bounds::of_points(ring).ok_or(DownloadError::EmptyRegion)?;
        let (j, stem) = next_output_stem(&self.config.output_dir, start).await?;
        let output = self.config.output_dir.join(format!("{stem}.tif"));

        let tiles = TileRange::covering(&bounds, self.config.zoom);
        tracing::info!(
            lower_left = %bounds.lower_left(),
            upper_right = %bounds.upper_right(),
            zoom = self.config.zoom,
            tiles = tiles.count(),
            "开始下载"
        );

        self.invoke(&bounds, &output).await?;
        Ok((j, output))
    }

    async fn invoke(&self, bounds: &Bounds, output: &Path) -> Result<(), DownloadError> {
        let args = build_args(&self.config, bounds, output);
        tracing::debug!(exe = ?self.config.exe, ?args, "执行下载程序");

        let child = Command::new(&self.config.exe)
            .args(&args)
            .current_dir(&self.config.output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DownloadError::Spawn {
                exe: self.config.exe.clone(),
                source,
            })?;

        // 超时后 child 随 future 一起被丢弃并 kill
        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| DownloadError::Timeout(self.config.timeout))??;

        // 下载程序的输出编码不固定，按有损 UTF-8 解码
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            if !stdout.trim().is_empty() {
                tracing::debug!(stdout = %stdout.trim(), "下载程序输出");
            }
            Ok(())
        } else {
            Err(DownloadError::ExitStatus {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}
