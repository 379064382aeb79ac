//! # 进度与状态事件
//!
//! 后台任务和控制器发往表现层的消息。全部通过通道异步投递，
//! 接收端不能假设它们与 `process` 返回之间的先后顺序。
//!
//! ## 依赖关系
//! - 被 `batch/` 产生
//! - 被 `commands/run.rs` 消费

use crate::batch::BatchSummary;
use crate::models::FileJob;

use std::fmt;
use std::io;
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// 单个文件的进度采样
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    /// 源文件名
    pub file_name: String,
    /// 完成百分比（0–100，保留一位小数）
    pub percent: f64,
    /// 瞬时吞吐量 MB/s；空文件或耗时为零时没有该值
    pub throughput_mbps: Option<f64>,
}

impl ProgressSample {
    /// 由已处理字节数、总字节数和耗时计算采样
    pub fn new(file_name: &str, processed: u64, total: u64, elapsed: Duration) -> Self {
        if total == 0 {
            return Self::complete(file_name);
        }

        let percent = (processed as f64 / total as f64 * 100.0).min(100.0);
        let secs = elapsed.as_secs_f64();
        let throughput_mbps = if secs > 0.0 {
            Some(processed as f64 / BYTES_PER_MB / secs)
        } else {
            None
        };

        Self {
            file_name: file_name.to_string(),
            percent: (percent * 10.0).round() / 10.0,
            throughput_mbps,
        }
    }

    /// 空文件：直接 100%，不计算吞吐量
    pub fn complete(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            percent: 100.0,
            throughput_mbps: None,
        }
    }
}

impl fmt::Display for ProgressSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.throughput_mbps {
            Some(speed) => write!(
                f,
                "Process {}: {:.1}% ({:.2} MB/s)",
                self.file_name, self.percent, speed
            ),
            None => write!(f, "Process {}: {:.1}%", self.file_name, self.percent),
        }
    }
}

/// 单个文件的处理结果
#[derive(Debug)]
pub enum FileOutcome {
    /// 处理成功，写入的字节数
    Success { bytes: u64 },
    /// 目标已存在且未开启覆盖
    Skipped,
    /// 无法打开源文件
    OpenError(io::Error),
    /// 无法创建目标文件（或无法删除旧目标）
    CreateError(io::Error),
    /// 读取源文件中途失败
    ReadError(io::Error),
    /// 写入目标文件中途失败
    WriteError(io::Error),
    /// 用户停止
    Cancelled,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Success { .. } => "processed",
            FileOutcome::Skipped => "skipped",
            FileOutcome::OpenError(_) => "open error",
            FileOutcome::CreateError(_) => "create error",
            FileOutcome::ReadError(_) => "read error",
            FileOutcome::WriteError(_) => "write error",
            FileOutcome::Cancelled => "cancelled",
        }
    }

    /// 失败原因
    pub fn error(&self) -> Option<&io::Error> {
        match self {
            FileOutcome::OpenError(e)
            | FileOutcome::CreateError(e)
            | FileOutcome::ReadError(e)
            | FileOutcome::WriteError(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error() {
            Some(e) => write!(f, "{}: {}", self.label(), e),
            None => write!(f, "{}", self.label()),
        }
    }
}

/// 发往表现层的事件
#[derive(Debug)]
pub enum BatchEvent {
    /// 批处理开始
    Started { total: usize },
    /// 开始处理第 `index` 个文件（从 0 开始）
    FileStarted {
        index: usize,
        total: usize,
        job: FileJob,
    },
    /// 进度采样
    Progress(ProgressSample),
    /// 单个文件结束
    FileFinished { job: FileJob, outcome: FileOutcome },
    /// 全部文件处理完毕
    Completed(BatchSummary),
    /// 用户停止，在途文件已经收尾
    Stopped(BatchSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_sample_percent() {
        let sample = ProgressSample::new("a.bin", 1, 3, Duration::from_secs(1));
        assert!((sample.percent - 33.3).abs() < 1e-9);

        let sample = ProgressSample::new("a.bin", 3, 3, Duration::from_secs(1));
        assert!((sample.percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_sample_throughput() {
        let mib = 1024 * 1024;
        let sample = ProgressSample::new("a.bin", 4 * mib, 8 * mib, Duration::from_secs(2));
        assert!((sample.throughput_mbps.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(sample.to_string(), "Process a.bin: 50.0% (2.00 MB/s)");

        let sample = ProgressSample::new("a.bin", 10, 20, Duration::ZERO);
        assert_eq!(sample.throughput_mbps, None);
    }

    #[test]
    fn test_progress_sample_empty_file() {
        let sample = ProgressSample::new("empty.txt", 0, 0, Duration::from_millis(5));
        assert_eq!(sample.percent, 100.0);
        assert_eq!(sample.throughput_mbps, None);
        assert_eq!(sample.to_string(), "Process empty.txt: 100.0%");
    }

    #[test]
    fn test_outcome_classification() {
        assert!(FileOutcome::Success { bytes: 1 }.is_success());
        assert!(!FileOutcome::Skipped.is_success());
        assert!(FileOutcome::Cancelled.error().is_none());

        let outcome = FileOutcome::WriteError(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(outcome.error().map(|e| e.kind()), Some(io::ErrorKind::Other));
        assert_eq!(outcome.to_string(), "write error: disk full");
    }
}
