//! # 批处理结果统计
//!
//! 按单个文件的结果累计成功、跳过、失败数量和失败详情。
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs` 累计
//! - 随 `BatchEvent::Completed` / `BatchEvent::Stopped` 发给表现层

use crate::models::{FileJob, FileOutcome};

/// 批处理结果统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// 成功数量
    pub processed: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 被取消的数量
    pub cancelled: usize,
    /// 成功写出的总字节数
    pub bytes: u64,
    /// 失败详情 (文件名, 错误信息)
    pub failures: Vec<(String, String)>,
}

impl BatchSummary {
    /// 记录一个文件的结果
    pub fn record(&mut self, job: &FileJob, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Success { bytes } => {
                self.processed += 1;
                self.bytes += bytes;
            }
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Cancelled => self.cancelled += 1,
            failure => {
                self.failed += 1;
                self.failures.push((job.file_name(), failure.to_string()));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed + self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_record_outcomes() {
        let job = FileJob::new(PathBuf::from("/src/a.bin"), Path::new("/out"));
        let mut summary = BatchSummary::default();

        summary.record(&job, &FileOutcome::Success { bytes: 10 });
        summary.record(&job, &FileOutcome::Success { bytes: 5 });
        summary.record(&job, &FileOutcome::Skipped);
        summary.record(
            &job,
            &FileOutcome::OpenError(io::Error::new(io::ErrorKind::NotFound, "gone")),
        );
        summary.record(&job, &FileOutcome::Cancelled);

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.bytes, 15);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.total(), 5);
        assert_eq!(
            summary.failures,
            vec![("a.bin".to_string(), "open error: gone".to_string())]
        );
    }
}
