//! # 文件任务数据模型
//!
//! 队列中的一项：源文件绝对路径和推导出的目标路径。
//!
//! ## 依赖关系
//! - 由 `batch/collector.rs` 创建
//! - 被 `batch/controller.rs`, `batch/transformer.rs` 使用

use std::path::{Path, PathBuf};

/// 目标文件名的固定后缀
pub const PROCESSED_SUFFIX: &str = "_processed";

/// 单个文件任务，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    /// 源文件路径
    pub source: PathBuf,
    /// 目标文件路径
    pub destination: PathBuf,
}

impl FileJob {
    /// 根据源文件和目标目录创建任务
    pub fn new(source: PathBuf, dest_dir: &Path) -> Self {
        let destination = dest_dir.join(processed_file_name(&source));
        Self {
            source,
            destination,
        }
    }

    /// 源文件名（用于状态显示）
    pub fn file_name(&self) -> String {
        display_name(&self.source)
    }

    /// 目标文件名
    pub fn destination_name(&self) -> String {
        display_name(&self.destination)
    }
}

/// `<stem>_processed.<ext>`
///
/// 扩展名为空时仍保留点号，即 `<stem>_processed.`。
pub fn processed_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}.{}", stem, PROCESSED_SUFFIX, ext)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
