//! # 文件收集器
//!
//! 根据源目录和模式生成有序的 `FileJob` 队列。
//!
//! ## 功能
//! - glob 模式匹配（`*`、`?`、`[...]`），逗号分隔可给出多个模式
//! - 匹配不区分大小写；以 `.` 开头的隐藏文件只有模式本身以 `.` 开头时才会匹配
//! - 只列出源目录下一层的普通文件，不递归
//! - 单文件模式：跳过模式匹配，直接生成一个任务
//!
//! 顺序就是文件系统的枚举顺序，不排序，不同平台之间不保证一致。
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{Result, XorBatchError};
use crate::models::{BatchConfig, FileJob};

use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件名匹配选项
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表（为空时匹配全部）
    patterns: Vec<Pattern>,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = parse_patterns(pattern)?;
        Ok(self)
    }

    /// 收集所有匹配的文件，保持枚举顺序
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let input = fs::canonicalize(&self.input).map_err(|_| XorBatchError::DirectoryNotFound {
            path: self.input.display().to_string(),
        })?;

        if !input.is_dir() {
            return Err(XorBatchError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let walker = WalkDir::new(&input)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        Ok(walker
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect())
    }

    /// 检查文件是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty() || matches_any(&self.patterns, filename)
    }
}

/// 文件名是否匹配任一模式
pub fn matches_any(patterns: &[Pattern], filename: &str) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_with(filename, MATCH_OPTIONS))
}

/// 解析逗号分隔的模式列表
pub fn parse_patterns(pattern: &str) -> Result<Vec<Pattern>> {
    let patterns = pattern
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|p| {
            Pattern::new(p).map_err(|e| XorBatchError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if patterns.is_empty() {
        return Err(XorBatchError::InvalidArgument(
            "file pattern must not be empty".to_string(),
        ));
    }
    Ok(patterns)
}

/// 列出 `source_dir` 中匹配 `pattern` 的文件，生成任务队列
pub fn discover(source_dir: &Path, pattern: &str, dest_dir: &Path) -> Result<Vec<FileJob>> {
    let files = FileCollector::new(source_dir.to_path_buf())
        .with_pattern(pattern)?
        .collect()?;

    Ok(files
        .into_iter()
        .map(|source| FileJob::new(source, dest_dir))
        .collect())
}

/// 单个显式文件，不做模式匹配
pub fn discover_single(path: &Path, dest_dir: &Path) -> Result<Vec<FileJob>> {
    let source = fs::canonicalize(path).map_err(|_| XorBatchError::FileNotFound {
        path: path.display().to_string(),
    })?;

    if !source.is_file() {
        return Err(XorBatchError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    Ok(vec![FileJob::new(source, dest_dir)])
}

/// 按配置选择单文件或目录扫描
pub fn discover_for(config: &BatchConfig) -> Result<Vec<FileJob>> {
    match &config.single_file {
        Some(file) => discover_single(file, &config.dest_dir),
        None => discover(&config.source_dir, &config.pattern, &config.dest_dir),
    }
}
