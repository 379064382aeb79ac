//! # 批处理配置
//!
//! - `BatchConfig`: 每次运行开始时捕获的不可变快照
//! - `LiveSettings`: 运行中可被外部修改、在每次派发时重新读取的定时模式
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs`, `batch/transformer.rs`, `commands/run.rs` 使用
//! - 使用 `transform::XorKey`

use crate::batch::collector;
use crate::error::{Result, XorBatchError};
use crate::transform::XorKey;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// 默认文件名模式
pub const DEFAULT_PATTERN: &str = "*.*";

/// 默认定时间隔（毫秒）
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// 默认块大小：64 MiB
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// 两次进度上报之间的最小间隔
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// 一次批处理运行的配置快照
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 源目录
    pub source_dir: PathBuf,
    /// 文件名 glob 模式
    pub pattern: String,
    /// 显式指定的单个源文件（设置后忽略目录和模式）
    pub single_file: Option<PathBuf>,
    /// 目标目录
    pub dest_dir: PathBuf,
    /// XOR 密钥
    pub key: XorKey,
    /// 覆盖已存在的目标文件
    pub overwrite: bool,
    /// 成功后删除源文件
    pub delete_source: bool,
    /// 启动时的定时模式
    pub use_timer: bool,
    /// 定时间隔
    pub interval: Duration,
    /// 块大小（字节），同时决定取消响应的最坏延迟
    pub chunk_size: usize,
    /// 进度采样间隔
    pub progress_interval: Duration,
}

impl BatchConfig {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            single_file: None,
            dest_dir: dest_dir.into(),
            key: XorKey::ZERO,
            overwrite: false,
            delete_source: false,
            use_timer: false,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }

    /// 只处理一个显式指定的文件
    pub fn with_single_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.single_file = Some(path.into());
        self
    }

    pub fn with_key(mut self, key: XorKey) -> Self {
        self.key = key;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn delete_source(mut self, delete_source: bool) -> Self {
        self.delete_source = delete_source;
        self
    }

    /// 设置定时模式；`None` 表示立即派发
    pub fn with_timer(mut self, interval: Option<Duration>) -> Self {
        match interval {
            Some(interval) => {
                self.use_timer = true;
                self.interval = interval;
            }
            None => self.use_timer = false,
        }
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// 启动前校验，不做任何写入
    pub fn validate(&self) -> Result<()> {
        match &self.single_file {
            Some(file) => {
                if !file.is_file() {
                    return Err(XorBatchError::FileNotFound {
                        path: file.display().to_string(),
                    });
                }
            }
            None => {
                if self.source_dir.as_os_str().is_empty() || !self.source_dir.is_dir() {
                    return Err(XorBatchError::DirectoryNotFound {
                        path: self.source_dir.display().to_string(),
                    });
                }
                collector::parse_patterns(&self.pattern)?;
            }
        }

        if self.dest_dir.as_os_str().is_empty() || !self.dest_dir.is_dir() {
            return Err(XorBatchError::DirectoryNotFound {
                path: self.dest_dir.display().to_string(),
            });
        }

        if self.chunk_size == 0 {
            return Err(XorBatchError::InvalidArgument(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// 运行中可变的派发设置
///
/// 由表现层持有并修改；控制器在每次推进到下一个文件时重新读取。
#[derive(Debug)]
pub struct LiveSettings {
    use_timer: AtomicBool,
    interval_ms: AtomicU64,
}

impl LiveSettings {
    pub fn new(use_timer: bool, interval: Duration) -> Self {
        Self {
            use_timer: AtomicBool::new(use_timer),
            interval_ms: AtomicU64::new(interval.as_millis() as u64),
        }
    }

    pub fn use_timer(&self) -> bool {
        self.use_timer.load(Ordering::Acquire)
    }

    pub fn set_use_timer(&self, use_timer: bool) {
        self.use_timer.store(use_timer, Ordering::Release);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Acquire))
    }

    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms
            .store(interval.as_millis() as u64, Ordering::Release);
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self::new(false, Duration::from_millis(DEFAULT_INTERVAL_MS))
    }
}
