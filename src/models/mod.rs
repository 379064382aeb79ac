//! # 数据模型模块
//!
//! 定义批处理配置、文件任务以及进度/状态事件。
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `commands/` 使用
//! - 子模块: config, job, event

pub mod config;
pub mod event;
pub mod job;

pub use config::{BatchConfig, LiveSettings};
pub use event::{BatchEvent, FileOutcome, ProgressSample};
pub use job::FileJob;
