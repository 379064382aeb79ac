//! # 统一错误处理模块
//!
//! 定义 xorbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! 单个文件的处理失败（打开、创建、读写）不走这里，而是作为
//! `FileOutcome` 的变体返回，批处理遇到它们不会中断。
//! 这里只收集启动前的拒绝（配置无效、忙碌、无匹配文件）和控制器自身的故障。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// xorbatch 统一错误类型
#[derive(Error, Debug)]
pub enum XorBatchError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 批处理控制
    // ─────────────────────────────────────────────────────────────
    #[error("A batch is already running")]
    Busy,

    #[error("No files matching '{pattern}' found in {dir}")]
    NoFilesFound { pattern: String, dir: String },

    #[error("Batch controller is no longer running")]
    ControllerGone,

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl XorBatchError {
    /// 是否属于配置错误（批处理不会启动，也不做任何 I/O）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            XorBatchError::DirectoryNotFound { .. }
                | XorBatchError::FileNotFound { .. }
                | XorBatchError::InvalidArgument(_)
                | XorBatchError::InvalidPattern { .. }
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XorBatchError>;
