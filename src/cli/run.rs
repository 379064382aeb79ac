//! # run / file 子命令 CLI 定义
//!
//! - `run`: 按模式批量处理目录下的文件
//! - `file`: 处理单个显式指定的文件
//!
//! 所有选项都可通过 `XORBATCH_*` 环境变量提供。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/run.rs`

use crate::models::config::{DEFAULT_INTERVAL_MS, DEFAULT_PATTERN};
use crate::models::{BatchConfig, LiveSettings};
use crate::transform::XorKey;

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

const MIB: usize = 1024 * 1024;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory containing the source files
    #[arg(short, long, env = "XORBATCH_INPUT", default_value = ".")]
    pub input: PathBuf,

    /// Glob pattern for source file names (comma-separated for several)
    #[arg(short, long, env = "XORBATCH_PATTERN", default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    #[command(flatten)]
    pub transform: TransformArgs,
}

/// file 子命令参数
#[derive(Args, Debug)]
pub struct FileArgs {
    /// The single file to process
    pub file: PathBuf,

    #[command(flatten)]
    pub transform: TransformArgs,
}

/// 两个子命令共用的变换选项
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Directory for processed files
    #[arg(short, long, env = "XORBATCH_OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// 8-byte XOR key as 16 hex characters (malformed keys fall back to all zeros)
    #[arg(short, long, env = "XORBATCH_KEY", default_value = "0000000000000000")]
    pub key: String,

    /// Overwrite existing output files
    #[arg(long, env = "XORBATCH_OVERWRITE", default_value_t = false)]
    pub overwrite: bool,

    /// Delete each source file after it was processed successfully
    #[arg(long, env = "XORBATCH_DELETE", default_value_t = false)]
    pub delete: bool,

    /// Wait --interval milliseconds before dispatching each file
    #[arg(long, env = "XORBATCH_TIMER", default_value_t = false)]
    pub timer: bool,

    /// Dispatch interval in milliseconds (used with --timer)
    #[arg(long, env = "XORBATCH_INTERVAL", default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval: u64,

    /// Read/write chunk size in MiB
    #[arg(long, env = "XORBATCH_CHUNK_SIZE_MIB", default_value_t = 64)]
    pub chunk_size_mib: usize,
}

impl TransformArgs {
    /// 构造配置快照；源目录和模式由调用方填写
    pub fn to_config(&self, input: PathBuf) -> BatchConfig {
        let timer = self
            .timer
            .then(|| Duration::from_millis(self.interval));

        BatchConfig::new(input, self.output.clone())
            .with_key(XorKey::from_hex_lenient(&self.key))
            .overwrite(self.overwrite)
            .delete_source(self.delete)
            .with_timer(timer)
            .with_chunk_size(self.chunk_size_mib.saturating_mul(MIB))
    }

    /// 实时设置的初始值
    pub fn live_settings(&self) -> LiveSettings {
        LiveSettings::new(self.timer, Duration::from_millis(self.interval))
    }
}

impl RunArgs {
    pub fn to_config(&self) -> BatchConfig {
        self.transform
            .to_config(self.input.clone())
            .with_pattern(&self.pattern)
    }
}

impl FileArgs {
    pub fn to_config(&self) -> BatchConfig {
        let dir = self
            .file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        self.transform
            .to_config(dir)
            .with_single_file(self.file.clone())
    }
}
