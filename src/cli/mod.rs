//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `run`: 按模式批量处理目录
//! - `file`: 处理单个文件
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: run

pub mod run;

use clap::{ArgAction, Parser, Subcommand};

/// xorbatch - 批量 XOR 文件变换
#[derive(Parser)]
#[command(name = "xorbatch")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch XOR transform of files selected by a glob pattern", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Transform every file in a directory whose name matches a pattern
    Run(run::RunArgs),

    /// Transform one explicitly chosen file
    File(run::FileArgs),
}
