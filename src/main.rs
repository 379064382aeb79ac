//! # xorbatch - 批量 XOR 文件变换
//!
//! 从目录中按模式挑选文件，用 8 字节循环密钥逐字节 XOR，结果写到目标目录，
//! 运行中报告每个文件的进度和吞吐量。变换自逆，同一命令既加密也解密。
//!
//! ## 子命令
//! - `run`  - 按模式批量处理目录
//! - `file` - 处理单个文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (终端表现层)
//!   │     └── batch/     (扫描、控制器、单文件变换)
//!   │           ├── transform/ (XOR 变换)
//!   │           └── models/    (配置、任务、事件)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod transform;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        if e.is_config_error() {
            utils::output::print_info("Nothing was written. Run with --help for usage.");
        }
        std::process::exit(1);
    }
}
