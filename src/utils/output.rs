//! # 终端输出
//!
//! 统一的带前缀彩色输出。`[ERR]` 只用于让命令失败的错误，单个文件的失败用 `[FAIL]`，
//! 批处理照常继续。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和 `commands/run.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const RULE_WIDTH: usize = 60;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印致命错误（写到 stderr）
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印单个文件的失败
pub fn print_failure(file: &str, reason: &str) {
    println!("{} {}: {}", "[FAIL]".red(), file, reason);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 目标已存在，未覆盖
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 用户停止
pub fn print_stop(msg: &str) {
    println!("{} {}", "[STOP]".magenta().bold(), msg);
}

pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印单个文件的变换结果：`源 -> 目标 (大小)`
pub fn print_transformed(from: &str, to: &str, bytes: u64) {
    println!(
        "{} {} {} {} {}",
        "[XOR]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to,
        format!("({})", format_size(bytes)).dimmed()
    );
}

/// 字节数转成 `12.34 MB` 形式
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

pub fn print_header(title: &str) {
    let line = "─".repeat(RULE_WIDTH);
    println!("\n{}", line.dimmed());
    println!("  {} {}", "xorbatch".cyan().bold(), title.bold());
    println!("{}\n", line.dimmed());
}

pub fn print_separator() {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}
