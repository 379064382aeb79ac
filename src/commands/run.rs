//! # run / file 命令实现
//!
//! 终端表现层：把 CLI 参数变成配置交给控制器，在主线程上消费事件并显示。
//!
//! ## 功能
//! - 批次进度条 + 当前文件百分比进度条
//! - 每个文件的结果（成功、跳过、出错、取消）
//! - 运行中从 stdin 读取控制命令：回车或 `stop` 停止，`timer` 切换定时模式，
//!   `interval <ms>` 修改定时间隔，`status` 查看状态
//! - 结束时打印统计和失败列表
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 使用 `batch/` 控制器
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{BatchController, BatchSummary, FileTransformer};
use crate::cli::run::{FileArgs, RunArgs};
use crate::error::{Result, XorBatchError};
use crate::models::{BatchConfig, BatchEvent, FileJob, FileOutcome, LiveSettings};
use crate::utils::{output, progress};

use crossbeam_channel::{self as channel, select, Receiver};
use indicatif::{MultiProgress, ProgressBar};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::debug;

/// 失败列表行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// 运行中从 stdin 读到的控制命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleCommand {
    Stop,
    ToggleTimer,
    SetInterval(Duration),
    Status,
}

impl ConsoleCommand {
    /// 解析一行输入；无法识别时返回 `None`
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        match parts.next() {
            None | Some("stop") | Some("q") => Some(ConsoleCommand::Stop),
            Some("timer") | Some("t") => Some(ConsoleCommand::ToggleTimer),
            Some("status") | Some("s") => Some(ConsoleCommand::Status),
            Some("interval") | Some("i") => parts
                .next()
                .and_then(|ms| ms.parse::<u64>().ok())
                .map(|ms| ConsoleCommand::SetInterval(Duration::from_millis(ms))),
            Some(_) => None,
        }
    }
}

/// 执行 run 命令
pub fn execute_run(args: RunArgs) -> Result<()> {
    output::print_header(&format!(
        "XOR transform '{}' in {}",
        args.pattern,
        args.input.display()
    ));

    let settings = Arc::new(args.transform.live_settings());
    drive(args.to_config(), settings)
}

/// 执行 file 命令
pub fn execute_file(args: FileArgs) -> Result<()> {
    output::print_header(&format!("XOR transform {}", args.file.display()));

    let settings = Arc::new(args.transform.live_settings());
    drive(args.to_config(), settings)
}

/// 启动控制器并在当前线程上渲染事件直到运行结束
fn drive(config: BatchConfig, settings: Arc<LiveSettings>) -> Result<()> {
    if config.key.is_zero() {
        output::print_warning("XOR key is all zeros, files will be copied unchanged");
    }

    debug!("key {}", config.key);
    let (controller, events) = BatchController::spawn(FileTransformer, Arc::clone(&settings))?;

    match controller.start(config) {
        Ok(_) => {}
        Err(XorBatchError::NoFilesFound { pattern, dir }) => {
            output::print_warning(&format!("No files matched '{}' in {}", pattern, dir));
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    output::print_info("Press Enter to stop (commands: timer, interval <ms>, status)");

    let commands = watch_stdin();
    let idle = channel::never();
    let mut stdin_open = true;
    let mut sink = ConsoleSink::new();

    loop {
        let command_rx = if stdin_open { &commands } else { &idle };

        select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    if sink.handle(event) {
                        break;
                    }
                }
                Err(_) => break,
            },
            recv(command_rx) -> msg => match msg {
                Ok(ConsoleCommand::Stop) => controller.stop()?,
                Ok(ConsoleCommand::ToggleTimer) => {
                    let use_timer = !settings.use_timer();
                    settings.set_use_timer(use_timer);
                    sink.note(&format!(
                        "Timer {} (takes effect from the next file)",
                        if use_timer { "on" } else { "off" }
                    ));
                }
                Ok(ConsoleCommand::SetInterval(interval)) => {
                    settings.set_interval(interval);
                    sink.note(&format!("Interval set to {} ms", interval.as_millis()));
                }
                Ok(ConsoleCommand::Status) => {
                    let status = controller.status()?;
                    sink.note(&format!(
                        "Status: {} (timer {}, interval {} ms)",
                        status,
                        if settings.use_timer() { "on" } else { "off" },
                        settings.interval().as_millis()
                    ));
                }
                Err(_) => stdin_open = false,
            },
        }
    }

    controller.shutdown()
}

/// 在后台线程上读取 stdin，每行解析为一个控制命令
fn watch_stdin() -> Receiver<ConsoleCommand> {
    let (tx, rx) = channel::bounded(1);

    let spawned = thread::Builder::new()
        .name("xorbatch-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let mut line = String::new();
            while let Ok(n) = stdin.lock().read_line(&mut line) {
                if n == 0 {
                    break;
                }
                match ConsoleCommand::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            break;
                        }
                    }
                    None => debug!("unknown command: {}", line.trim()),
                }
                line.clear();
            }
        });

    if let Err(e) = spawned {
        debug!("stdin watcher unavailable: {}", e);
    }
    rx
}

/// 终端事件渲染
struct ConsoleSink {
    multi: MultiProgress,
    batch: ProgressBar,
    file: ProgressBar,
}

impl ConsoleSink {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let batch = multi.add(progress::create_batch_bar(0));
        let file = multi.add(progress::create_percent_bar());
        Self { multi, batch, file }
    }

    /// 处理一个事件；运行结束时返回 `true`
    fn handle(&mut self, event: BatchEvent) -> bool {
        match event {
            BatchEvent::Started { total } => {
                self.batch.set_length(total as u64);
                self.multi
                    .suspend(|| output::print_info(&format!("Start {} file(s)", total)));
            }
            BatchEvent::FileStarted { index, total, job } => {
                self.file.set_position(0);
                self.file
                    .set_message(format!("{} ({}/{})", job.file_name(), index + 1, total));
            }
            BatchEvent::Progress(sample) => {
                self.file.set_position(sample.percent as u64);
                self.file.set_message(sample.to_string());
            }
            BatchEvent::FileFinished { job, outcome } => {
                self.batch.inc(1);
                self.report_file(&job, &outcome);
            }
            BatchEvent::Completed(summary) => {
                self.clear();
                output::print_done("All files processed");
                print_summary(&summary);
                return true;
            }
            BatchEvent::Stopped(summary) => {
                self.clear();
                output::print_stop("Stopped by user");
                print_summary(&summary);
                return true;
            }
        }
        false
    }

    fn report_file(&self, job: &FileJob, outcome: &FileOutcome) {
        self.multi.suspend(|| match outcome {
            FileOutcome::Success { bytes } => output::print_transformed(
                &job.file_name(),
                &job.destination.display().to_string(),
                *bytes,
            ),
            FileOutcome::Skipped => {
                output::print_skip(&format!("File exists: {}", job.destination_name()))
            }
            FileOutcome::Cancelled => output::print_stop(&format!(
                "Cancelled {}, partial output removed",
                job.file_name()
            )),
            failure => output::print_failure(&job.file_name(), &failure.to_string()),
        });
    }

    fn note(&self, message: &str) {
        self.multi.suspend(|| output::print_info(message));
    }

    fn clear(&self) {
        self.file.finish_and_clear();
        self.batch.finish_and_clear();
    }
}

/// 打印统计和失败列表
fn print_summary(summary: &BatchSummary) {
    output::print_separator();
    output::print_success(&format!(
        "{}/{} processed, {} skipped, {} failed, {} cancelled ({} written)",
        summary.processed,
        summary.total(),
        summary.skipped,
        summary.failed,
        summary.cancelled,
        output::format_size(summary.bytes)
    ));

    if !summary.failures.is_empty() {
        let rows: Vec<FailureRow> = summary
            .failures
            .iter()
            .map(|(file, error)| FailureRow {
                file: file.clone(),
                error: error.clone(),
            })
            .collect();
        println!("{}", Table::new(&rows));
    }
}
