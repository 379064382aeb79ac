//! # 单文件流式变换
//!
//! 把一个源文件按固定大小的块读入、XOR、写出到目标文件。
//!
//! ## 策略
//! - 源文件打不开：`OpenError`，不创建任何输出
//! - 目标已存在：未开启覆盖则 `Skipped`，否则先删除旧文件
//! - 每读一块之前检查一次 `should_continue`，为假则 `Cancelled`
//! - 目标文件创建之后的任何非成功结果都会删除目标，不留下半截文件
//! - 成功且开启删除源文件时删除源文件
//!
//! 进度最多每 `progress_interval` 上报一次，最后一块无条件上报。
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs` 在后台线程上调用
//! - 使用 `transform::XorKey`

use crate::models::{BatchConfig, FileJob, FileOutcome, ProgressSample};
use crate::transform::XorKey;

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 控制器与文件处理之间的接缝
///
/// `should_continue` 是实时谓词，每块之前重新读取，不是快照。
pub trait FileProcessor: Send + Sync + 'static {
    fn process(
        &self,
        job: &FileJob,
        config: &BatchConfig,
        should_continue: &dyn Fn() -> bool,
        on_progress: &mut dyn FnMut(ProgressSample),
    ) -> FileOutcome;
}

/// 基于 XOR 的文件变换器
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTransformer;

impl FileProcessor for FileTransformer {
    fn process(
        &self,
        job: &FileJob,
        config: &BatchConfig,
        should_continue: &dyn Fn() -> bool,
        on_progress: &mut dyn FnMut(ProgressSample),
    ) -> FileOutcome {
        let started = Instant::now();
        let file_name = job.file_name();

        let mut input = match File::open(&job.source) {
            Ok(f) => f,
            Err(e) => return FileOutcome::OpenError(e),
        };

        if job.destination.exists() {
            if !config.overwrite {
                debug!("skip {}: destination exists", job.destination.display());
                return FileOutcome::Skipped;
            }
            if let Err(e) = fs::remove_file(&job.destination) {
                return FileOutcome::CreateError(e);
            }
        }

        let total = input.metadata().map(|m| m.len()).unwrap_or(0);

        let mut output = match File::create(&job.destination) {
            Ok(f) => f,
            Err(e) => return FileOutcome::CreateError(e),
        };

        let stream = ChunkStream {
            key: config.key,
            chunk_size: config.chunk_size,
            progress_interval: config.progress_interval,
            total,
            file_name: &file_name,
            started,
        };
        let outcome = stream.run(&mut input, &mut output, should_continue, on_progress);

        drop(input);
        drop(output);

        finish(job, config, outcome)
    }
}

/// 收尾：失败或取消时删除目标，成功时按需删除源文件
fn finish(job: &FileJob, config: &BatchConfig, outcome: FileOutcome) -> FileOutcome {
    if !outcome.is_success() {
        remove_partial(&job.destination);
        return outcome;
    }

    debug!("{} -> {}", job.file_name(), job.destination_name());
    if config.delete_source {
        if let Err(e) = fs::remove_file(&job.source) {
            warn!("failed to delete source {}: {}", job.source.display(), e);
        }
    }
    outcome
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed partial output {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove partial output {}: {}", path.display(), e),
    }
}

/// 一次流式复制的参数
struct ChunkStream<'a> {
    key: XorKey,
    chunk_size: usize,
    progress_interval: Duration,
    total: u64,
    file_name: &'a str,
    started: Instant,
}

impl ChunkStream<'_> {
    fn run<R: Read, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        should_continue: &dyn Fn() -> bool,
        on_progress: &mut dyn FnMut(ProgressSample),
    ) -> FileOutcome {
        if self.total == 0 {
            on_progress(ProgressSample::complete(self.file_name));
        }

        // 小文件不必分配整块
        let capacity = self.chunk_size.min(self.total.max(1) as usize).max(1);
        let mut buf = vec![0u8; capacity];
        let mut processed: u64 = 0;
        let mut reported: u64 = 0;
        let mut last_report = Duration::ZERO;

        loop {
            if !should_continue() {
                return FileOutcome::Cancelled;
            }

            let n = match read_chunk(input, &mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => return FileOutcome::ReadError(e),
            };

            let chunk = &mut buf[..n];
            self.key.apply(chunk, processed);
            if let Err(e) = output.write_all(chunk) {
                return FileOutcome::WriteError(e);
            }
            processed += n as u64;

            let elapsed = self.started.elapsed();
            if elapsed.saturating_sub(last_report) > self.progress_interval
                || processed >= self.total
            {
                on_progress(self.sample(processed, elapsed));
                last_report = elapsed;
                reported = processed;
            }
        }

        if let Err(e) = output.flush() {
            return FileOutcome::WriteError(e);
        }

        // 文件在处理中被截断时，最后一块没有触发上报
        if processed != reported {
            on_progress(self.sample(processed, self.started.elapsed()));
        }

        FileOutcome::Success { bytes: processed }
    }

    fn sample(&self, processed: u64, elapsed: Duration) -> ProgressSample {
        let total = self.total.max(processed);
        ProgressSample::new(self.file_name, processed, total, elapsed)
    }
}

/// 读满一块或读到文件末尾
fn read_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
