//! # 批处理控制器
//!
//! 独占队列、游标和运行状态；一次只驱动一个文件的变换，并根据结果决定
//! 派发下一个文件还是结束本次运行。
//!
//! ## 线程模型
//! - 控制器线程：处理全部状态转换，通过 `select!` 同时等待命令和定时派发
//! - 工作线程：单线程 `rayon` 线程池，最多一个在途任务
//! - 任务结束后把结果作为 `FileDone` 消息交回控制器，自己不改任何控制器状态
//! - 进度与状态事件经无界通道异步送到表现层
//!
//! ## 状态
//! `Idle → Running → Completed | StoppedByUser`，终态之后可以重新 `start`。
//!
//! ## 依赖关系
//! - 使用 `batch/collector.rs` 扫描文件
//! - 使用 `batch/dispatch.rs` 选择派发时机
//! - 通过 `FileProcessor` 调用 `batch/transformer.rs`
//! - 使用 `crossbeam-channel` 和 `rayon`

use crate::batch::collector;
use crate::batch::dispatch::{self, DispatchStrategy, Schedule};
use crate::batch::state::{BatchState, BatchStatus};
use crate::batch::summary::BatchSummary;
use crate::batch::transformer::FileProcessor;
use crate::error::{Result, XorBatchError};
use crate::models::{BatchConfig, BatchEvent, FileJob, FileOutcome, LiveSettings, ProgressSample};

use crossbeam_channel::{self as channel, select, Receiver, Sender};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info};

/// 发往控制器线程的消息
enum ControlMessage {
    Start {
        config: BatchConfig,
        reply: Sender<Result<usize>>,
    },
    Stop,
    Status(Sender<BatchStatus>),
    FileDone {
        job: FileJob,
        outcome: FileOutcome,
    },
    Shutdown,
}

/// 控制器句柄
pub struct BatchController {
    tx: Sender<ControlMessage>,
    handle: Option<JoinHandle<()>>,
}

impl BatchController {
    /// 启动控制器线程，返回句柄和事件接收端
    pub fn spawn<P: FileProcessor>(
        processor: P,
        settings: Arc<LiveSettings>,
    ) -> Result<(Self, Receiver<BatchEvent>)> {
        let (tx, rx) = channel::unbounded();
        let (event_tx, event_rx) = channel::unbounded();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|_| "xorbatch-worker".to_string())
            .build()
            .map_err(|e| XorBatchError::Other(format!("Failed to start worker: {}", e)))?;

        let core = ControllerLoop {
            processor: Arc::new(processor),
            settings,
            pool,
            events: event_tx,
            self_tx: tx.clone(),
            status: BatchStatus::Idle,
            state: BatchState::default(),
            config: None,
            summary: BatchSummary::default(),
            pending: None,
            in_flight: false,
            shutting_down: false,
        };

        let handle = thread::Builder::new()
            .name("xorbatch-controller".to_string())
            .spawn(move || core.run(rx))
            .map_err(|e| XorBatchError::Other(format!("Failed to start controller: {}", e)))?;

        Ok((
            Self {
                tx,
                handle: Some(handle),
            },
            event_rx,
        ))
    }

    /// 开始一次运行，返回排队的文件数
    ///
    /// 配置无效、没有匹配文件或已在运行时直接拒绝，不产生任何事件。
    pub fn start(&self, config: BatchConfig) -> Result<usize> {
        let (reply, response) = channel::bounded(1);
        self.send(ControlMessage::Start { config, reply })?;
        response.recv().map_err(|_| XorBatchError::ControllerGone)?
    }

    /// 停止当前运行；没有运行时什么也不做
    pub fn stop(&self) -> Result<()> {
        self.send(ControlMessage::Stop)
    }

    pub fn status(&self) -> Result<BatchStatus> {
        let (reply, response) = channel::bounded(1);
        self.send(ControlMessage::Status(reply))?;
        response.recv().map_err(|_| XorBatchError::ControllerGone)
    }

    /// 停止运行，等在途任务收尾后结束控制器线程
    pub fn shutdown(mut self) -> Result<()> {
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(ControlMessage::Shutdown);
            handle
                .join()
                .map_err(|_| XorBatchError::Other("Batch controller panicked".to_string()))?;
        }
        Ok(())
    }

    fn send(&self, msg: ControlMessage) -> Result<()> {
        self.tx.send(msg).map_err(|_| XorBatchError::ControllerGone)
    }
}

impl Drop for BatchController {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// 控制器线程上的状态
struct ControllerLoop<P> {
    processor: Arc<P>,
    settings: Arc<LiveSettings>,
    pool: rayon::ThreadPool,
    events: Sender<BatchEvent>,
    self_tx: Sender<ControlMessage>,
    status: BatchStatus,
    state: BatchState,
    config: Option<Arc<BatchConfig>>,
    summary: BatchSummary,
    /// 已排定但尚未触发的派发时刻
    pending: Option<Instant>,
    in_flight: bool,
    shutting_down: bool,
}

impl<P: FileProcessor> ControllerLoop<P> {
    fn run(mut self, rx: Receiver<ControlMessage>) {
        debug!("batch controller started");

        loop {
            let timer = match self.pending {
                Some(deadline) => channel::at(deadline),
                None => channel::never(),
            };

            select! {
                recv(rx) -> msg => match msg {
                    Ok(msg) => self.handle(msg),
                    Err(_) => break,
                },
                recv(timer) -> _ => {
                    self.pending = None;
                    self.launch_current();
                }
            }

            if self.shutting_down && !self.in_flight {
                break;
            }
        }

        debug!("batch controller exited");
    }

    fn handle(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Start { config, reply } => {
                let result = self.start(config);
                if let Err(e) = &result {
                    info!("batch start rejected: {}", e);
                }
                let _ = reply.send(result);
            }
            ControlMessage::Stop => self.stop(),
            ControlMessage::Status(reply) => {
                let _ = reply.send(self.status);
            }
            ControlMessage::FileDone { job, outcome } => self.on_file_done(job, outcome),
            ControlMessage::Shutdown => {
                self.stop();
                self.shutting_down = true;
            }
        }
    }

    fn start(&mut self, config: BatchConfig) -> Result<usize> {
        if self.state.is_running() || self.in_flight {
            return Err(XorBatchError::Busy);
        }

        config.validate()?;

        let queue = collector::discover_for(&config)?;
        if queue.is_empty() {
            return Err(XorBatchError::NoFilesFound {
                pattern: config.pattern.clone(),
                dir: config.source_dir.display().to_string(),
            });
        }

        let total = queue.len();
        // 第一个文件按启动时的快照派发，之后每次推进都重新读取实时设置
        let first = dispatch::strategy_for(config.use_timer, config.interval);

        self.state.begin(queue);
        self.summary = BatchSummary::default();
        self.config = Some(Arc::new(config));
        self.status = BatchStatus::Running;

        info!(total, "batch started");
        self.emit(BatchEvent::Started { total });
        self.dispatch(first.as_ref());

        Ok(total)
    }

    fn stop(&mut self) {
        if self.status != BatchStatus::Running {
            return;
        }

        self.state.halt();
        self.pending = None;
        self.status = BatchStatus::StoppedByUser;
        info!("batch stopped by user");

        // 有在途任务时等它交回结果再报告
        if !self.in_flight {
            self.finish_stopped();
        }
    }

    fn dispatch(&mut self, strategy: &dyn DispatchStrategy) {
        match strategy.schedule(Instant::now()) {
            Schedule::Now => self.launch_current(),
            Schedule::At(deadline) => {
                debug!(
                    index = self.state.current_index(),
                    "dispatch scheduled in {:?}",
                    deadline.saturating_duration_since(Instant::now())
                );
                self.pending = Some(deadline);
            }
        }
    }

    fn launch_current(&mut self) {
        if !self.state.is_running() || self.in_flight {
            return;
        }
        let (Some(job), Some(config)) = (self.state.current().cloned(), self.config.clone())
        else {
            return;
        };

        let index = self.state.current_index();
        let total = self.state.len();
        debug!(index, total, file = %job.file_name(), "dispatch");

        self.in_flight = true;
        self.emit(BatchEvent::FileStarted {
            index,
            total,
            job: job.clone(),
        });

        let processor = Arc::clone(&self.processor);
        let running = self.state.running_flag();
        let events = self.events.clone();
        let done = self.self_tx.clone();

        self.pool.spawn(move || {
            let should_continue = || running.load(Ordering::Acquire);
            let mut on_progress = |sample: ProgressSample| {
                let _ = events.send(BatchEvent::Progress(sample));
            };
            let outcome = processor.process(&job, &config, &should_continue, &mut on_progress);
            let _ = done.send(ControlMessage::FileDone { job, outcome });
        });
    }

    fn on_file_done(&mut self, job: FileJob, outcome: FileOutcome) {
        self.in_flight = false;
        debug!(file = %job.file_name(), outcome = %outcome, "file finished");

        self.summary.record(&job, &outcome);
        self.emit(BatchEvent::FileFinished { job, outcome });

        match self.status {
            BatchStatus::StoppedByUser => self.finish_stopped(),
            BatchStatus::Running => {
                if self.state.advance() {
                    let strategy = dispatch::current_strategy(&self.settings);
                    self.dispatch(strategy.as_ref());
                } else {
                    self.complete();
                }
            }
            BatchStatus::Idle | BatchStatus::Completed => {}
        }
    }

    fn complete(&mut self) {
        self.pending = None;
        self.state.reset();
        self.config = None;
        self.status = BatchStatus::Completed;

        info!(
            processed = self.summary.processed,
            skipped = self.summary.skipped,
            failed = self.summary.failed,
            "batch completed"
        );
        let summary = std::mem::take(&mut self.summary);
        self.emit(BatchEvent::Completed(summary));
    }

    fn finish_stopped(&mut self) {
        self.state.reset();
        self.config = None;
        let summary = std::mem::take(&mut self.summary);
        self.emit(BatchEvent::Stopped(summary));
    }

    fn emit(&self, event: BatchEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::transformer::FileTransformer;

    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

    /// 只记录调用顺序
    #[derive(Default, Clone)]
    struct RecordingProcessor {
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FileProcessor for RecordingProcessor {
        fn process(
            &self,
            job: &FileJob,
            _config: &BatchConfig,
            _should_continue: &dyn Fn() -> bool,
            on_progress: &mut dyn FnMut(ProgressSample),
        ) -> FileOutcome {
            self.calls.lock().unwrap().push(job.source.clone());
            on_progress(ProgressSample::complete(&job.file_name()));
            FileOutcome::Success { bytes: 0 }
        }
    }

    /// 一直运行到被取消
    #[derive(Default, Clone)]
    struct BlockingProcessor {
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FileProcessor for BlockingProcessor {
        fn process(
            &self,
            job: &FileJob,
            _config: &BatchConfig,
            should_continue: &dyn Fn() -> bool,
            _on_progress: &mut dyn FnMut(ProgressSample),
        ) -> FileOutcome {
            self.calls.lock().unwrap().push(job.source.clone());
            while should_continue() {
                thread::sleep(Duration::from_millis(2));
            }
            FileOutcome::Cancelled
        }
    }

    /// 真实变换，但每块之前放慢一点
    struct SlowTransformer;

    impl FileProcessor for SlowTransformer {
        fn process(
            &self,
            job: &FileJob,
            config: &BatchConfig,
            should_continue: &dyn Fn() -> bool,
            on_progress: &mut dyn FnMut(ProgressSample),
        ) -> FileOutcome {
            let slow = || {
                thread::sleep(Duration::from_millis(1));
                should_continue()
            };
            FileTransformer.process(job, config, &slow, on_progress)
        }
    }

    /// 按文件名给出固定结果：`bad.*` 打不开，`old.*` 跳过
    #[derive(Default, Clone)]
    struct MixedOutcomeProcessor {
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FileProcessor for MixedOutcomeProcessor {
        fn process(
            &self,
            job: &FileJob,
            _config: &BatchConfig,
            _should_continue: &dyn Fn() -> bool,
            _on_progress: &mut dyn FnMut(ProgressSample),
        ) -> FileOutcome {
            self.calls.lock().unwrap().push(job.source.clone());
            let name = job.file_name();
            if name.starts_with("bad") {
                FileOutcome::OpenError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "access denied",
                ))
            } else if name.starts_with("old") {
                FileOutcome::Skipped
            } else {
                FileOutcome::Success { bytes: 4 }
            }
        }
    }

    fn setup(files: &[(&str, usize)]) -> (tempfile::TempDir, tempfile::TempDir) {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        for (name, len) in files {
            fs::write(src.path().join(name), vec![0x5a; *len]).unwrap();
        }
        (src, dst)
    }

    fn immediate() -> Arc<LiveSettings> {
        Arc::new(LiveSettings::default())
    }

    /// 收集事件直到满足条件
    fn collect_until(
        events: &Receiver<BatchEvent>,
        done: impl Fn(&BatchEvent) -> bool,
    ) -> Vec<BatchEvent> {
        let mut seen = Vec::new();
        loop {
            let event = events
                .recv_timeout(EVENT_TIMEOUT)
                .expect("timed out waiting for batch event");
            let finished = done(&event);
            seen.push(event);
            if finished {
                return seen;
            }
        }
    }

    fn started_sources(events: &[BatchEvent]) -> Vec<PathBuf> {
        events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::FileStarted { job, .. } => Some(job.source.clone()),
                _ => None,
            })
            .collect()
    }

    fn is_completed(e: &BatchEvent) -> bool {
        matches!(e, BatchEvent::Completed(_))
    }

    fn is_stopped(e: &BatchEvent) -> bool {
        matches!(e, BatchEvent::Stopped(_))
    }

    #[test]
    fn test_processes_every_file_once_in_queue_order() {
        let (src, dst) = setup(&[("a.txt", 3), ("b.txt", 4), ("c.txt", 5), ("d.bin", 1)]);
        let processor = RecordingProcessor::default();
        let calls = Arc::clone(&processor.calls);
        let (controller, events) = BatchController::spawn(processor, immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.txt");
        assert_eq!(controller.start(config).unwrap(), 3);

        let seen = collect_until(&events, is_completed);
        let calls = calls.lock().unwrap().clone();

        assert_eq!(calls.len(), 3);
        assert_eq!(started_sources(&seen), calls);
        let mut unique = calls.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);

        assert!(matches!(seen[0], BatchEvent::Started { total: 3 }));
        assert_eq!(seen.iter().filter(|e| is_completed(e)).count(), 1);
        match seen.last() {
            Some(BatchEvent::Completed(summary)) => {
                assert_eq!(summary.processed, 3);
                assert_eq!(summary.total(), 3);
            }
            other => panic!("unexpected last event: {:?}", other),
        }

        assert_eq!(controller.status().unwrap(), BatchStatus::Completed);
        controller.shutdown().unwrap();
    }

    #[test]
    fn test_file_failures_do_not_abort_batch() {
        let (src, dst) = setup(&[("bad.txt", 4), ("good.txt", 4), ("old.txt", 4)]);
        let processor = MixedOutcomeProcessor::default();
        let calls = Arc::clone(&processor.calls);
        let (controller, events) = BatchController::spawn(processor, immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.txt");
        assert_eq!(controller.start(config).unwrap(), 3);

        let seen = collect_until(&events, is_completed);
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(started_sources(&seen).len(), 3);
        assert_eq!(seen.iter().filter(|e| is_completed(e)).count(), 1);
        assert!(!seen.iter().any(is_stopped));

        let finished: Vec<&FileOutcome> = seen
            .iter()
            .filter_map(|e| match e {
                BatchEvent::FileFinished { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect();
        assert_eq!(finished.len(), 3);

        match seen.last() {
            Some(BatchEvent::Completed(summary)) => {
                assert_eq!(summary.processed, 1);
                assert_eq!(summary.failed, 1);
                assert_eq!(summary.skipped, 1);
                assert_eq!(summary.failures.len(), 1);
                assert_eq!(summary.failures[0].0, "bad.txt");
                assert!(summary.failures[0].1.starts_with("open error"));
            }
            other => panic!("unexpected last event: {:?}", other),
        }

        assert_eq!(controller.status().unwrap(), BatchStatus::Completed);
        controller.shutdown().unwrap();
    }

    #[test]
    fn test_real_transform_batch() {
        let (src, dst) = setup(&[("a.txt", 10), ("b.txt", 0)]);
        let (controller, events) = BatchController::spawn(FileTransformer, immediate()).unwrap();

        let key = crate::transform::XorKey::from_hex_lenient("00000000000000FF");
        let config = BatchConfig::new(src.path(), dst.path())
            .with_pattern("*.txt")
            .with_key(key);
        controller.start(config).unwrap();
        collect_until(&events, is_completed);

        let a = fs::read(dst.path().join("a_processed.txt")).unwrap();
        let mut expected = vec![0x5a; 10];
        expected[7] ^= 0xFF;
        assert_eq!(a, expected);
        assert!(fs::read(dst.path().join("b_processed.txt")).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let (src, _dst) = setup(&[("a.txt", 1)]);
        let (controller, events) =
            BatchController::spawn(RecordingProcessor::default(), immediate()).unwrap();

        let config = BatchConfig::new(src.path().join("missing"), src.path());
        let err = controller.start(config).unwrap_err();
        assert!(err.is_config_error());

        let config = BatchConfig::new(src.path(), src.path()).with_pattern("");
        assert!(controller.start(config).unwrap_err().is_config_error());

        assert_eq!(controller.status().unwrap(), BatchStatus::Idle);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_nothing_matched_stays_idle() {
        let (src, dst) = setup(&[("a.txt", 1)]);
        let (controller, events) =
            BatchController::spawn(RecordingProcessor::default(), immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.bin");
        assert!(matches!(
            controller.start(config).unwrap_err(),
            XorBatchError::NoFilesFound { .. }
        ));
        assert_eq!(controller.status().unwrap(), BatchStatus::Idle);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_start_while_running_is_busy() {
        let (src, dst) = setup(&[("a.txt", 1), ("b.txt", 1)]);
        let processor = BlockingProcessor::default();
        let calls = Arc::clone(&processor.calls);
        let (controller, events) = BatchController::spawn(processor, immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.txt");
        controller.start(config.clone()).unwrap();
        collect_until(&events, |e| matches!(e, BatchEvent::FileStarted { .. }));

        assert!(matches!(
            controller.start(config).unwrap_err(),
            XorBatchError::Busy
        ));
        assert_eq!(controller.status().unwrap(), BatchStatus::Running);

        controller.stop().unwrap();
        let seen = collect_until(&events, is_stopped);
        assert!(seen.iter().any(|e| matches!(
            e,
            BatchEvent::FileFinished {
                outcome: FileOutcome::Cancelled,
                ..
            }
        )));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(controller.status().unwrap(), BatchStatus::StoppedByUser);
    }

    #[test]
    fn test_stop_mid_file_removes_partial_output() {
        let (src, dst) = setup(&[("big.bin", 2 * 1024 * 1024), ("next.bin", 16)]);
        let (controller, events) = BatchController::spawn(SlowTransformer, immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path())
            .with_pattern("*.bin")
            .with_key(crate::transform::XorKey::from([7; 8]))
            .with_chunk_size(4096);
        controller.start(config).unwrap();

        let seen = collect_until(&events, |e| matches!(e, BatchEvent::FileStarted { .. }));
        let first = match seen.last() {
            Some(BatchEvent::FileStarted { job, .. }) => job.clone(),
            other => panic!("unexpected event: {:?}", other),
        };
        // 只有大文件会慢到能被中途停止
        if first.file_name() != "big.bin" {
            collect_until(&events, |e| matches!(e, BatchEvent::FileStarted { .. }));
        }
        thread::sleep(Duration::from_millis(50));
        controller.stop().unwrap();

        let seen = collect_until(&events, is_stopped);
        assert!(!dst.path().join("big_processed.bin").exists());
        assert!(started_sources(&seen).is_empty());
        match seen.last() {
            Some(BatchEvent::Stopped(summary)) => assert_eq!(summary.cancelled, 1),
            other => panic!("unexpected last event: {:?}", other),
        }
        assert_eq!(controller.status().unwrap(), BatchStatus::StoppedByUser);

        // 停止是终态，不会再自动派发
        thread::sleep(Duration::from_millis(50));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_timer_mode_delays_each_dispatch() {
        let (src, dst) = setup(&[("a.txt", 1), ("b.txt", 1)]);
        let interval = Duration::from_millis(80);
        let settings = Arc::new(LiveSettings::new(true, interval));
        let (controller, events) =
            BatchController::spawn(RecordingProcessor::default(), settings).unwrap();

        let config = BatchConfig::new(src.path(), dst.path())
            .with_pattern("*.txt")
            .with_timer(Some(interval));
        let started = Instant::now();
        controller.start(config).unwrap();
        collect_until(&events, is_completed);

        assert!(started.elapsed() >= interval * 2);
    }

    #[test]
    fn test_timer_mode_is_reread_and_stop_cancels_pending_dispatch() {
        let (src, dst) = setup(&[("a.txt", 1), ("b.txt", 1)]);
        let settings = Arc::new(LiveSettings::default());
        let processor = RecordingProcessor::default();
        let calls = Arc::clone(&processor.calls);
        let (controller, events) =
            BatchController::spawn(processor, Arc::clone(&settings)).unwrap();

        // 启动快照是立即模式，但运行中切换到很长的定时间隔
        settings.set_use_timer(true);
        settings.set_interval(Duration::from_secs(60));

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.txt");
        controller.start(config).unwrap();
        collect_until(&events, |e| matches!(e, BatchEvent::FileFinished { .. }));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(controller.status().unwrap(), BatchStatus::Running);

        controller.stop().unwrap();
        let seen = collect_until(&events, is_stopped);
        assert!(started_sources(&seen).is_empty());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(controller.status().unwrap(), BatchStatus::StoppedByUser);
    }

    #[test]
    fn test_restart_after_completion() {
        let (src, dst) = setup(&[("a.txt", 1)]);
        let processor = RecordingProcessor::default();
        let calls = Arc::clone(&processor.calls);
        let (controller, events) = BatchController::spawn(processor, immediate()).unwrap();

        let config = BatchConfig::new(src.path(), dst.path()).with_pattern("*.txt");
        controller.start(config.clone()).unwrap();
        collect_until(&events, is_completed);

        controller.start(config).unwrap();
        collect_until(&events, is_completed);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_shutdown_waits_for_in_flight_file() {
        let (src, dst) = setup(&[("a.txt", 1)]);
        let (controller, events) =
            BatchController::spawn(BlockingProcessor::default(), immediate()).unwrap();

        let config =
            BatchConfig::new(src.path(), dst.path()).with_single_file(src.path().join("a.txt"));
        controller.start(config).unwrap();
        collect_until(&events, |e| matches!(e, BatchEvent::FileStarted { .. }));

        controller.shutdown().unwrap();

        let rest: Vec<BatchEvent> = events.try_iter().collect();
        assert!(rest.iter().any(|e| matches!(
            e,
            BatchEvent::FileFinished {
                outcome: FileOutcome::Cancelled,
                ..
            }
        )));
        assert!(rest.last().map(is_stopped).unwrap_or(false));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (controller, events) =
            BatchController::spawn(RecordingProcessor::default(), immediate()).unwrap();
        controller.stop().unwrap();
        assert_eq!(controller.status().unwrap(), BatchStatus::Idle);
        assert!(events.try_recv().is_err());
    }
}
