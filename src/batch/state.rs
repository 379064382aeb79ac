//! # 批处理状态
//!
//! 控制器独占的队列、当前下标和运行标志。
//!
//! `current_index` 始终在 `[0, len]` 之内；`is_running` 为真且下标未越界时才算运行中。
//! 运行标志用 `Arc<AtomicBool>` 与在途任务共享，后台任务只读不写。
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs` 使用

use crate::models::FileJob;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 控制器对外可见的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Idle,
    Running,
    StoppedByUser,
    Completed,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Idle => write!(f, "idle"),
            BatchStatus::Running => write!(f, "running"),
            BatchStatus::StoppedByUser => write!(f, "stopped by user"),
            BatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// 队列与游标
#[derive(Debug, Default)]
pub struct BatchState {
    queue: Vec<FileJob>,
    current_index: usize,
    running: Arc<AtomicBool>,
}

impl BatchState {
    /// 以新队列开始一次运行
    ///
    /// 每次运行使用新的标志，上一轮还在收尾的任务看到的是它自己那一份。
    pub fn begin(&mut self, queue: Vec<FileJob>) {
        self.queue = queue;
        self.current_index = 0;
        self.running = Arc::new(AtomicBool::new(true));
    }

    /// 停止：在途任务下一次检查时看到
    pub fn halt(&mut self) {
        self.running.store(false, Ordering::Release);
    }

    /// 清空队列，回到空闲
    pub fn reset(&mut self) {
        self.halt();
        self.queue.clear();
        self.current_index = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && self.current_index < self.queue.len()
    }

    /// 给在途任务的只读标志
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn current(&self) -> Option<&FileJob> {
        self.queue.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.queue.len()
    }

    /// 前进到下一个文件；已经是最后一个时返回 `false`，游标停在末尾哨兵
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            self.current_index = self.queue.len();
            false
        } else {
            self.current_index += 1;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn jobs(n: usize) -> Vec<FileJob> {
        (0..n)
            .map(|i| FileJob::new(PathBuf::from(format!("/src/{}.bin", i)), Path::new("/out")))
            .collect()
    }

    #[test]
    fn test_default_is_idle() {
        let state = BatchState::default();
        assert!(!state.is_running());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_advance_through_queue() {
        let mut state = BatchState::default();
        state.begin(jobs(3));
        assert!(state.is_running());
        assert_eq!(state.current_index(), 0);

        assert!(state.advance());
        assert!(state.advance());
        assert_eq!(state.current_index(), 2);
        assert!(state.is_last());

        assert!(!state.advance());
        assert_eq!(state.current_index(), 3);
        assert!(!state.is_running());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_halt_is_seen_by_flag() {
        let mut state = BatchState::default();
        state.begin(jobs(2));
        let flag = state.running_flag();
        assert!(flag.load(Ordering::Acquire));

        state.halt();
        assert!(!flag.load(Ordering::Acquire));
        assert!(!state.is_running());

        // 新一轮不影响旧标志
        state.begin(jobs(1));
        assert!(state.is_running());
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_reset() {
        let mut state = BatchState::default();
        state.begin(jobs(2));
        state.reset();
        assert_eq!(state.len(), 0);
        assert_eq!(state.current_index(), 0);
        assert!(!state.is_running());
    }
}
