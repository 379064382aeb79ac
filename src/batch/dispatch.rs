//! # 派发策略
//!
//! 立即派发与延时派发两种实现，每次派发时根据当前设置选择。
//!
//! ## 依赖关系
//! - 被 `batch/controller.rs` 使用
//! - 读取 `models::LiveSettings`

use crate::models::LiveSettings;

use std::fmt;
use std::time::{Duration, Instant};

/// 派发时机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// 立刻启动
    Now,
    /// 到达该时刻后启动
    At(Instant),
}

/// 派发策略
pub trait DispatchStrategy: fmt::Debug {
    fn schedule(&self, now: Instant) -> Schedule;
}

/// 立即派发
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl DispatchStrategy for Immediate {
    fn schedule(&self, _now: Instant) -> Schedule {
        Schedule::Now
    }
}

/// 间隔一段时间后派发
#[derive(Debug, Clone, Copy)]
pub struct AfterInterval(pub Duration);

impl DispatchStrategy for AfterInterval {
    fn schedule(&self, now: Instant) -> Schedule {
        Schedule::At(now + self.0)
    }
}

/// 按定时模式选择策略
pub fn strategy_for(use_timer: bool, interval: Duration) -> Box<dyn DispatchStrategy> {
    if use_timer {
        Box::new(AfterInterval(interval))
    } else {
        Box::new(Immediate)
    }
}

/// 从实时设置中读取当前策略
pub fn current_strategy(settings: &LiveSettings) -> Box<dyn DispatchStrategy> {
    strategy_for(settings.use_timer(), settings.interval())
}
