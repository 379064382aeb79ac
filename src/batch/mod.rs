//! # 批量处理模块
//!
//! 扫描、排队、逐个变换文件的整条流水线。
//!
//! ## 功能
//! - 按模式收集文件，或接受单个显式文件
//! - 单文件流式 XOR 变换，分块读写并采样进度
//! - 控制器一次只派发一个文件，立即或按间隔推进
//! - 协作式取消与结果统计
//!
//! ## 依赖关系
//! - 被 `commands/run.rs` 使用
//! - 使用 `transform/` 做 XOR
//! - 使用 `rayon` 运行后台任务，`crossbeam-channel` 传递消息

pub mod collector;
pub mod controller;
pub mod dispatch;
pub mod state;
pub mod summary;
pub mod transformer;

pub use controller::BatchController;
pub use summary::BatchSummary;
pub use transformer::FileTransformer;
