//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主结构
//! - 收集 URL（手动输入 / 文件导入）
//! - 选择数据源（实时 / 演示），实时模式下预检 API Key
//! - 挂接进度输出和 Ctrl+C 取消
//! - 打印结果表、导出 Excel、输出最终统计
//!
//! ### `batch_processor` - 批量测试编排器
//! - 将 URL 展开为 mobile / desktop 任务
//! - 顺序执行任务，维护任务列表和批次统计
//! - 每次状态变化后广播快照
//!
//! ### `events` / `cancellation`
//! - 批次事件广播（tokio broadcast）
//! - 协作式取消（tokio watch）
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一次命令)
//!     ↓
//! batch_processor (处理 Vec<JobRecord>)
//!     ↓
//! workflow::JobFlow (处理单个 JobRecord)
//!     ↓
//! services (能力层：live / demo / export)
//!     ↓
//! clients / infrastructure (HTTP 客户端、凭据)
//! ```

pub mod app;
pub mod batch_processor;
pub mod cancellation;
pub mod events;

// 重新导出主要类型
pub use app::{App, API_KEY_ENV};
pub use batch_processor::{BatchOrchestrator, BatchReport};
pub use cancellation::{cancel_pair, CancelHandle, CancelToken};
pub use events::{BatchEvent, EventBroadcaster};
