//! # Lighthouse Batch
//!
//! 批量运行 Lighthouse（PageSpeed Insights）测试的 Rust 应用程序：
//! 每个 URL 分别在 mobile 和 desktop 下测试，汇总四项评分并导出 Excel
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 凭据存储（内存 → 文件 → 环境变量）
//! - `clients/` - PageSpeed Insights 与网页标题代理的 HTTP 客户端
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个 URL
//! - `LiveSource` - 调用 PageSpeed Insights 测量
//! - `DemoSource` - 生成模拟结果
//! - `ExcelExporter` - 导出 xlsx
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个任务"的完整处理流程
//! - `JobCtx` - 上下文封装（任务序号 + URL + 设备）
//! - `JobFlow` - 测量并写回任务记录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 展开任务、顺序执行、广播进度
//! - `orchestrator/app` - 命令入口，串起输入、数据源、导出
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{BatchStats, Device, JobRecord, JobStatus, MeasurementOutcome, Scores};
pub use orchestrator::{App, BatchEvent, BatchOrchestrator, BatchReport};
pub use services::{DemoSource, ExcelExporter, LiveSource, MeasurementSource};
pub use workflow::{JobCtx, JobFlow};
