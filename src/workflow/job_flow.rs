//! 任务处理流程 - 流程层
//!
//! 核心职责：定义"一个任务"的测量流程
//!
//! 1. 调用数据源测量
//! 2. 成功 → 合并结果（结果本身可能是失败结果）
//! 3. 调用出错 → 记为失败，错误只影响当前任务

use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::models::job::{JobRecord, JobStatus};
use crate::services::MeasurementSource;
use crate::workflow::job_ctx::JobCtx;

/// 数据源调用出错时写入任务的通用错误信息
pub const GENERIC_FAILURE_MESSAGE: &str = "Testing failed";

/// 任务处理流程
///
/// - 只处理单个任务
/// - 不持有任务列表，不更新批次统计
/// - 调用前任务必须已处于 `testing`
pub struct JobFlow<'a> {
    source: &'a dyn MeasurementSource,
}

impl<'a> JobFlow<'a> {
    /// 创建新的任务处理流程
    pub fn new(source: &'a dyn MeasurementSource) -> Self {
        Self { source }
    }

    /// 执行一次测量并写回任务记录，结果体现在记录的状态上
    ///
    /// 只有任务状态非法时才返回 `Err`
    pub async fn run(&self, record: &mut JobRecord, ctx: &JobCtx) -> AppResult<()> {
        info!("{} 🔍 开始测试", ctx);

        let result = self.source.measure(&record.url, record.device).await;
        match result {
            Ok(outcome) => {
                record.apply_outcome(outcome)?;
            }
            Err(e) => {
                error!("{} ❌ 测试出错: {}", ctx, e);
                record.fail(GENERIC_FAILURE_MESSAGE)?;
            }
        }

        if record.status == JobStatus::Completed {
            let s = &record.scores;
            info!(
                "{} ✓ {} | 性能 {} | 无障碍 {} | 最佳实践 {} | SEO {}",
                ctx, record.name, s.performance, s.accessibility, s.best_practices, s.seo
            );
        } else {
            warn!(
                "{} ⚠️ 测试失败: {}",
                ctx,
                record.error.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE)
            );
        }
        Ok(())
    }
}
