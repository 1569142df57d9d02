//! 批量测试编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **任务展开**：每个 URL 展开为 mobile、desktop 两个任务，顺序固定
//! 2. **顺序执行**：同一时刻只有一个任务处于 `testing`
//! 3. **状态发布**：每次状态变化后重新计算统计并广播快照
//! 4. **失败隔离**：单个任务的失败不会中断批次
//! 5. **协作取消**：每个任务开始前检查取消标记
//!
//! 单个任务的测量细节委托给 `workflow::JobFlow`

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::error::{AppResult, InputError};
use crate::models::job::{Device, JobRecord};
use crate::models::loaders::normalize_url;
use crate::models::stats::BatchStats;
use crate::orchestrator::cancellation::CancelToken;
use crate::orchestrator::events::{BatchEvent, EventBroadcaster};
use crate::services::MeasurementSource;
use crate::utils::logging;
use crate::workflow::{JobCtx, JobFlow};

/// 批次结束后的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub cancelled: usize,
}

impl BatchReport {
    pub fn from_stats(stats: &BatchStats) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
            errors: stats.errors,
            cancelled: stats.cancelled,
        }
    }

    /// 所有任务都测试成功
    pub fn all_succeeded(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// 批量测试编排器
pub struct BatchOrchestrator {
    source: Arc<dyn MeasurementSource>,
    events: EventBroadcaster,
    cancel: Option<CancelToken>,
    records: Vec<JobRecord>,
    stats: BatchStats,
}

impl BatchOrchestrator {
    pub fn new(source: Arc<dyn MeasurementSource>) -> Self {
        Self {
            source,
            events: EventBroadcaster::new(),
            cancel: None,
            records: Vec::new(),
            stats: BatchStats::default(),
        }
    }

    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 订阅批次事件
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// 当前批次的任务列表（按展开顺序）
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// 将 URL 列表展开为任务列表
    ///
    /// # 参数
    /// - `urls`: 原始 URL 列表（会被规范化）
    ///
    /// # 返回
    /// URL 顺序不变，每个 URL 依次为 mobile、desktop；列表为空时返回 `EmptySubmission`
    pub fn expand_jobs<S: AsRef<str>>(urls: &[S]) -> AppResult<Vec<JobRecord>> {
        let jobs: Vec<JobRecord> = urls
            .iter()
            .map(|u| u.as_ref().trim())
            .filter(|u| !u.is_empty())
            .map(normalize_url)
            .flat_map(|url| {
                Device::ALL
                    .into_iter()
                    .map(move |device| JobRecord::new(url.clone(), device))
            })
            .collect();

        if jobs.is_empty() {
            return Err(InputError::EmptySubmission.into());
        }
        Ok(jobs)
    }

    /// 运行一个批次
    ///
    /// 会清空上一个批次的结果。只有输入为空时返回 `Err`，
    /// 批次开始后的任何失败都记录在对应任务上
    pub async fn run_batch<S: AsRef<str>>(&mut self, urls: &[S]) -> AppResult<BatchReport> {
        let jobs = Self::expand_jobs(urls)?;

        self.records = jobs;
        let first_url = self.records.first().map(|r| r.url.clone());
        self.refresh_stats(first_url);

        logging::log_batch_start(
            self.records.len() / Device::ALL.len(),
            self.records.len(),
            self.source.kind(),
        );
        self.events.send(BatchEvent::Started {
            jobs: self.records.clone(),
            stats: self.stats.clone(),
        });

        let total = self.records.len();
        for index in 0..total {
            if self.is_cancelled() {
                self.cancel_remaining(index);
                break;
            }

            let url = self.records[index].url.clone();
            if let Err(e) = self.records[index].start_testing() {
                error!("任务 {} 无法开始测试: {}", index + 1, e);
                continue;
            }
            self.refresh_stats(Some(url.clone()));
            self.publish_job(index);

            let ctx = JobCtx::new(index + 1, total, &self.records[index]);
            let flow = JobFlow::new(self.source.as_ref());
            if let Err(e) = flow.run(&mut self.records[index], &ctx).await {
                error!("{} 状态更新失败: {}", ctx, e);
            }

            self.refresh_stats(Some(url));
            self.publish_job(index);
        }

        self.refresh_stats(None);
        let report = BatchReport::from_stats(&self.stats);

        if report.all_succeeded() {
            info!("✅ 测试完成：全部 {} 个测试均成功", report.total);
        } else {
            info!(
                "🏁 测试完成：已处理 {} 个测试",
                report.completed + report.errors
            );
        }

        self.events.send(BatchEvent::Finished {
            report,
            stats: self.stats.clone(),
        });

        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// 将 `from` 之后尚未开始的任务标记为已取消
    fn cancel_remaining(&mut self, from: usize) {
        warn!("⏹️ 批次已取消，剩余 {} 个任务不再测试", self.records.len() - from);

        for index in from..self.records.len() {
            if self.records[index].cancel().is_ok() {
                self.refresh_stats(None);
                self.publish_job(index);
            }
        }
    }

    fn refresh_stats(&mut self, current_url: Option<String>) {
        self.stats = BatchStats::from_records(&self.records, current_url);
    }

    fn publish_job(&self, index: usize) {
        self.events.send(BatchEvent::JobUpdated {
            job: self.records[index].clone(),
            stats: self.stats.clone(),
        });
    }
}
