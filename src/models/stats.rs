use serde::{Deserialize, Serialize};

use crate::models::job::{JobRecord, JobStatus};

/// 批次统计，由任务列表重新计算得到
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub cancelled: usize,
    /// 正在测试的 URL，批次结束后清空
    pub current_url: Option<String>,
}

impl BatchStats {
    pub fn from_records(records: &[JobRecord], current_url: Option<String>) -> Self {
        let count = |status: JobStatus| records.iter().filter(|r| r.status == status).count();

        Self {
            total: records.len(),
            completed: count(JobStatus::Completed),
            errors: count(JobStatus::Error),
            cancelled: count(JobStatus::Cancelled),
            current_url,
        }
    }

    /// 尚未结束的任务数
    pub fn in_progress(&self) -> usize {
        self.total
            .saturating_sub(self.completed + self.errors + self.cancelled)
    }

    /// 完成百分比（四舍五入，total 为 0 时为 0）
    pub fn progress_percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }

    /// `completed + errors ≤ total`
    pub fn is_consistent(&self) -> bool {
        self.completed + self.errors + self.cancelled <= self.total
    }
}
