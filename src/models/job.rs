//! 测试任务模型
//!
//! 一个任务 = 一个 URL × 一种设备，生命周期只能向前：
//! `pending → testing → {completed | error}`，未开始即取消时为 `pending → cancelled`

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::measurement::{MeasurementOutcome, Scores};

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    /// 每个 URL 的展开顺序：先 mobile 再 desktop
    pub const ALL: [Device; 2] = [Device::Mobile, Device::Desktop];

    /// PageSpeed 的 `strategy` 参数值
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Testing,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    /// 终态之后记录不可再修改
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled
        )
    }

    /// 是否允许流转到 `next`
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Testing)
                | (JobStatus::Pending, JobStatus::Cancelled)
                | (JobStatus::Testing, JobStatus::Completed)
                | (JobStatus::Testing, JobStatus::Error)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Testing => "testing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// 单个测试任务记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub url: String,
    /// 默认为 URL，测试后可能被网页标题或演示名称覆盖
    pub name: String,
    /// 0 表示尚未得到结果
    pub page_status: u16,
    pub device: Device,
    #[serde(flatten)]
    pub scores: Scores,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    /// 创建待处理的任务
    pub fn new(url: impl Into<String>, device: Device) -> Self {
        let url = url.into();
        Self {
            id: Uuid::new_v4(),
            name: url.clone(),
            url,
            page_status: 0,
            device,
            scores: Scores::default(),
            status: JobStatus::Pending,
            error: None,
        }
    }

    /// 已完成或失败（可导出）
    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Error)
    }

    /// pending → testing
    pub fn start_testing(&mut self) -> AppResult<()> {
        self.transition(JobStatus::Testing)
    }

    /// 合并测量结果
    ///
    /// 结果本身携带错误信息时（例如演示模式的 "Site unreachable"）任务进入 `error`，
    /// 但保留结果中的名称、状态码与分数
    pub fn apply_outcome(&mut self, outcome: MeasurementOutcome) -> AppResult<()> {
        let next = if outcome.error.is_some() {
            JobStatus::Error
        } else {
            JobStatus::Completed
        };
        self.transition(next)?;

        self.name = outcome.name;
        self.page_status = outcome.page_status;
        self.scores = outcome.scores;
        self.error = outcome.error;
        Ok(())
    }

    /// testing → error，状态码归零
    pub fn fail(&mut self, message: impl Into<String>) -> AppResult<()> {
        self.transition(JobStatus::Error)?;
        self.page_status = 0;
        self.error = Some(message.into());
        Ok(())
    }

    /// pending → cancelled
    pub fn cancel(&mut self) -> AppResult<()> {
        self.transition(JobStatus::Cancelled)
    }

    fn transition(&mut self, next: JobStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
