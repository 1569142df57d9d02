//! 任务处理上下文
//!
//! 封装"正在处理第几个任务、哪个 URL、哪种设备"这一信息

use std::fmt::Display;

use crate::models::job::{Device, JobRecord};

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 任务序号（从1开始，仅用于日志显示）
    pub job_index: usize,

    /// 任务总数
    pub total_jobs: usize,

    pub url: String,

    pub device: Device,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(job_index: usize, total_jobs: usize, record: &JobRecord) -> Self {
        Self {
            job_index,
            total_jobs,
            url: record.url.clone(),
            device: record.device,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {}/{} {} {}]",
            self.job_index, self.total_jobs, self.device, self.url
        )
    }
}
