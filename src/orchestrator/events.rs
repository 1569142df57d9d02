//! 批次事件广播
//!
//! 编排层在每次任务状态变化后发布事件，终端进度、测试等任意消费者都可以订阅

use tokio::sync::broadcast;

use crate::models::job::JobRecord;
use crate::models::stats::BatchStats;
use crate::orchestrator::batch_processor::BatchReport;

/// 广播通道默认容量
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 批次事件（均为快照，消费者只读）
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// 任务已展开，全部为 pending
    Started {
        jobs: Vec<JobRecord>,
        stats: BatchStats,
    },
    /// 某个任务发生了状态变化
    JobUpdated { job: JobRecord, stats: BatchStats },
    /// 所有任务处理完毕
    Finished {
        report: BatchReport,
        stats: BatchStats,
    },
}

impl BatchEvent {
    pub fn stats(&self) -> &BatchStats {
        match self {
            BatchEvent::Started { stats, .. }
            | BatchEvent::JobUpdated { stats, .. }
            | BatchEvent::Finished { stats, .. } => stats,
        }
    }
}

/// 事件广播器
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<BatchEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// 订阅之后发布的所有事件
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.sender.subscribe()
    }

    /// 发布事件，返回收到事件的订阅者数量（没有订阅者时为 0）
    pub fn send(&self, event: BatchEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
