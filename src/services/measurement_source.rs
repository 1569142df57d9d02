//! 测量数据源 - 业务能力层
//!
//! 只描述"给一个 URL 和设备，拿到分数"的能力，编排层不关心背后是实时接口还是演示数据

use futures::future::BoxFuture;

use crate::error::AppResult;
use crate::models::job::Device;
use crate::models::measurement::{MeasurementOutcome, SourceKind};

/// 测量数据源
///
/// 返回 `Err` 表示这次调用本身失败（编排层会记为 "Testing failed"），
/// 返回带 `error` 的 [`MeasurementOutcome`] 表示数据源已把失败转换成结果
pub trait MeasurementSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn measure<'a>(
        &'a self,
        url: &'a str,
        device: Device,
    ) -> BoxFuture<'a, AppResult<MeasurementOutcome>>;
}
