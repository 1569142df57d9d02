//! 演示数据源 - 业务能力层
//!
//! 不需要 API Key，用随机延迟和随机分数模拟一次测试

use std::sync::Mutex;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tokio::time::sleep;
use tracing::debug;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::job::Device;
use crate::models::measurement::{MeasurementOutcome, Scores, SourceKind};
use crate::services::measurement_source::MeasurementSource;

/// 模拟失败时的错误信息
pub const DEMO_FAILURE_MESSAGE: &str = "Site unreachable";
/// 模拟失败时的状态码
pub const DEMO_FAILURE_STATUS: u16 = 404;
/// 演示名称后缀
pub const DEMO_NAME_SUFFIX: &str = " - Demo Site";

/// 演示数据源
pub struct DemoSource {
    rng: Mutex<StdRng>,
    min_delay_ms: u64,
    max_delay_ms: u64,
    failure_rate: f64,
}

impl DemoSource {
    /// 使用配置创建（随机种子）
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// 固定随机种子，结果可复现
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        let failure_rate = if config.demo_failure_rate.is_finite() {
            config.demo_failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            rng: Mutex::new(rng),
            min_delay_ms: config.demo_min_delay_ms,
            max_delay_ms: config.demo_max_delay_ms.max(config.demo_min_delay_ms),
            failure_rate,
        }
    }

    /// 模拟一次测试：先等待随机延迟，再生成结果
    pub async fn simulate(&self, url: &str, device: Device) -> MeasurementOutcome {
        let delay = self.next_delay();
        debug!("演示模式: {} ({}) 延迟 {:?}", url, device, delay);
        sleep(delay).await;
        self.generate(url)
    }

    /// 生成一次结果（不等待）
    pub fn generate(&self, url: &str) -> MeasurementOutcome {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if rng.gen_bool(self.failure_rate) {
            return MeasurementOutcome::failure(url, DEMO_FAILURE_STATUS, DEMO_FAILURE_MESSAGE);
        }

        let scores = Scores {
            performance: rng.gen_range(60..100),
            accessibility: rng.gen_range(70..100),
            best_practices: rng.gen_range(50..100),
            seo: rng.gen_range(60..100),
        };
        MeasurementOutcome::success(demo_name(url), scores)
    }

    fn next_delay(&self) -> Duration {
        if self.max_delay_ms <= self.min_delay_ms {
            return Duration::from_millis(self.min_delay_ms);
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Duration::from_millis(rng.gen_range(self.min_delay_ms..self.max_delay_ms))
    }
}

impl MeasurementSource for DemoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Demo
    }

    fn measure<'a>(
        &'a self,
        url: &'a str,
        device: Device,
    ) -> BoxFuture<'a, AppResult<MeasurementOutcome>> {
        async move { Ok(self.simulate(url, device).await) }.boxed()
    }
}

/// 演示名称：去掉协议头和第一个 `/` 之后的部分，再加后缀
pub fn demo_name(url: &str) -> String {
    let without_scheme = match Regex::new(r"https?://") {
        Ok(re) => re.replacen(url, 1, "").into_owned(),
        Err(_) => url.to_string(),
    };
    let host = without_scheme.split('/').next().unwrap_or_default();
    format!("{}{}", host, DEMO_NAME_SUFFIX)
}
