//! 实时数据源 - 业务能力层
//!
//! 调用 PageSpeed Insights 获取真实分数

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::clients::{PageSpeedClient, TitleClient};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError};
use crate::infrastructure::CredentialService;
use crate::models::job::Device;
use crate::models::measurement::{MeasurementOutcome, SourceKind};
use crate::services::measurement_source::MeasurementSource;

/// 实时数据源
///
/// 职责：
/// - 尽力获取网页标题作为名称（失败则使用 URL）
/// - 调用 PageSpeed 获取四项分数
/// - 把请求过程中的错误转换为失败结果，不向上抛出
pub struct LiveSource {
    pagespeed: PageSpeedClient,
    titles: TitleClient,
    credentials: Arc<CredentialService>,
    /// 第一次测量时解析，同一数据源的后续任务复用
    resolved_key: OnceCell<String>,
}

impl LiveSource {
    /// 创建新的实时数据源
    pub fn new(config: &Config, credentials: Arc<CredentialService>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            pagespeed: PageSpeedClient::new(http.clone(), config),
            titles: TitleClient::new(http, config),
            credentials,
            resolved_key: OnceCell::new(),
        })
    }

    /// 批次开始前检查 API Key
    pub fn ensure_configured(&self) -> AppResult<()> {
        if self.credentials.is_configured()? {
            Ok(())
        } else {
            Err(ConfigError::MissingApiKey.into())
        }
    }

    /// 测试单个 URL
    ///
    /// 没有 API Key 时返回 `Err`，其余错误都转换为失败结果
    pub async fn test_url(&self, url: &str, device: Device) -> AppResult<MeasurementOutcome> {
        let api_key = self.api_key().await?;

        match self.run(url, device, api_key).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("测试 {} ({}) 失败: {}", url, device, e);
                let message = e.to_string();
                let message = if message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                };
                Ok(MeasurementOutcome::failure(url, 0, message))
            }
        }
    }

    /// 解析 API Key，成功后缓存；缺失时不缓存
    async fn api_key(&self) -> AppResult<&str> {
        let key = self
            .resolved_key
            .get_or_try_init(|| async {
                self.credentials
                    .get()?
                    .ok_or_else(|| AppError::from(ConfigError::MissingApiKey))
            })
            .await?;
        Ok(key.as_str())
    }

    async fn run(
        &self,
        url: &str,
        device: Device,
        api_key: &str,
    ) -> Result<MeasurementOutcome, ApiError> {
        let name = self.resolve_name(url).await;

        let response = self.pagespeed.run_pagespeed(url, api_key, device).await?;

        // 接口调用成功即视为页面可访问
        Ok(MeasurementOutcome::success(name, response.scores()))
    }

    /// 获取网页标题，任何失败都回退为 URL
    async fn resolve_name(&self, url: &str) -> String {
        match self.titles.fetch_title(url).await {
            Ok(Some(title)) => title,
            Ok(None) => url.to_string(),
            Err(e) => {
                debug!("无法获取网页标题，使用 URL: {}", e);
                url.to_string()
            }
        }
    }
}

impl MeasurementSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn measure<'a>(
        &'a self,
        url: &'a str,
        device: Device,
    ) -> BoxFuture<'a, AppResult<MeasurementOutcome>> {
        self.test_url(url, device).boxed()
    }
}
