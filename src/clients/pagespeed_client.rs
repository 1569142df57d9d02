/// PageSpeed Insights API 客户端
///
/// 封装 runPagespeed 调用，只负责请求与解析，不处理错误兜底
use crate::config::Config;
use crate::error::ApiError;
use crate::models::job::Device;
use crate::models::pagespeed::{PageSpeedResponse, CATEGORIES};
use tracing::debug;

/// PageSpeed API 客户端
pub struct PageSpeedClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PageSpeedClient {
    /// 创建新的 PageSpeed 客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            endpoint: config.pagespeed_api_url.clone(),
        }
    }

    /// 对单个 URL 运行 Lighthouse
    ///
    /// # 参数
    /// - `url`: 目标网址
    /// - `api_key`: PageSpeed API Key
    /// - `device`: 设备策略
    ///
    /// # 返回
    /// 返回解析后的响应；非 2xx 返回 `HTTP <code>: <reason>`
    pub async fn run_pagespeed(
        &self,
        url: &str,
        api_key: &str,
        device: Device,
    ) -> Result<PageSpeedResponse, ApiError> {
        debug!("调用 PageSpeed API: {} ({})", url, device);

        let categories: Vec<(&str, &str)> = CATEGORIES.iter().map(|c| ("category", *c)).collect();

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url), ("key", api_key), ("strategy", device.as_str())])
            .query(&categories)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let data = response
            .json::<PageSpeedResponse>()
            .await
            .map_err(|source| ApiError::JsonParseFailed { source })?;

        debug!("PageSpeed 返回: {:?}", data.id);
        Ok(data)
    }
}
