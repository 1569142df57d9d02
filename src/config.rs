use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- PageSpeed API 配置 ---
    pub pagespeed_api_url: String,
    /// 获取网页标题用的代理地址（返回 `{ "contents": "<html>" }`）
    pub title_proxy_url: String,
    /// 单次请求超时（秒），Lighthouse 跑一次通常要几十秒
    pub request_timeout_secs: u64,
    /// API Key 持久化文件
    pub credential_store_path: String,
    // --- 演示模式配置 ---
    pub demo_min_delay_ms: u64,
    pub demo_max_delay_ms: u64,
    pub demo_failure_rate: f64,
    // --- 输出配置 ---
    /// 导出 Excel 的目录
    pub export_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pagespeed_api_url: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed"
                .to_string(),
            title_proxy_url: "https://api.allorigins.win/get".to_string(),
            request_timeout_secs: 120,
            credential_store_path: ".lighthouse_batch/credentials.json".to_string(),
            demo_min_delay_ms: 1000,
            demo_max_delay_ms: 3000,
            demo_failure_rate: 0.1,
            export_dir: ".".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            pagespeed_api_url: std::env::var("PAGESPEED_API_URL").unwrap_or(default.pagespeed_api_url),
            title_proxy_url: std::env::var("TITLE_PROXY_URL").unwrap_or(default.title_proxy_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            credential_store_path: std::env::var("CREDENTIAL_STORE_PATH").unwrap_or(default.credential_store_path),
            demo_min_delay_ms: std::env::var("DEMO_MIN_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.demo_min_delay_ms),
            demo_max_delay_ms: std::env::var("DEMO_MAX_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.demo_max_delay_ms),
            demo_failure_rate: std::env::var("DEMO_FAILURE_RATE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.demo_failure_rate),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| {
            ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
