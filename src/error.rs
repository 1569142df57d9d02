use std::path::PathBuf;

use thiserror::Error;

use crate::models::job::JobStatus;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 输入校验错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 凭据存储错误
    #[error("凭据错误: {0}")]
    Credential(#[from] CredentialError),
    /// 任务状态只能向前流转
    #[error("任务 {id} 状态不能从 {from} 变为 {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 实时模式下没有可用的 API Key
    #[error("PageSpeed Insights API key not provided")]
    MissingApiKey,
    /// 读取配置文件失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 创建 HTTP 客户端失败
    #[error("无法创建 HTTP 客户端: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// API 调用错误
///
/// `Display` 的内容会直接写入任务记录的错误信息
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("{source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 非 2xx 响应
    #[error("HTTP {status}: {reason}")]
    BadResponse { status: u16, reason: String },
    /// JSON 解析失败
    #[error("Invalid response body: {source}")]
    JsonParseFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 没有提供任何 URL
    #[error("No URLs provided: please enter at least one URL")]
    EmptySubmission,
    /// 不支持的文件格式
    #[error("Unsupported file format: {path} (please upload a CSV or TXT file)")]
    UnsupportedFileType { path: PathBuf },
    /// 文件中没有可用的 URL
    #[error("No URLs found in {path}: please check your file format")]
    NoUrlsFound { path: PathBuf },
    /// 读取文件失败
    #[error("无法读取文件 {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 没有已完成的结果
    #[error("没有可导出的测试结果")]
    NothingToExport,
    /// 创建导出目录失败
    #[error("无法创建导出目录 {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入表格失败
    #[error("写入表格失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// 凭据存储错误
#[derive(Debug, Error)]
pub enum CredentialError {
    /// API Key 为空
    #[error("API key must not be empty")]
    EmptyKey,
    /// 读取存储文件失败
    #[error("无法读取凭据文件 {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储文件失败
    #[error("无法写入凭据文件 {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 存储文件格式错误
    #[error("凭据文件格式错误 {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
