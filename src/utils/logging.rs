use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;
use crate::models::measurement::SourceKind;
use crate::models::stats::BatchStats;
use crate::orchestrator::BatchReport;

/// 初始化日志
///
/// 控制台输出 + 写入 `output_log_file`（纯文本，不带颜色）。
/// 返回的 guard 需要一直持有，否则文件日志会丢失
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    let (file_layer, guard) = if config.output_log_file.is_empty() {
        (None, None)
    } else {
        init_log_file(&config.output_log_file)?;
        let path = Path::new(&config.output_log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().context("日志文件名无效")?;

        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .boxed();
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("日志系统已初始化")?;

    Ok(guard)
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nLighthouse 批量测试日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - Lighthouse 批量测试");
    info!("📡 PageSpeed 接口: {}", config.pagespeed_api_url);
    info!("📁 导出目录: {}", config.export_dir);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `url_count`: URL 数量
/// - `job_count`: 任务数量（URL × 设备）
/// - `source`: 数据源类型
pub fn log_batch_start(url_count: usize, job_count: usize, source: SourceKind) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始测试 {} 个 URL，共 {} 个任务", url_count, job_count);
    match source {
        SourceKind::Demo => info!("⚡ 演示模式：使用模拟数据"),
        SourceKind::Live => info!("🔑 实时模式：调用 PageSpeed Insights"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次进度
pub fn log_progress(stats: &BatchStats) {
    let current = stats.current_url.as_deref().unwrap_or("-");
    info!(
        "📊 进度 {}% | 完成 {} | 失败 {} | 剩余 {} | 当前: {}",
        stats.progress_percentage(),
        stats.completed,
        stats.errors,
        stats.in_progress(),
        current
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 批次结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(report: &BatchReport, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部测试完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.completed, report.total);
    info!("❌ 失败: {}", report.errors);
    if report.cancelled > 0 {
        info!("⏹️ 已取消: {}", report.cancelled);
    }
    info!("{}", "=".repeat(60));
    if !log_file_path.is_empty() {
        info!("\n日志已保存至: {}", log_file_path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
