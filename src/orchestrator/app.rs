//! 应用主结构 - 编排层
//!
//! 负责把命令行输入转换成一个批次：收集 URL、选择数据源、
//! 挂上进度输出和 Ctrl+C 取消、运行批次、打印结果并导出

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cli::{KeyAction, RunArgs};
use crate::config::Config;
use crate::error::{AppResult, InputError};
use crate::infrastructure::{CredentialService, EnvCredential};
use crate::models::loaders::{load_urls_from_file, parse_manual_input};
use crate::orchestrator::batch_processor::{BatchOrchestrator, BatchReport};
use crate::orchestrator::cancellation::cancel_pair;
use crate::orchestrator::events::BatchEvent;
use crate::services::result_printer::{failure_summary, render_results_table};
use crate::services::{DemoSource, ExcelExporter, LiveSource, MeasurementSource};
use crate::utils::logging;

/// 读取 API Key 的环境变量（优先级低于内存和凭据文件）
pub const API_KEY_ENV: &str = "PAGESPEED_API_KEY";

/// 应用主结构
pub struct App {
    config: Config,
    credentials: Arc<CredentialService>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let credentials = CredentialService::new(&config.credential_store_path)
            .with_provider(Arc::new(EnvCredential::new(API_KEY_ENV)));

        Ok(Self {
            config,
            credentials: Arc::new(credentials),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<CredentialService> {
        &self.credentials
    }

    /// 运行一个批次
    ///
    /// 输入为空或缺少 API Key 时直接返回错误，不会开始批次。
    /// 导出失败只记录日志，测试结果不受影响
    pub async fn run(&self, args: RunArgs) -> Result<BatchReport> {
        let urls = self.collect_urls(&args).await?;
        let source = self.build_source(&args)?;

        let (cancel_handle, cancel_token) = cancel_pair();
        let mut orchestrator = BatchOrchestrator::new(source).with_cancellation(cancel_token);

        let progress = spawn_progress_logger(orchestrator.subscribe());
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⏹️ 收到 Ctrl+C，当前任务结束后停止");
                cancel_handle.cancel();
            }
        });

        let report = orchestrator.run_batch(&urls).await?;
        ctrl_c.abort();
        if let Err(e) = progress.await {
            warn!("进度输出任务异常退出: {}", e);
        }

        info!("\n{}", render_results_table(orchestrator.records()));
        if let Some(summary) = failure_summary(orchestrator.stats()) {
            warn!("⚠️ {}", summary);
        }

        if args.no_export {
            info!("已跳过 Excel 导出");
        } else {
            let export_dir = args
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.config.export_dir));
            match ExcelExporter::new(export_dir).export(orchestrator.records()) {
                Ok(path) => info!("📄 导出成功: {}", path.display()),
                Err(e) => error!("❌ 导出失败: {}", e),
            }
        }

        logging::print_final_stats(&report, &self.config.output_log_file);

        Ok(report)
    }

    /// 管理 API Key
    pub fn manage_key(&self, action: KeyAction) -> Result<()> {
        match action {
            KeyAction::Set { key } => {
                self.credentials.set(&key)?;
                info!(
                    "✓ API Key 已保存: {}",
                    self.credentials.store_path().display()
                );
            }
            KeyAction::Clear => {
                self.credentials.clear()?;
                info!("🗑️ API Key 已清除");
            }
            KeyAction::Status => {
                if self.credentials.is_configured()? {
                    info!("✓ API Key 已配置");
                } else {
                    warn!("⚠️ 未配置 API Key，可使用 `key set <KEY>` 保存，或使用 --demo 运行");
                }
            }
        }
        Ok(())
    }

    /// 合并 `--url` 与 `--file` 中的 URL
    async fn collect_urls(&self, args: &RunArgs) -> AppResult<Vec<String>> {
        let mut urls = Vec::new();

        // 每个 --url 的值都可以是逗号分隔的列表
        let manual = args
            .urls
            .iter()
            .flat_map(|value| value.split(','))
            .collect::<Vec<_>>()
            .join("\n");
        if !manual.trim().is_empty() {
            urls.extend(parse_manual_input(&manual)?);
        }

        if let Some(path) = &args.file {
            let imported = load_urls_from_file(path).await?;
            info!("📁 从 {} 导入 {} 个 URL", path.display(), imported.len());
            urls.extend(imported);
        }

        if urls.is_empty() {
            return Err(InputError::EmptySubmission.into());
        }
        Ok(urls)
    }

    /// 选择数据源；实时模式下先检查 API Key
    fn build_source(&self, args: &RunArgs) -> AppResult<Arc<dyn MeasurementSource>> {
        if args.demo {
            return Ok(Arc::new(DemoSource::new(&self.config)));
        }

        if let Some(key) = &args.api_key {
            self.credentials.set_session(key)?;
        }

        let live = LiveSource::new(&self.config, self.credentials.clone())?;
        live.ensure_configured()?;
        Ok(Arc::new(live))
    }
}

/// 消费批次事件，在每个任务结束时输出进度
fn spawn_progress_logger(mut rx: broadcast::Receiver<BatchEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(BatchEvent::JobUpdated { job, stats }) if job.is_finished() => {
                    logging::log_progress(&stats);
                }
                Ok(BatchEvent::Finished { .. }) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("进度输出落后，跳过 {} 条事件", skipped);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ConfigError};

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            credential_store_path: dir.join("credentials.json").to_string_lossy().into_owned(),
            export_dir: dir.join("exports").to_string_lossy().into_owned(),
            output_log_file: String::new(),
            demo_min_delay_ms: 0,
            demo_max_delay_ms: 0,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_empty_submission_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::initialize(test_config(dir.path())).unwrap();

        let err = app
            .run(RunArgs {
                demo: true,
                ..RunArgs::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Input(InputError::EmptySubmission))
        ));
    }

    #[tokio::test]
    async fn test_demo_run_exports_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::initialize(test_config(dir.path())).unwrap();

        let report = app
            .run(RunArgs {
                urls: vec!["a.com".into(), "b.com".into()],
                demo: true,
                ..RunArgs::default()
            })
            .await
            .unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.completed + report.errors, 4);

        let exported: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
            .unwrap()
            .collect();
        assert_eq!(exported.len(), 1);
    }

    #[tokio::test]
    async fn test_comma_separated_urls_are_split() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::initialize(test_config(dir.path())).unwrap();

        let urls = app
            .collect_urls(&RunArgs {
                urls: vec!["a.com,b.com".into(), " c.com , ".into()],
                demo: true,
                ..RunArgs::default()
            })
            .await
            .unwrap();

        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[tokio::test]
    async fn test_key_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::initialize(test_config(dir.path())).unwrap();

        app.manage_key(KeyAction::Set { key: "k-123".into() })
            .unwrap();
        assert_eq!(app.credentials().get().unwrap().as_deref(), Some("k-123"));

        app.manage_key(KeyAction::Clear).unwrap();
        app.manage_key(KeyAction::Status).unwrap();
        assert!(std::env::var(API_KEY_ENV).is_ok() || !app.credentials().is_configured().unwrap());
    }

    #[tokio::test]
    async fn test_session_key_skips_preflight_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::initialize(test_config(dir.path())).unwrap();

        let source = app.build_source(&RunArgs {
            api_key: Some("session".into()),
            ..RunArgs::default()
        });
        assert!(source.is_ok());
        assert!(!dir.path().join("credentials.json").exists());

        if std::env::var(API_KEY_ENV).is_err() {
            app.credentials().clear().unwrap();
            let err = app.build_source(&RunArgs::default()).err().unwrap();
            assert!(matches!(err, AppError::Config(ConfigError::MissingApiKey)));
        }
    }
}
