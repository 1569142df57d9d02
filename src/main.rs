use anyhow::Result;
use clap::Parser;

use lighthouse_batch::cli::{Cli, Command};
use lighthouse_batch::utils::logging;
use lighthouse_batch::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env(),
    };
    if cli.verbose {
        config.verbose_logging = true;
    }

    // 初始化日志（guard 必须持有到程序结束）
    let _log_guard = logging::init(&config)?;

    let app = App::initialize(config)?;

    match cli.command {
        Command::Run(args) => {
            app.run(args).await?;
        }
        Command::Key { action } => app.manage_key(action)?,
    }

    Ok(())
}
