//! 命令行参数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lighthouse-batch", version, about = "批量运行 Lighthouse / PageSpeed Insights 测试")]
pub struct Cli {
    /// TOML 配置文件路径（不提供时读取环境变量）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 运行一个批次
    Run(RunArgs),

    /// 管理 PageSpeed Insights API Key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// 要测试的 URL，可重复；也接受逗号或换行分隔的列表
    #[arg(short, long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// 从 .csv / .txt 文件导入 URL
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// 使用模拟数据，不调用 PageSpeed Insights
    #[arg(long)]
    pub demo: bool,

    /// 仅本次运行使用的 API Key（不保存）
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// 批次结束后不导出 Excel
    #[arg(long)]
    pub no_export: bool,

    /// Excel 导出目录（覆盖配置）
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeyAction {
    /// 保存 API Key
    Set { key: String },
    /// 删除已保存的 API Key
    Clear,
    /// 查看 API Key 是否已配置
    Status,
}
