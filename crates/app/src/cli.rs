use clap::Parser;
use std::path::PathBuf;

/// 命令行参数。所有参数均为可选，未给出时沿用配置文件与环境变量中的值。
#[derive(Parser, Debug, Default)]
#[command(name = "vigil")]
#[command(version, about = "Vendor trust monitor: scores market-data stability per vendor", long_about = None)]
pub struct Cli {
    /// 配置文件路径 (默认读取 config/default.toml，不存在时忽略)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 回看周期 (1d, 5d, 7d, 14d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd)
    #[arg(short, long)]
    pub period: Option<String>,

    /// 采样间隔 (1m, 2m, 5m, 15m, 30m, 60m, 1h, 90m, 1d, 5d, 1wk, 1mo, 3mo)
    #[arg(short, long)]
    pub interval: Option<String>,

    /// 产物输出目录
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// 评分策略 (continuous, threshold)
    #[arg(short, long)]
    pub scoring: Option<String>,
}
