use crate::cli::Cli;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;
use vigil_core::config::AppConfig;

/// 未指定 `--config` 时尝试读取的配置文件。
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// # Summary
/// 按层级合并配置来源，得到未校验的 `AppConfig`。
///
/// # Logic
/// 1. 内建默认值（缺失字段由 `AppConfig` 的 serde 默认值补齐）。
/// 2. TOML 配置文件：显式指定时必须存在，默认路径不存在时跳过。
/// 3. `VIGIL__` 前缀的环境变量，层级分隔符为 `__`。
/// 4. 命令行参数。
///
/// # Arguments
/// * `cli` - 已解析的命令行参数。
/// * `environment` - 环境变量来源，测试中可替换为固定映射。
pub fn load(cli: &Cli, environment: Environment) -> Result<AppConfig, ConfigError> {
    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    Config::builder()
        .add_source(File::from(path.as_path()).required(required))
        .add_source(environment)
        .set_override_option("monitor.period", cli.period.clone())?
        .set_override_option("monitor.interval", cli.interval.clone())?
        .set_override_option("monitor.scoring", cli.scoring.clone())?
        .set_override_option("output.dir", cli.output_dir.clone())?
        .build()?
        .try_deserialize()
}

/// 进程环境变量来源。
pub fn process_environment() -> Environment {
    Environment::with_prefix("VIGIL")
        .prefix_separator("__")
        .separator("__")
}
