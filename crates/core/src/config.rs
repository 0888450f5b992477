use crate::common::{Entity, Interval, Period};
use crate::score::entity::ScoringMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// # Summary
/// 配置校验错误。运行开始前抛出，属于致命错误。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid period '{value}'. Allowed values are: {allowed}")]
    InvalidPeriod { value: String, allowed: String },
    #[error("Invalid interval '{value}'. Allowed values are: {allowed}")]
    InvalidInterval { value: String, allowed: String },
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),
}

/// 全局应用配置（未校验的原始形态，直接来自配置源）
///
/// 任意层级缺失的字段回落到默认值，因此配置文件只需写出要覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub output: OutputConfig,
    pub entities: Vec<EntityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            output: OutputConfig::default(),
            entities: default_entities(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub period: String,
    pub interval: String,
    pub scoring: ScoringMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            period: "1y".to_string(),
            interval: "1d".to_string(),
            scoring: ScoringMode::Continuous,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub log_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub ticker: String,
    pub name: String,
}

/// 默认监控的五家云厂商。
fn default_entities() -> Vec<EntityConfig> {
    [
        ("MSFT", "Microsoft"),
        ("IBM", "IBM"),
        ("ORCL", "Oracle"),
        ("NVDA", "NVIDIA"),
        ("GOOG", "Google Cloud"),
    ]
    .into_iter()
    .map(|(ticker, name)| EntityConfig {
        ticker: ticker.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// # Summary
/// 单次运行的显式配置对象，构造一次后传递给所有组件。
///
/// # Invariants
/// - `period` / `interval` 已经过枚举校验。
/// - `entities` 中的 ticker 非空且互不重复，顺序即处理顺序。
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub period: Period,
    pub interval: Interval,
    pub scoring: ScoringMode,
    pub entities: Vec<Entity>,
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// # Summary
    /// 校验原始配置并生成 `RunConfig`。
    ///
    /// # Logic
    /// 1. 将 period / interval 字符串解析为枚举，失败时列出全部合法取值。
    /// 2. 拒绝空白或重复的 ticker。
    ///
    /// # Returns
    /// 成功返回 `RunConfig`，失败返回描述具体非法值的 `ConfigError`。
    pub fn validate(&self) -> Result<RunConfig, ConfigError> {
        let period: Period =
            self.monitor
                .period
                .parse()
                .map_err(|_| ConfigError::InvalidPeriod {
                    value: self.monitor.period.clone(),
                    allowed: join_tokens(Period::ALL.iter().map(Period::as_str)),
                })?;

        let interval: Interval =
            self.monitor
                .interval
                .parse()
                .map_err(|_| ConfigError::InvalidInterval {
                    value: self.monitor.interval.clone(),
                    allowed: join_tokens(Interval::ALL.iter().map(Interval::as_str)),
                })?;

        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(self.entities.len());
        for cfg in &self.entities {
            let ticker = cfg.ticker.trim();
            if ticker.is_empty() {
                return Err(ConfigError::InvalidEntity(format!(
                    "blank ticker for '{}'",
                    cfg.name
                )));
            }
            if let Some(bad) = ticker.chars().find(|c| !is_symbol_char(*c)) {
                return Err(ConfigError::InvalidEntity(format!(
                    "ticker '{}' contains unsupported character '{}'",
                    ticker, bad
                )));
            }
            if !seen.insert(ticker.to_string()) {
                return Err(ConfigError::InvalidEntity(format!(
                    "duplicate ticker '{}'",
                    ticker
                )));
            }
            entities.push(Entity::new(ticker, cfg.name.trim()));
        }

        Ok(RunConfig {
            period,
            interval,
            scoring: self.monitor.scoring,
            entities,
            output_dir: PathBuf::from(&self.output.dir),
        })
    }
}

/// 交易代码允许的字符：字母、数字以及 `.` `^` `=` `-`。
/// ticker 会拼入文件名与请求路径，不允许出现路径分隔符。
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(", ")
}
