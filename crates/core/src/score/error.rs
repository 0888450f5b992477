use thiserror::Error;

/// # Summary
/// 指标与评分流水线的计算错误。
///
/// # Invariants
/// - 与数据源错误采用相同的隔离策略：只影响当前实体。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComputationError {
    /// 原始序列为空，无法生成任何观测
    #[error("Empty raw series for {0}")]
    EmptySeries(String),
    /// 原始字段出现 NaN / 无穷大
    #[error("Non-finite {field} at {timestamp}")]
    NonFinite { field: &'static str, timestamp: String },
}
