use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单个采样区间的原始行情记录，由外部数据源产出。
///
/// # Invariants
/// - 序列内按 `timestamp` 升序，每个采样区间一条。
/// - 产出后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    // 区间开始时间
    pub timestamp: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量
    pub volume: f64,
}
