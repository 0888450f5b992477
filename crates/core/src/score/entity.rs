use crate::common::{Entity, Granularity};
use crate::market::entity::RawObservation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 信任分的下界。
pub const SCORE_MIN: f64 = 0.0;
/// 信任分的上界。
pub const SCORE_MAX: f64 = 10.0;
/// 聚合分 >= 该值判定为 RELIABLE。
pub const RELIABLE_THRESHOLD: f64 = 8.0;
/// 聚合分 >= 该值（且低于 RELIABLE 阈值）判定为 WARNING。
pub const WARNING_THRESHOLD: f64 = 5.0;

/// # Summary
/// 评分策略。
///
/// # Invariants
/// - 每次运行只选择一种策略，两种策略的输出都落在 [0, 10]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    // 连续惩罚 / 奖励并截断到边界
    #[default]
    Continuous,
    // 旧版阶梯扣分
    Threshold,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Continuous => f.write_str("continuous"),
            ScoringMode::Threshold => f.write_str("threshold"),
        }
    }
}

/// # Summary
/// 原始观测加上滚动窗口派生指标。
///
/// # Invariants
/// - `None` 表示窗口不足导致的“缺失”，绝不以默认数值代替。
/// - 数值字段均已四舍五入到 2 位小数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorObservation {
    pub raw: RawObservation,
    // 相对上一收盘价的涨跌幅 (%)，首行缺失
    pub percent_change: Option<f64>,
    // 尾随 3 期收盘价均值
    pub close_mean_3: Option<f64>,
    // 尾随 3 期收盘价样本标准差
    pub close_stddev_3: Option<f64>,
    // 尾随 3 期成交量均值
    pub volume_mean_3: Option<f64>,
    // 成交量 > 2 倍尾随均值；均值缺失时为 false
    pub volume_spike: bool,
    // 收盘价低于上一收盘价；首行为 false
    pub down_trend: bool,
    // 尾随 3 期内 down_trend 为 true 的次数
    pub consecutive_drops: Option<u8>,
}

/// 带信任分的观测点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredObservation {
    pub indicators: IndicatorObservation,
    // 信任分，取值 [0, 10]，越高风险越低
    pub trust_score: f64,
}

impl ScoredObservation {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.indicators.raw.timestamp
    }
}

/// # Summary
/// 三级定性状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustStatus {
    Reliable,
    Warning,
    AtRisk,
}

impl TrustStatus {
    /// # Summary
    /// 将聚合分映射为定性状态。
    ///
    /// # Logic
    /// 1. `>= 8` 为 RELIABLE，`[5, 8)` 为 WARNING。
    /// 2. 低于 5 或聚合分未定义均为 AT RISK。
    pub fn classify(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= RELIABLE_THRESHOLD => TrustStatus::Reliable,
            Some(s) if s >= WARNING_THRESHOLD => TrustStatus::Warning,
            _ => TrustStatus::AtRisk,
        }
    }
}

impl fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustStatus::Reliable => f.write_str("RELIABLE"),
            TrustStatus::Warning => f.write_str("WARNING"),
            TrustStatus::AtRisk => f.write_str("AT RISK"),
        }
    }
}

/// # Summary
/// 实体整段序列的汇总记录。
///
/// # Invariants
/// - 不是真实观测点，没有时间戳，不参与任何滚动计算或时间分桶。
/// - 未定义时为 `None`，不会被强制转换为数值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub score: Option<f64>,
    pub status: TrustStatus,
}

impl Aggregate {
    pub fn new(score: Option<f64>) -> Self {
        Self {
            score,
            status: TrustStatus::classify(score),
        }
    }

    /// 两位小数的展示形式，未定义时为 `undefined`。
    pub fn format_score(&self) -> String {
        match self.score {
            Some(score) => format!("{:.2}", score),
            None => "undefined".to_string(),
        }
    }
}

/// # Summary
/// 单个实体的完整评分序列。
///
/// # Invariants
/// - `observations` 只包含真实观测，按时间升序。
/// - `aggregate` 作为独立字段挂在序列上，而不是序列元素。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSeries {
    pub entity: Entity,
    pub observations: Vec<ScoredObservation>,
    pub aggregate: Aggregate,
}

/// # Summary
/// 对比视图的时间桶。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    // 原始观测时间（细粒度）
    Instant(DateTime<Utc>),
    // 自然月，以当月最后一天作为标签（粗粒度）
    MonthEnd(NaiveDate),
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Instant(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M")),
            TimeBucket::MonthEnd(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub bucket: TimeBucket,
    pub score: f64,
}

/// 对比图中一个实体对应的折线。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonLine {
    pub ticker: String,
    pub points: Vec<ComparisonPoint>,
}

/// # Summary
/// 多实体对比序列，交给渲染端使用。
///
/// # Invariants
/// - `lines` 保持配置中的实体顺序，每条折线的点按时间桶升序。
/// - `y_domain` 固定为 [0, 10]，与实际分数范围无关。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    pub granularity: Granularity,
    pub y_domain: (f64, f64),
    pub lines: Vec<ComparisonLine>,
}

impl ComparisonSeries {
    /// (时间桶, 实体, 平均信任分) 三元组的扁平视图。
    pub fn triples(&self) -> impl Iterator<Item = (TimeBucket, &str, f64)> + '_ {
        self.lines.iter().flat_map(|line| {
            line.points
                .iter()
                .map(move |p| (p.bucket, line.ticker.as_str(), p.score))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.points.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        assert_eq!(TrustStatus::classify(Some(8.0)), TrustStatus::Reliable);
        assert_eq!(TrustStatus::classify(Some(7.999)), TrustStatus::Warning);
        assert_eq!(TrustStatus::classify(Some(5.0)), TrustStatus::Warning);
        assert_eq!(TrustStatus::classify(Some(4.999)), TrustStatus::AtRisk);
        assert_eq!(TrustStatus::classify(None), TrustStatus::AtRisk);
    }

    #[test]
    fn test_aggregate_format() {
        assert_eq!(Aggregate::new(Some(7.846)).format_score(), "7.85");
        assert_eq!(Aggregate::new(None).format_score(), "undefined");
        assert_eq!(Aggregate::new(None).status.to_string(), "AT RISK");
    }

    #[test]
    fn test_scoring_mode_serde() {
        let mode: ScoringMode = serde_json::from_str("\"threshold\"").unwrap();
        assert_eq!(mode, ScoringMode::Threshold);
        assert_eq!(ScoringMode::default(), ScoringMode::Continuous);
    }
}
