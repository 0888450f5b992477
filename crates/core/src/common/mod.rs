pub mod time;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Summary
/// 受监控的实体（供应商 / 交易对手），由交易代码与展示名称组成。
///
/// # Invariants
/// - `ticker` 在一次运行的配置中唯一，且不为空。
/// - 运行期间不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    // 交易代码 (例如: MSFT, IBM)
    pub ticker: String,
    // 展示名称 (例如: Microsoft)
    pub name: String,
}

impl Entity {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}

/// # Summary
/// 对比视图的时间粒度。
///
/// # Invariants
/// - 只由 `Period::granularity` 决定，不存在第二套分类规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    // 逐观测点（短周期）
    PerObservation,
    // 按自然月聚合（长周期）
    Monthly,
}

/// # Summary
/// 回看周期，严格限定在数据源允许的枚举取值内。
///
/// # Invariants
/// - `FromStr` 与 `Display` 互逆，字符串区分大小写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day1,
    Day5,
    Day7,
    Day14,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    YearToDate,
}

impl Period {
    /// 全部合法取值，按配置文档中的顺序排列。
    pub const ALL: [Period; 12] = [
        Period::Day1,
        Period::Day5,
        Period::Day7,
        Period::Day14,
        Period::Month1,
        Period::Month3,
        Period::Month6,
        Period::Year1,
        Period::Year2,
        Period::Year5,
        Period::Year10,
        Period::YearToDate,
    ];

    /// 返回该周期对应的配置字符串。
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Day7 => "7d",
            Period::Day14 => "14d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::YearToDate => "ytd",
        }
    }

    /// # Summary
    /// 判定对比图应使用的时间粒度。
    ///
    /// # Logic
    /// 1. 长周期集合固定为 `{3mo, 6mo, 1y, 2y, 5y, 10y, ytd}`，按月聚合。
    /// 2. 其余取值 (`1d, 5d, 7d, 14d, 1mo`) 逐点展示。
    ///
    /// # Returns
    /// 返回 `Granularity`。
    pub fn granularity(&self) -> Granularity {
        match self {
            Period::Month3
            | Period::Month6
            | Period::Year1
            | Period::Year2
            | Period::Year5
            | Period::Year10
            | Period::YearToDate => Granularity::Monthly,
            Period::Day1 | Period::Day5 | Period::Day7 | Period::Day14 | Period::Month1 => {
                Granularity::PerObservation
            }
        }
    }

    /// 数据源不接受为原生 range 的周期，需要以显式天数换算起止时间。
    pub fn fixed_days(&self) -> Option<i64> {
        match self {
            Period::Day7 => Some(7),
            Period::Day14 => Some(14),
            _ => None,
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown Period: {}", s))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Summary
/// 采样间隔，严格限定在数据源允许的枚举取值内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    Minute1,
    Minute2,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Hour1,
    Minute90,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::Minute1,
        Interval::Minute2,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Minute60,
        Interval::Hour1,
        Interval::Minute90,
        Interval::Day1,
        Interval::Day5,
        Interval::Week1,
        Interval::Month1,
        Interval::Month3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute2 => "2m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Minute60 => "60m",
            Interval::Hour1 => "1h",
            Interval::Minute90 => "90m",
            Interval::Day1 => "1d",
            Interval::Day5 => "5d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
            Interval::Month3 => "3mo",
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| format!("Unknown Interval: {}", s))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
