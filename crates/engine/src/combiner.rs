use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;
use vigil_core::common::{Granularity, Period};
use vigil_core::score::entity::{
    ComparisonLine, ComparisonPoint, ComparisonSeries, SCORE_MAX, SCORE_MIN, ScoredSeries,
    TimeBucket,
};

/// # Summary
/// 将多个实体的评分序列合并为一个对比视图。
///
/// # Logic
/// 1. 由回看周期决定粒度：短周期逐点透传，长周期按自然月取均值。
/// 2. 每个实体一条折线，保持输入顺序；聚合记录不参与任何分桶。
/// 3. 某实体在某个桶内没有点时直接缺省，不插值、不补零。
///
/// # Arguments
/// * `series` - 处理成功的实体序列，按配置顺序。
/// * `period` - 本次运行的回看周期。
///
/// # Returns
/// 纵轴固定为 [0, 10] 的 `ComparisonSeries`。
pub fn combine(series: &[ScoredSeries], period: Period) -> ComparisonSeries {
    let granularity = period.granularity();
    let lines = series
        .iter()
        .map(|s| ComparisonLine {
            ticker: s.entity.ticker.clone(),
            points: match granularity {
                Granularity::PerObservation => per_observation(s),
                Granularity::Monthly => monthly(s),
            },
        })
        .collect::<Vec<_>>();

    debug!(
        "Combined {} series at {:?} granularity for period {}",
        lines.len(),
        granularity,
        period
    );

    ComparisonSeries {
        granularity,
        y_domain: (SCORE_MIN, SCORE_MAX),
        lines,
    }
}

fn per_observation(series: &ScoredSeries) -> Vec<ComparisonPoint> {
    series
        .observations
        .iter()
        .map(|o| ComparisonPoint {
            bucket: TimeBucket::Instant(o.timestamp()),
            score: o.trust_score,
        })
        .collect()
}

fn monthly(series: &ScoredSeries) -> Vec<ComparisonPoint> {
    let mut buckets: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for o in &series.observations {
        if !o.trust_score.is_finite() {
            continue;
        }
        let entry = buckets
            .entry(month_end(o.timestamp().date_naive()))
            .or_insert((0.0, 0));
        entry.0 += o.trust_score;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(month, (sum, n))| ComparisonPoint {
            bucket: TimeBucket::MonthEnd(month),
            score: sum / f64::from(n),
        })
        .collect()
}

/// # Summary
/// 返回所在自然月的最后一天，作为月度桶的标签。
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(month_end(date(2024, 12, 31)), date(2024, 12, 31));
        assert_eq!(month_end(date(2024, 4, 30)), date(2024, 4, 30));
    }

    #[test]
    fn test_no_series_gives_empty_comparison() {
        let comparison = combine(&[], Period::Year1);
        assert!(comparison.is_empty());
        assert_eq!(comparison.granularity, Granularity::Monthly);
        assert_eq!(comparison.y_domain, (0.0, 10.0));
    }
}
