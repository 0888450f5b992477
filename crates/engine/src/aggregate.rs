use vigil_core::common::Entity;
use vigil_core::score::entity::{Aggregate, ScoredObservation, ScoredSeries};

/// # Summary
/// 将逐点评分归约为实体级聚合记录，并挂到序列上。
///
/// # Logic
/// 1. 对所有有限的信任分取算术平均。
/// 2. 没有任何可用分数时聚合分为 None，状态为 AT RISK。
///
/// # Arguments
/// * `entity` - 所属实体。
/// * `observations` - 按时间升序的评分观测。
///
/// # Returns
/// 带 `aggregate` 字段的 `ScoredSeries`。
pub fn aggregate(entity: Entity, observations: Vec<ScoredObservation>) -> ScoredSeries {
    let score = mean_score(&observations);
    ScoredSeries {
        entity,
        observations,
        aggregate: Aggregate::new(score),
    }
}

/// 有限信任分的平均值；没有可用分数时为 None。
pub fn mean_score(observations: &[ScoredObservation]) -> Option<f64> {
    let (sum, n) = observations
        .iter()
        .map(|o| o.trust_score)
        .filter(|s| s.is_finite())
        .fold((0.0, 0_u32), |(sum, n), s| (sum + s, n + 1));
    (n > 0).then(|| sum / f64::from(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vigil_core::score::entity::{IndicatorObservation, TrustStatus};
    use vigil_core::testing::daily_rows;

    fn scored(scores: &[f64]) -> Vec<ScoredObservation> {
        let closes = vec![1.0; scores.len()];
        daily_rows(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), &closes, 1.0)
            .into_iter()
            .zip(scores)
            .map(|(raw, &trust_score)| ScoredObservation {
                indicators: IndicatorObservation {
                    raw,
                    percent_change: None,
                    close_mean_3: None,
                    close_stddev_3: None,
                    volume_mean_3: None,
                    volume_spike: false,
                    down_trend: false,
                    consecutive_drops: None,
                },
                trust_score,
            })
            .collect()
    }

    #[test]
    fn test_aggregate_is_mean_of_scores() {
        let series = aggregate(Entity::new("MSFT", "Microsoft"), scored(&[10.0, 8.0, 6.9]));
        let score = series.aggregate.score.unwrap();
        assert!((score - 8.3).abs() < 1e-9);
        assert_eq!(series.aggregate.status, TrustStatus::Reliable);
        assert_eq!(series.observations.len(), 3);
    }

    #[test]
    fn test_undefined_scores_are_skipped() {
        let series = aggregate(Entity::new("IBM", "IBM"), scored(&[f64::NAN, 6.0, 4.0]));
        assert_eq!(series.aggregate.score, Some(5.0));
        assert_eq!(series.aggregate.status, TrustStatus::Warning);
    }

    #[test]
    fn test_no_defined_scores_is_undefined_at_risk() {
        let series = aggregate(Entity::new("ORCL", "Oracle"), Vec::new());
        assert_eq!(series.aggregate.score, None);
        assert_eq!(series.aggregate.status, TrustStatus::AtRisk);

        let series = aggregate(Entity::new("ORCL", "Oracle"), scored(&[f64::NAN]));
        assert_eq!(series.aggregate.score, None);
    }
}
