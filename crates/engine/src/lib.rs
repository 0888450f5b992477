pub mod aggregate;
pub mod combiner;
pub mod indicator;
pub mod score;
pub mod window;

use tracing::debug;
use vigil_core::common::Entity;
use vigil_core::market::entity::RawObservation;
use vigil_core::score::entity::{ScoredObservation, ScoredSeries, ScoringMode};
use vigil_core::score::error::ComputationError;

/// # Summary
/// 单实体的完整评分流水线：指标 → 逐点评分 → 聚合。
///
/// # Arguments
/// * `entity` - 目标实体。
/// * `rows` - 数据源返回的原始序列。
/// * `mode` - 本次运行的评分策略。
///
/// # Returns
/// 成功返回 `ScoredSeries`，原始序列为空或含非法数值时返回 `ComputationError`。
pub fn evaluate(
    entity: Entity,
    rows: &[RawObservation],
    mode: ScoringMode,
) -> Result<ScoredSeries, ComputationError> {
    let indicators = indicator::compute_indicators(&entity.ticker, rows)?;
    let observations = indicators
        .into_iter()
        .map(|indicators| ScoredObservation {
            trust_score: score::trust_score(&indicators, mode),
            indicators,
        })
        .collect::<Vec<_>>();
    debug!(
        "Scored {} observations for {} in {} mode",
        observations.len(),
        entity.ticker,
        mode
    );
    Ok(aggregate::aggregate(entity, observations))
}
