use vigil_core::score::entity::{IndicatorObservation, SCORE_MAX, SCORE_MIN, ScoringMode};

/// 波动率惩罚上限。
const MAX_VOLATILITY_PENALTY: f64 = 3.0;
/// 涨跌幅惩罚上限。
const MAX_CHANGE_PENALTY: f64 = 2.0;
/// 连续下跌的固定惩罚。
const DROPS_PENALTY: f64 = 2.0;
/// 放量的惩罚 / 奖励幅度。
const SPIKE_WEIGHT: f64 = 1.0;
/// 触发连续下跌惩罚的最少下跌次数。
const DROPS_TRIGGER: u8 = 3;

/// # Summary
/// 计算单个观测点的信任分。
///
/// # Invariants
/// - 纯函数：相同输入（包括缺失字段的组合）总是得到相同输出。
/// - 结果恒在 [0, 10]，缺失字段视为零贡献，结果永不缺失。
pub fn trust_score(obs: &IndicatorObservation, mode: ScoringMode) -> f64 {
    match mode {
        ScoringMode::Continuous => continuous_score(obs),
        ScoringMode::Threshold => threshold_score(obs),
    }
}

/// # Summary
/// 连续惩罚策略。
///
/// # Logic
/// 1. 波动率惩罚 = min(stddev / 2, 3)。
/// 2. 涨跌幅惩罚 = min(|change| / 2, 2)。
/// 3. 放量时按同期价格方向区分：上涨为奖励，否则为惩罚。
/// 4. 尾随窗口内 3 次下跌固定扣 2 分。
/// 5. 截断到 [0, 10]。
fn continuous_score(obs: &IndicatorObservation) -> f64 {
    let change = obs.percent_change.unwrap_or(0.0);

    let vol_penalty = obs
        .close_stddev_3
        .map_or(0.0, |sd| (sd / 2.0).min(MAX_VOLATILITY_PENALTY));
    let change_penalty = (change.abs() / 2.0).min(MAX_CHANGE_PENALTY);
    let (spike_penalty, spike_bonus) = match (obs.volume_spike, change > 0.0) {
        (true, true) => (0.0, SPIKE_WEIGHT),
        (true, false) => (SPIKE_WEIGHT, 0.0),
        (false, _) => (0.0, 0.0),
    };
    let drops_penalty = drops_penalty(obs);

    let score =
        SCORE_MAX - (vol_penalty + change_penalty + spike_penalty + drops_penalty) + spike_bonus;
    clamp_score(score)
}

/// 旧版阶梯扣分策略。
fn threshold_score(obs: &IndicatorObservation) -> f64 {
    let mut score = SCORE_MAX;
    if obs.percent_change.is_some_and(|c| c.abs() > 1.0) {
        score -= 1.0;
    }
    if obs.close_stddev_3.is_some_and(|sd| sd > 3.0) {
        score -= 2.0;
    }
    if obs.volume_spike {
        score -= 1.0;
    }
    score -= drops_penalty(obs);
    clamp_score(score)
}

fn drops_penalty(obs: &IndicatorObservation) -> f64 {
    if obs.consecutive_drops.is_some_and(|n| n >= DROPS_TRIGGER) {
        DROPS_PENALTY
    } else {
        0.0
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return SCORE_MIN;
    }
    score.clamp(SCORE_MIN, SCORE_MAX)
}
