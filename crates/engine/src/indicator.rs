use crate::window::TrailingWindow;
use vigil_core::market::entity::RawObservation;
use vigil_core::score::entity::IndicatorObservation;
use vigil_core::score::error::ComputationError;

/// 尾随窗口大小：当前观测加上其前两个观测。
pub const WINDOW: usize = 3;

/// 成交量超过尾随均值的该倍数即视为异常放量。
pub const VOLUME_SPIKE_FACTOR: f64 = 2.0;

/// # Summary
/// 由原始行情序列计算滚动指标。
///
/// # Logic
/// 1. 逐行校验 close / volume 为有限值。
/// 2. 用三个尾随窗口分别维护收盘价、成交量和下跌标记。
/// 3. 统计量基于未取整的原始值计算；窗口未满时对应字段为 None。
/// 4. 输出字段（含原始 OHLCV）统一四舍五入到 2 位小数。
///
/// # Arguments
/// * `ticker` - 所属实体，仅用于错误信息。
/// * `rows` - 按时间升序的原始观测。
///
/// # Returns
/// 与输入等长、同序的指标序列；输入为空时返回 `ComputationError::EmptySeries`。
pub fn compute_indicators(
    ticker: &str,
    rows: &[RawObservation],
) -> Result<Vec<IndicatorObservation>, ComputationError> {
    if rows.is_empty() {
        return Err(ComputationError::EmptySeries(ticker.to_string()));
    }

    let mut closes = TrailingWindow::new(WINDOW);
    let mut volumes = TrailingWindow::new(WINDOW);
    let mut trends = TrailingWindow::new(WINDOW);
    let mut prev_close: Option<f64> = None;
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        ensure_finite(row)?;
        closes.push(row.close);
        volumes.push(row.volume);

        let percent_change = prev_close.and_then(|prev| percent_change(prev, row.close));
        // 首行没有前值，约定为 false
        let down_trend = prev_close.is_some_and(|prev| row.close < prev);
        trends.push(down_trend);

        let close_window = closes.full_values();
        let close_mean_3 = close_window.as_deref().map(mean);
        let close_stddev_3 = close_window.as_deref().and_then(sample_stddev);
        let volume_mean_3 = volumes.full_values().as_deref().map(mean);
        let volume_spike = volume_mean_3.is_some_and(|m| row.volume > VOLUME_SPIKE_FACTOR * m);
        let consecutive_drops = trends
            .full_values()
            .map(|window| window.into_iter().fold(0_u8, |n, down| n + u8::from(down)));

        out.push(IndicatorObservation {
            raw: rounded(row),
            percent_change: percent_change.map(round2),
            close_mean_3: close_mean_3.map(round2),
            close_stddev_3: close_stddev_3.map(round2),
            volume_mean_3: volume_mean_3.map(round2),
            volume_spike,
            down_trend,
            consecutive_drops,
        });
        prev_close = Some(row.close);
    }

    Ok(out)
}

/// 四舍五入到 2 位小数（远离零方向）。
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 输出用的原始行：OHLCV 同样取 2 位小数，时间戳不变。
fn rounded(row: &RawObservation) -> RawObservation {
    RawObservation {
        timestamp: row.timestamp,
        open: round2(row.open),
        high: round2(row.high),
        low: round2(row.low),
        close: round2(row.close),
        volume: round2(row.volume),
    }
}

/// 前收盘价为 0 时涨跌幅无意义，视为缺失。
fn percent_change(prev: f64, close: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    let change = (close / prev - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / count(values.len())
}

/// 样本标准差（分母 n-1），少于 2 个值时缺失。
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / count(values.len() - 1)).sqrt())
}

fn count(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

fn ensure_finite(row: &RawObservation) -> Result<(), ComputationError> {
    for (field, value) in [("close", row.close), ("volume", row.volume)] {
        if !value.is_finite() {
            return Err(ComputationError::NonFinite {
                field,
                timestamp: row.timestamp.to_rfc3339(),
            });
        }
    }
    Ok(())
}
