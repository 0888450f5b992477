use crate::common::{Interval, Period};
use crate::market::entity::RawObservation;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 历史行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者内部不得重试，失败直接返回给调用方。
/// - 返回的序列按时间升序。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取指定标的在回看周期内、按采样间隔的历史 OHLCV 数据。
    ///
    /// # Arguments
    /// * `ticker`: 交易代码。
    /// * `period`: 回看周期。
    /// * `interval`: 采样间隔。
    ///
    /// # Returns
    /// 成功返回有序的原始观测列表，失败返回 `MarketError`。
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<RawObservation>, MarketError>;
}
