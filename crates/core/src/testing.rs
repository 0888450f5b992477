//! 供各 crate 测试使用的内存端口实现。

use crate::chart::entity::{ChartImage, ImageFormat};
use crate::chart::error::ChartError;
use crate::chart::port::ChartRenderer;
use crate::common::{Entity, Granularity, Interval, Period};
use crate::market::entity::RawObservation;
use crate::market::error::MarketError;
use crate::market::port::MarketDataProvider;
use crate::score::entity::{ComparisonSeries, ScoredSeries};
use crate::store::error::StoreError;
use crate::store::port::ArtifactStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// # Summary
/// 按 ticker 返回预置数据的行情源。未登记的 ticker 返回 `NotFound`。
#[derive(Default)]
pub struct StaticProvider {
    series: DashMap<String, Vec<RawObservation>>,
    failures: DashMap<String, String>,
    requests: Mutex<Vec<(String, Period, Interval)>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记某个 ticker 的返回序列。
    pub fn with_series(self, ticker: &str, rows: Vec<RawObservation>) -> Self {
        self.series.insert(ticker.to_string(), rows);
        self
    }

    /// 令某个 ticker 的请求以网络错误失败。
    pub fn with_failure(self, ticker: &str, message: &str) -> Self {
        self.failures.insert(ticker.to_string(), message.to_string());
        self
    }

    /// 已收到的请求，按调用顺序。
    pub fn requests(&self) -> Vec<(String, Period, Interval)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<RawObservation>, MarketError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((ticker.to_string(), period, interval));
        }
        if let Some(message) = self.failures.get(ticker) {
            return Err(MarketError::Network(message.clone()));
        }
        self.series
            .get(ticker)
            .map(|rows| rows.clone())
            .ok_or_else(|| MarketError::NotFound(ticker.to_string()))
    }
}

/// # Summary
/// 只记录写入内容、不落盘的产物存储。
#[derive(Default)]
pub struct MemoryArtifactStore {
    // Key 为虚拟文件名
    pub files: DashMap<String, Vec<u8>>,
    failing_tickers: HashSet<String>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 对指定 ticker 的所有写入返回 I/O 错误。
    pub fn failing_for(mut self, ticker: &str) -> Self {
        self.failing_tickers.insert(ticker.to_string());
        self
    }

    fn put(&self, ticker: Option<&str>, name: String, bytes: Vec<u8>) -> Result<PathBuf, StoreError> {
        if ticker.is_some_and(|t| self.failing_tickers.contains(t)) {
            return Err(StoreError::Io(format!("disk full while writing {}", name)));
        }
        self.files.insert(name.clone(), bytes);
        Ok(PathBuf::from(name))
    }

    /// 读取某个虚拟文件的文本内容。
    pub fn text(&self, name: &str) -> Option<String> {
        self.files
            .get(name)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn save_table(
        &self,
        series: &ScoredSeries,
        run_date: NaiveDate,
    ) -> Result<PathBuf, StoreError> {
        let ticker = &series.entity.ticker;
        let body = series
            .observations
            .iter()
            .map(|o| format!("{},{}", o.timestamp().to_rfc3339(), o.trust_score))
            .chain(std::iter::once(format!(
                "Aggregated,{}",
                series.aggregate.format_score()
            )))
            .collect::<Vec<_>>()
            .join("\n");
        self.put(
            Some(ticker),
            format!("{}_stock_{}.csv", ticker, run_date),
            body.into_bytes(),
        )
    }

    async fn save_summary(
        &self,
        series: &ScoredSeries,
        period: Period,
    ) -> Result<PathBuf, StoreError> {
        let ticker = &series.entity.ticker;
        let body = format!(
            "Aggregated Trust Score ({}): {}",
            period,
            series.aggregate.format_score()
        );
        self.put(
            Some(ticker),
            format!("{}_aggregated_score.txt", ticker),
            body.into_bytes(),
        )
    }

    async fn save_entity_chart(
        &self,
        entity: &Entity,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError> {
        self.put(
            Some(&entity.ticker),
            format!("{}_ts_{}.{}", entity.ticker, run_date, image.format.extension()),
            image.bytes.clone(),
        )
    }

    async fn save_comparison_chart(
        &self,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError> {
        self.put(
            None,
            format!("global_ts_{}.{}", run_date, image.format.extension()),
            image.bytes.clone(),
        )
    }
}

/// # Summary
/// 记录调用参数的渲染器，输出一段可读的占位文本。
#[derive(Default)]
pub struct StubRenderer {
    pub rendered_entities: Mutex<Vec<(String, Granularity)>>,
    pub comparisons: Mutex<Vec<ComparisonSeries>>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_comparison(&self) -> Option<ComparisonSeries> {
        self.comparisons.lock().ok().and_then(|c| c.last().cloned())
    }
}

impl ChartRenderer for StubRenderer {
    fn render_entity(
        &self,
        series: &ScoredSeries,
        granularity: Granularity,
    ) -> Result<ChartImage, ChartError> {
        if series.observations.is_empty() {
            return Err(ChartError::EmptySeries(series.entity.ticker.clone()));
        }
        if let Ok(mut rendered) = self.rendered_entities.lock() {
            rendered.push((series.entity.ticker.clone(), granularity));
        }
        Ok(ChartImage {
            format: ImageFormat::Svg,
            bytes: format!("<svg>{}</svg>", series.entity.ticker).into_bytes(),
        })
    }

    fn render_comparison(&self, comparison: &ComparisonSeries) -> Result<ChartImage, ChartError> {
        if let Ok(mut comparisons) = self.comparisons.lock() {
            comparisons.push(comparison.clone());
        }
        Ok(ChartImage {
            format: ImageFormat::Svg,
            bytes: b"<svg>global</svg>".to_vec(),
        })
    }
}

/// 构造收盘价序列，其余价格字段等于收盘价，时间按天递增。
pub fn daily_rows(start: DateTime<Utc>, closes: &[f64], volume: f64) -> Vec<RawObservation> {
    closes
        .iter()
        .zip(0_i64..)
        .map(|(&close, day)| RawObservation {
            timestamp: start + chrono::Duration::days(day),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        })
        .collect()
}
