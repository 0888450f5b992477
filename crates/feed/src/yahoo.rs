use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use vigil_core::common::time::TimeProvider;
use vigil_core::common::{Interval, Period};
use vigil_core::market::entity::RawObservation;
use vigil_core::market::error::MarketError;
use vigil_core::market::port::MarketDataProvider;

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// # Summary
/// Yahoo Finance 历史行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，不做任何重试。
/// - 需要按天数换算区间的周期，以注入的时钟为准。
#[derive(Clone)]
pub struct YahooProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 时钟，用于计算 7d / 14d 的起止时间
    clock: Arc<dyn TimeProvider>,
}

impl YahooProvider {
    /// # Summary
    /// 创建一个新的 YahooProvider 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 设置浏览器 User-Agent 以减少被拦截风险。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `clock` - 时间供给器。
    ///
    /// # Returns
    /// 初始化后的 YahooProvider；客户端构建失败时返回 `MarketError::Network`。
    pub fn new(clock: Arc<dyn TimeProvider>) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self { client, clock })
    }
}

/// # Summary
/// 生成请求参数。
///
/// # Logic
/// 1. 原生 range 直接透传。
/// 2. 7d / 14d 不是原生 range，换算成截止到 `now` 的 period1 / period2 秒级时间戳。
fn request_params(
    period: Period,
    interval: Interval,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("interval", interval.to_string()),
        ("includePrePost", "false".to_string()),
    ];
    match period.fixed_days() {
        Some(days) => {
            let start = now - ChronoDuration::days(days);
            params.push(("period1", start.timestamp().to_string()));
            params.push(("period2", now.timestamp().to_string()));
        }
        None => params.push(("range", period.to_string())),
    }
    params
}

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

/// Yahoo API 错误详情。
#[derive(Deserialize, Debug)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

/// Yahoo API 单个时间序列结果。无数据时 `timestamp` 字段整体缺失。
#[derive(Deserialize, Debug)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

/// # Summary
/// Yahoo API 原始报价数据，每个字段与 `timestamp` 按下标对齐。
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

impl YahooError {
    fn into_market_error(self, ticker: &str) -> MarketError {
        let description = self.description.unwrap_or_else(|| "unknown".to_string());
        match self.code.as_deref() {
            Some("Not Found") => MarketError::NotFound(format!("{}: {}", ticker, description)),
            _ => MarketError::Unknown(description),
        }
    }
}

/// # Summary
/// 将 chart 接口的 JSON 响应解码为原始观测序列。
///
/// # Logic
/// 1. 接口层错误对象优先：`Not Found` 映射为 `NotFound`，其余为 `Unknown`。
/// 2. 丢弃 OHLCV 任一分量缺失的行。
/// 3. 按时间升序返回；结果为空时返回 `NotFound`。
///
/// # Arguments
/// * `ticker` - 交易代码，仅用于错误信息。
/// * `body` - 响应正文。
pub fn parse_chart(ticker: &str, body: &str) -> Result<Vec<RawObservation>, MarketError> {
    let json: YahooResponse =
        serde_json::from_str(body).map_err(|e| MarketError::Parse(e.to_string()))?;

    if let Some(err) = json.chart.error {
        return Err(err.into_market_error(ticker));
    }

    let result = json
        .chart
        .result
        .and_then(|mut results| results.pop())
        .ok_or_else(|| MarketError::NotFound(ticker.to_string()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| MarketError::Parse("No quote data".into()))?;

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |values: &Vec<Option<f64>>| values.get(i).copied().flatten();
        if let (Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            DateTime::from_timestamp(ts, 0),
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) {
            rows.push(RawObservation {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }
    }

    if rows.is_empty() {
        return Err(MarketError::NotFound(format!("{}: no complete rows", ticker)));
    }
    rows.sort_by_key(|r| r.timestamp);
    Ok(rows)
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    /// # Summary
    /// 从 Yahoo Finance 抓取历史 K 线。
    ///
    /// # Logic
    /// 1. 构建包含 range（或 period1/period2）与 interval 的请求。
    /// 2. 非 2xx 响应若携带接口错误对象则按其映射，否则视为网络错误。
    /// 3. 解析正文并返回有序序列。
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<RawObservation>, MarketError> {
        let url = format!("{}/{}", CHART_ENDPOINT, ticker);
        let params = request_params(period, interval, self.clock.now());
        debug!("Requesting {} with {:?}", url, params);

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !status.is_success() {
            return match parse_chart(ticker, &body) {
                Err(MarketError::Parse(_)) | Ok(_) => {
                    Err(MarketError::Network(format!("HTTP {}", status)))
                }
                Err(api_error) => Err(api_error),
            };
        }

        parse_chart(ticker, &body)
    }
}
