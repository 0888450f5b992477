use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;
use vigil_core::chart::entity::ChartImage;
use vigil_core::common::{Entity, Period};
use vigil_core::score::entity::{ScoredObservation, ScoredSeries};
use vigil_core::store::error::StoreError;
use vigil_core::store::port::ArtifactStore;

/// 指标表表头，顺序即列顺序。
pub const TABLE_HEADER: [&str; 14] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "percent_change",
    "close_mean_3",
    "close_stddev_3",
    "volume_mean_3",
    "volume_spike",
    "down_trend",
    "consecutive_drops",
    "trust_score",
];

/// 聚合行在 timestamp 列中的标记。
pub const AGGREGATE_LABEL: &str = "Aggregated";

/// ArtifactStore 的文件系统实现。
///
/// # Summary
/// 所有产物平铺写入同一个输出目录。
///
/// # Invariants
/// * 输出目录在构造时创建，之后只追加或覆盖文件。
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// 创建新的 FsArtifactStore 实例。
    ///
    /// # Logic
    /// 1. 确保输出目录存在。
    ///
    /// # Arguments
    /// * `root` - 输出目录。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或错误。
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write(&self, file_name: String, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// # Summary
/// 将评分序列编码为 CSV。
///
/// # Logic
/// 1. 写入表头。
/// 2. 每个观测一行，缺失值写空单元格。
/// 3. 末尾追加聚合行：timestamp 列为 `Aggregated`，仅 trust_score 列有值（未定义时为空）。
pub fn encode_table(series: &ScoredSeries) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(TABLE_HEADER)
        .map_err(|e| StoreError::Encode(e.to_string()))?;

    for obs in &series.observations {
        writer
            .write_record(observation_record(obs))
            .map_err(|e| StoreError::Encode(e.to_string()))?;
    }

    let mut aggregate_row = vec![String::new(); TABLE_HEADER.len()];
    aggregate_row[0] = AGGREGATE_LABEL.to_string();
    aggregate_row[TABLE_HEADER.len() - 1] = optional(series.aggregate.score);
    writer
        .write_record(&aggregate_row)
        .map_err(|e| StoreError::Encode(e.to_string()))?;

    writer
        .into_inner()
        .map_err(|e| StoreError::Encode(e.to_string()))
}

fn observation_record(obs: &ScoredObservation) -> [String; 14] {
    let ind = &obs.indicators;
    [
        ind.raw.timestamp.to_rfc3339(),
        ind.raw.open.to_string(),
        ind.raw.high.to_string(),
        ind.raw.low.to_string(),
        ind.raw.close.to_string(),
        ind.raw.volume.to_string(),
        optional(ind.percent_change),
        optional(ind.close_mean_3),
        optional(ind.close_stddev_3),
        optional(ind.volume_mean_3),
        ind.volume_spike.to_string(),
        ind.down_trend.to_string(),
        ind.consecutive_drops.map(|n| n.to_string()).unwrap_or_default(),
        obs.trust_score.to_string(),
    ]
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// 聚合分文本，例如 `Aggregated Trust Score (1y): 7.85`。
pub fn summary_line(series: &ScoredSeries, period: Period) -> String {
    format!(
        "Aggregated Trust Score ({}): {}",
        period,
        series.aggregate.format_score()
    )
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    /// # Summary
    /// 写入 `{ticker}_stock_{date}.csv`。
    async fn save_table(
        &self,
        series: &ScoredSeries,
        run_date: NaiveDate,
    ) -> Result<PathBuf, StoreError> {
        let bytes = encode_table(series)?;
        self.write(
            format!("{}_stock_{}.csv", series.entity.ticker, run_date),
            &bytes,
        )
        .await
    }

    /// # Summary
    /// 写入 `{ticker}_aggregated_score.txt`，同一实体每次运行覆盖。
    async fn save_summary(
        &self,
        series: &ScoredSeries,
        period: Period,
    ) -> Result<PathBuf, StoreError> {
        self.write(
            format!("{}_aggregated_score.txt", series.entity.ticker),
            summary_line(series, period).as_bytes(),
        )
        .await
    }

    async fn save_entity_chart(
        &self,
        entity: &Entity,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError> {
        self.write(
            format!(
                "{}_ts_{}.{}",
                entity.ticker,
                run_date,
                image.format.extension()
            ),
            &image.bytes,
        )
        .await
    }

    async fn save_comparison_chart(
        &self,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError> {
        self.write(
            format!("global_ts_{}.{}", run_date, image.format.extension()),
            &image.bytes,
        )
        .await
    }
}
