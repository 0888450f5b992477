use crate::chart::entity::ChartImage;
use crate::common::{Entity, Period};
use crate::score::entity::ScoredSeries;
use crate::store::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

/// # Summary
/// 运行产物的持久化接口。
///
/// # Invariants
/// - 每个方法返回写入位置，供运行报告引用。
/// - 失败只影响当前实体（对比图除外，其失败只记录不致命）。
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// # Summary
    /// 保存完整指标表：每个观测一行，末尾追加一行聚合记录。
    ///
    /// # Arguments
    /// * `series` - 已聚合的评分序列。
    /// * `run_date` - 运行日期，用于文件名。
    async fn save_table(
        &self,
        series: &ScoredSeries,
        run_date: NaiveDate,
    ) -> Result<PathBuf, StoreError>;

    /// # Summary
    /// 保存聚合分文本，说明回看周期与格式化后的聚合分。
    async fn save_summary(
        &self,
        series: &ScoredSeries,
        period: Period,
    ) -> Result<PathBuf, StoreError>;

    /// 保存单实体信任分走势图。
    async fn save_entity_chart(
        &self,
        entity: &Entity,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError>;

    /// 保存多实体对比图。
    async fn save_comparison_chart(
        &self,
        run_date: NaiveDate,
        image: &ChartImage,
    ) -> Result<PathBuf, StoreError>;
}
