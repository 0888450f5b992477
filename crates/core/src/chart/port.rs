use crate::chart::entity::ChartImage;
use crate::chart::error::ChartError;
use crate::common::Granularity;
use crate::score::entity::{ComparisonSeries, ScoredSeries};

/// # Summary
/// 图表渲染后端接口。
///
/// # Invariants
/// - 纵轴固定为 [0, 10]，并绘制 [0,5) 红 / [5,8) 黄 / [8,10] 绿三段风险底色。
/// - 只负责生成图像，不负责落盘。
pub trait ChartRenderer: Send + Sync {
    /// # Summary
    /// 绘制单实体信任分走势图。
    ///
    /// # Logic
    /// 1. 逐观测点绘制折线。
    /// 2. 聚合分已定义时绘制水平参考线。
    ///
    /// # Arguments
    /// * `series` - 评分序列。
    /// * `granularity` - 回看周期对应的粒度，决定横轴刻度格式。
    fn render_entity(
        &self,
        series: &ScoredSeries,
        granularity: Granularity,
    ) -> Result<ChartImage, ChartError>;

    /// 绘制多实体对比图，每个实体一条折线，图例使用 ticker。
    fn render_comparison(&self, comparison: &ComparisonSeries) -> Result<ChartImage, ChartError>;
}
