use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use vigil_core::chart::error::ChartError;
use vigil_core::chart::port::ChartRenderer;
use vigil_core::common::Entity;
use vigil_core::common::time::TimeProvider;
use vigil_core::config::RunConfig;
use vigil_core::market::error::MarketError;
use vigil_core::market::port::MarketDataProvider;
use vigil_core::score::entity::{Aggregate, ScoredSeries};
use vigil_core::score::error::ComputationError;
use vigil_core::store::error::StoreError;
use vigil_core::store::port::ArtifactStore;
use vigil_engine::combiner::combine;
use vigil_engine::evaluate;

/// # Summary
/// Manager 层的统一错误类型，按失败类别包装各领域错误。
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Provider error: {0}")]
    Provider(#[from] MarketError),
    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
    #[error("Render error: {0}")]
    Render(#[from] ChartError),
}

/// 单个实体成功完成后的结果。
#[derive(Debug, Clone)]
pub struct EntityOutcome {
    pub ticker: String,
    pub aggregate: Aggregate,
    pub table: PathBuf,
    pub summary: PathBuf,
    pub chart: PathBuf,
}

/// 单个实体的失败记录。
#[derive(Debug)]
pub struct EntityFailure {
    pub ticker: String,
    pub error: MonitorError,
}

/// # Summary
/// 一次运行的结果汇总。
///
/// # Invariants
/// - `outcomes` 与 `failures` 都保持配置中的实体顺序，二者的 ticker 互不重叠。
/// - `comparison` 仅在至少一个实体成功且对比图写入成功时存在。
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<EntityOutcome>,
    pub failures: Vec<EntityFailure>,
    pub comparison: Option<PathBuf>,
    /// 对比图渲染或写入失败时的错误，不影响实体结果。
    pub comparison_error: Option<MonitorError>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// # Summary
/// 监控运行的应用服务层门面。
/// 编译期仅依赖 `vigil-core` 中的 Trait 定义，所有外部实现通过构造函数注入。
///
/// # Invariants
/// - 实体严格按配置顺序逐个处理，前一个实体的完整流程结束后才开始下一个。
/// - 单个实体的任何失败只记录在报告中，不会中断运行。
pub struct MonitorManager {
    config: RunConfig,
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn ChartRenderer>,
    clock: Arc<dyn TimeProvider>,
}

impl MonitorManager {
    /// # Summary
    /// 创建 MonitorManager 实例。
    ///
    /// # Arguments
    /// * `config` - 已校验的运行配置。
    /// * `provider` - 行情数据源。
    /// * `store` - 产物存储。
    /// * `renderer` - 图表渲染器。
    /// * `clock` - 时间供给器，决定产物文件名中的运行日期。
    pub fn new(
        config: RunConfig,
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn ArtifactStore>,
        renderer: Arc<dyn ChartRenderer>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            config,
            provider,
            store,
            renderer,
            clock,
        }
    }

    /// # Summary
    /// 执行一次完整的监控运行。
    ///
    /// # Logic
    /// 1. 从时钟读取运行日期。
    /// 2. 逐个实体执行：抓取 → 评分 → 指标表 → 聚合分文本 → 走势图；失败记录后继续。
    /// 3. 以成功实体（保持配置顺序）生成对比图；没有成功实体时跳过。
    ///
    /// # Returns
    /// * `RunReport` - 运行结果汇总，本方法本身不会失败。
    pub async fn run(&self) -> RunReport {
        let run_date = self.clock.today();
        info!(
            period = %self.config.period,
            interval = %self.config.interval,
            scoring = %self.config.scoring,
            entities = self.config.entities.len(),
            "Starting trust monitor run for {}",
            run_date
        );

        let mut report = RunReport::default();
        let mut succeeded = Vec::with_capacity(self.config.entities.len());

        for entity in &self.config.entities {
            info!(ticker = %entity.ticker, "Processing {}", entity);
            match self.process_entity(entity, run_date).await {
                Ok((series, outcome)) => {
                    info!(
                        ticker = %entity.ticker,
                        "{}: aggregate {} [{}]",
                        entity.ticker,
                        outcome.aggregate.format_score(),
                        outcome.aggregate.status
                    );
                    report.outcomes.push(outcome);
                    succeeded.push(series);
                }
                Err(e) => {
                    error!(ticker = %entity.ticker, "Failed to process {}: {}", entity, e);
                    report.failures.push(EntityFailure {
                        ticker: entity.ticker.clone(),
                        error: e,
                    });
                }
            }
        }

        if succeeded.is_empty() {
            warn!("No entity succeeded; skipping comparison chart");
        } else {
            match self.compare(&succeeded, run_date).await {
                Ok(path) => report.comparison = Some(path),
                Err(e) => {
                    error!("Failed to produce comparison chart: {}", e);
                    report.comparison_error = Some(e);
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Run finished"
        );
        report
    }

    async fn process_entity(
        &self,
        entity: &Entity,
        run_date: NaiveDate,
    ) -> Result<(ScoredSeries, EntityOutcome), MonitorError> {
        let rows = self
            .provider
            .fetch_history(&entity.ticker, self.config.period, self.config.interval)
            .await?;
        let series = evaluate(entity.clone(), &rows, self.config.scoring)?;

        let table = self.store.save_table(&series, run_date).await?;
        let summary = self.store.save_summary(&series, self.config.period).await?;
        let image = self
            .renderer
            .render_entity(&series, self.config.period.granularity())?;
        let chart = self
            .store
            .save_entity_chart(entity, run_date, &image)
            .await?;

        let outcome = EntityOutcome {
            ticker: entity.ticker.clone(),
            aggregate: series.aggregate,
            table,
            summary,
            chart,
        };
        Ok((series, outcome))
    }

    async fn compare(
        &self,
        succeeded: &[ScoredSeries],
        run_date: NaiveDate,
    ) -> Result<PathBuf, MonitorError> {
        let comparison = combine(succeeded, self.config.period);
        let image = self.renderer.render_comparison(&comparison)?;
        let path = self.store.save_comparison_chart(run_date, &image).await?;
        info!("Comparison chart written to {}", path.display());
        Ok(path)
    }
}
