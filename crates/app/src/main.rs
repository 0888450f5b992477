mod cli;
mod logging;
mod settings;

use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use cli::Cli;
use tracing::{debug, error, info};
use vigil_chart::render::SvgChartRenderer;
use vigil_core::common::time::{RealTimeProvider, TimeProvider};
use vigil_feed::yahoo::YahooProvider;
use vigil_manager::monitor::MonitorManager;
use vigil_store::artifact::FsArtifactStore;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 MonitorManager。
///
/// # Logic
/// 1. 解析命令行并分层加载配置。
/// 2. 初始化全局日志。
/// 3. 校验配置；失败时在处理任何实体之前以非零状态退出。
/// 4. 实例化基础设施层（Feed、Store、Chart、Clock）。
/// 5. 构造应用服务层并执行一次运行。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置
    let cli = Cli::parse();
    let app_config = settings::load(&cli, settings::process_environment())?;

    // 2. 日志，guard 需存活到进程结束
    let _log_guard = logging::init(Path::new(&app_config.output.log_dir))?;
    info!("Vigil trust monitor starting...");

    // 3. 校验
    let run_config = match app_config.validate() {
        Ok(run_config) => run_config,
        Err(e) => {
            error!("Configuration rejected: {}", e);
            return Err(e.into());
        }
    };

    // reqwest 以 rustls-no-provider 构建，需要进程级安装加密后端
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    // 4. 实例化基础设施层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let provider = Arc::new(YahooProvider::new(clock.clone())?);
    let store = Arc::new(FsArtifactStore::new(run_config.output_dir.clone())?);
    let renderer = Arc::new(SvgChartRenderer::new());
    info!("Writing artifacts to {}", store.root().display());

    // 5. 构造应用服务层并运行
    let manager = MonitorManager::new(run_config, provider, store, renderer, clock);
    let report = manager.run().await;

    for outcome in &report.outcomes {
        info!(
            "{}: {} | {} | {}",
            outcome.ticker,
            outcome.table.display(),
            outcome.summary.display(),
            outcome.chart.display()
        );
    }
    if let Some(path) = &report.comparison {
        info!("Comparison chart: {}", path.display());
    }
    info!(
        "Done: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );

    Ok(())
}
