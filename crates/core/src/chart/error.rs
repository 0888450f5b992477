use thiserror::Error;

/// # Summary
/// 图表渲染错误枚举。
#[derive(Error, Debug)]
pub enum ChartError {
    /// 序列中没有任何可绘制的观测点
    #[error("Nothing to plot for {0}")]
    EmptySeries(String),
    /// 底层绘制或序列化失败
    #[error("Chart backend failure: {0}")]
    Render(String),
}
