use thiserror::Error;

/// # Summary
/// 数据源错误枚举，处理网络、解析及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 只在单个实体的处理边界内传播，不会中断整次运行。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 请求的标的或数据未找到 (未知 ticker 或结果为空)
    #[error("Data not found: {0}")]
    NotFound(String),
    // 未知或未分类的错误，如不支持的 period/interval 组合
    #[error("Unknown error: {0}")]
    Unknown(String),
}
