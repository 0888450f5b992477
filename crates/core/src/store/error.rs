use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理产物写入失败等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 文件系统操作失败
    #[error("I/O error: {0}")]
    Io(String),
    /// 表格或文本编码失败
    #[error("Encode error: {0}")]
    Encode(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
