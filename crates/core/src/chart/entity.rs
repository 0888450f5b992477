use serde::{Deserialize, Serialize};

/// 图像编码格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Svg,
}

impl ImageFormat {
    /// 对应的文件扩展名（不含点号）。
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
        }
    }
}

/// # Summary
/// 渲染完成、尚未落盘的图像。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}
