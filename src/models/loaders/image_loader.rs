use crate::models::submission::ImageData;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 读取题目图片，mime 类型按扩展名推断
pub async fn load_image(path: &Path) -> Result<ImageData> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取图片文件: {}", path.display()))?;

    if bytes.is_empty() {
        anyhow::bail!("图片文件为空: {}", path.display());
    }

    let mime_type = path
        .extension()
        .and_then(|s| s.to_str())
        .map(ImageData::mime_from_extension)
        .unwrap_or("application/octet-stream");

    tracing::debug!(
        "已读取图片 {} ({} 字节, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(ImageData::new(bytes, mime_type))
}
