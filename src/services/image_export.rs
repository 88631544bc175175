//! 图片导出服务 - 业务能力层
//!
//! 只负责"把详细解答渲染成 PNG"能力：启动无头浏览器，加载 HTML 页面，
//! 等待 MathJax 排版后截取导出区域。
//!
//! 失败不影响请求状态，调用方提示学生手动截图即可。

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::DetailedMethod;
use crate::views::html::{render_detailed_method, EXPORT_ELEMENT_ID};

const TYPESET_SCRIPT: &str = r#"
(async () => {
    if (window.MathJax && window.MathJax.typesetPromise) {
        await window.MathJax.typesetPromise();
        return true;
    }
    return false;
})()
"#;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("当前没有可导出的详细解答")]
    NothingToExport,
    #[error("启动无头浏览器失败: {0}")]
    BrowserLaunch(String),
    #[error("生成图片失败: {0}")]
    RenderFailed(String),
    #[error("写入图片失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// 面向学生的提示：请手动截图
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::NothingToExport => "Chưa có lời giải để lưu ảnh.",
            _ => "Có lỗi khi tạo ảnh. Em hãy chụp màn hình để lưu lại nhé!",
        }
    }
}

fn render_failed(e: impl std::fmt::Display) -> ExportError {
    ExportError::RenderFailed(e.to_string())
}

/// 图片导出服务
pub struct ImageExporter {
    chrome_executable: Option<PathBuf>,
    render_wait: Duration,
}

impl ImageExporter {
    pub fn new(config: &Config) -> Self {
        Self {
            chrome_executable: config.browser_executable.as_ref().map(PathBuf::from),
            render_wait: Duration::from_millis(config.export_render_wait_ms),
        }
    }

    /// 导出为 PNG 字节
    pub async fn export_png(&self, method: &DetailedMethod) -> Result<Vec<u8>, ExportError> {
        let html = render_detailed_method(method);
        let (mut browser, handler_task) = self.launch().await?;

        let result = self.capture(&browser, &html).await;

        if let Err(e) = browser.close().await {
            debug!("关闭无头浏览器失败: {}", e);
        }
        handler_task.abort();

        result
    }

    /// 导出并写入目录，返回文件路径
    pub async fn export_to_file(
        &self,
        method: &DetailedMethod,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let png = self.export_png(method).await?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ExportError::Io {
                path: dir.display().to_string(),
                source,
            })?;

        let path = dir.join(export_file_name(chrono::Utc::now().timestamp_millis()));
        tokio::fs::write(&path, &png)
            .await
            .map_err(|source| ExportError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!("✅ 已保存详细解答图片: {}", path.display());
        Ok(path)
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ExportError> {
        info!("🚀 启动无头浏览器...");

        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--remote-debugging-port=0",
        ]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            ExportError::BrowserLaunch(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            ExportError::BrowserLaunch(e.to_string())
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn capture(&self, browser: &Browser, html: &str) -> Result<Vec<u8>, ExportError> {
        let page = browser.new_page("about:blank").await.map_err(render_failed)?;
        page.set_content(html).await.map_err(render_failed)?;

        // MathJax 从 CDN 异步加载，先等一会儿再主动触发排版
        sleep(self.render_wait).await;
        if let Err(e) = page.evaluate(TYPESET_SCRIPT).await {
            debug!("MathJax 排版未完成，按原文截图: {}", e);
        }

        let element = page
            .find_element(format!("#{}", EXPORT_ELEMENT_ID))
            .await
            .map_err(render_failed)?;

        let png = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(render_failed)?;

        debug!("截图完成: {} 字节", png.len());
        Ok(png)
    }
}

/// `MathGuru-TuLuan-<毫秒时间戳>.png`
pub fn export_file_name(timestamp_millis: i64) -> String {
    format!("MathGuru-TuLuan-{}.png", timestamp_millis)
}
