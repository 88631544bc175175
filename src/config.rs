/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    /// OpenAI 兼容端点
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 远程调用超时（秒）
    pub remote_timeout_secs: u64,
    // --- 本地存储 ---
    /// API key 存储文件
    pub credential_file: String,
    /// 额外的本地题库 TOML 文件
    pub answer_bank_file: Option<String>,
    // --- 导出 ---
    /// 图片导出目录
    pub export_dir: String,
    /// 浏览器可执行文件（不设置时由 chromiumoxide 自动查找）
    pub browser_executable: Option<String>,
    /// 等待 MathJax 加载的时间（毫秒）
    pub export_render_wait_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.0-flash-exp".to_string(),
            remote_timeout_secs: 30,
            credential_file: "mathguru_settings.json".to_string(),
            answer_bank_file: None,
            export_dir: "exports".to_string(),
            browser_executable: None,
            export_render_wait_ms: 1500,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            remote_timeout_secs: std::env::var("REMOTE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.remote_timeout_secs),
            credential_file: std::env::var("CREDENTIAL_FILE").unwrap_or(default.credential_file),
            answer_bank_file: std::env::var("ANSWER_BANK_FILE").ok().filter(|v| !v.trim().is_empty()).or(default.answer_bank_file),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            browser_executable: std::env::var("BROWSER_EXECUTABLE").ok().filter(|v| !v.trim().is_empty()).or(default.browser_executable),
            export_render_wait_ms: std::env::var("EXPORT_RENDER_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.export_render_wait_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    pub fn remote_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.remote_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote_timeout(), std::time::Duration::from_secs(30));
        assert!(config.answer_bank_file.is_none());
        assert!(!config.verbose_logging);
    }
}
