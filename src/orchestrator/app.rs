use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_answer_bank_toml, RequestState, Submission};
use crate::services::{
    CredentialStore, ExportError, FileCredentialStore, ImageExporter, LlmSolver,
    LocalAnswerBank, RemoteSolver,
};
use crate::utils::logging::log_startup;
use crate::workflow::ResolutionPolicy;

/// 应用主结构
///
/// 一个 App 对应一个学生会话：同一时间最多一个在途请求。
pub struct App {
    config: Config,
    credentials: Arc<dyn CredentialStore>,
    policy: Arc<ResolutionPolicy>,
    exporter: ImageExporter,
}

impl App {
    /// 初始化应用：文件凭据存储 + LLM 服务 + 内置题库（可选扩展）
    pub async fn initialize(config: Config) -> AppResult<Self> {
        if config.remote_timeout_secs == 0 {
            return Err(AppError::invalid_config(
                "REMOTE_TIMEOUT_SECS",
                config.remote_timeout_secs,
                "必须大于 0",
            ));
        }

        let credentials: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(&config.credential_file));
        let solver: Arc<dyn RemoteSolver> = Arc::new(LlmSolver::new(&config));
        let bank = load_bank(&config).await?;

        let app = Self::with_parts(config, credentials, solver, bank);
        log_startup(&app.config, app.credential_configured(), app.bank_size());

        Ok(app)
    }

    /// 使用给定的能力组装应用（测试中注入假实现）
    pub fn with_parts(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        solver: Arc<dyn RemoteSolver>,
        bank: LocalAnswerBank,
    ) -> Self {
        let policy = ResolutionPolicy::new(solver, credentials.clone(), Arc::new(bank))
            .with_remote_timeout(config.remote_timeout());
        let exporter = ImageExporter::new(&config);

        Self {
            config,
            credentials,
            policy: Arc::new(policy),
            exporter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 解析策略（需要在其它任务中调用 `reset` 时使用）
    pub fn policy(&self) -> Arc<ResolutionPolicy> {
        self.policy.clone()
    }

    pub fn state(&self) -> RequestState {
        self.policy.state()
    }

    fn bank_size(&self) -> usize {
        self.policy.bank().len()
    }

    /// 提交一道题
    pub async fn submit(&self, submission: Submission) -> AppResult<RequestState> {
        Ok(self.policy.resolve(submission).await?)
    }

    /// "解新题"：回到 Idle
    pub fn reset(&self) {
        self.policy.reset();
    }

    // ========== API key 设置 ==========

    pub fn credential_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    pub fn save_credential(&self, raw: &str) -> AppResult<()> {
        self.credentials.set(raw)?;
        Ok(())
    }

    pub fn clear_credential(&self) -> AppResult<()> {
        self.credentials.clear()?;
        Ok(())
    }

    // ========== 导出 ==========

    /// 把当前讲解的详细解答导出为图片
    ///
    /// 失败时状态不变，调用方用 `user_message` 提示学生手动截图。
    pub async fn export_current(&self) -> AppResult<PathBuf> {
        self.export_current_to(Path::new(&self.config.export_dir)).await
    }

    pub async fn export_current_to(&self, dir: &Path) -> AppResult<PathBuf> {
        let state = self.policy.state();
        let method = state.export_view().ok_or(ExportError::NothingToExport)?;

        match self.exporter.export_to_file(method, dir).await {
            Ok(path) => Ok(path),
            Err(e) => {
                warn!("Lỗi tải ảnh: {}", e);
                Err(e.into())
            }
        }
    }
}

/// 内置题库 + 配置中的扩展题库
async fn load_bank(config: &Config) -> AppResult<LocalAnswerBank> {
    let bank = LocalAnswerBank::builtin();

    let Some(path) = &config.answer_bank_file else {
        return Ok(bank);
    };

    info!("\n📁 正在加载扩展题库: {}", path);
    let entries = load_answer_bank_toml(Path::new(path))
        .await
        .map_err(|e| AppError::bank_parse_failed(path.as_str(), e))?;

    Ok(bank.extend(entries))
}
