use std::fmt;

use crate::services::{ExportError, SolverError, StoreError};
use crate::workflow::ResolveError;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 提交被拒绝（空提交 / 在途 / 作废）
    Resolve(ResolveError),
    /// 远程服务错误（正常流程中会被降级吸收，只在直接调用时出现）
    Solver(SolverError),
    /// API key 存储错误
    Store(StoreError),
    /// 图片导出错误
    Export(ExportError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
}

impl AppError {
    /// 面向学生的提示文案；传输层细节只写日志，不出现在这里
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Resolve(e) => e.user_message(),
            AppError::Export(e) => e.user_message(),
            AppError::Store(StoreError::BlankCredential) => "API key không được để trống em nhé!",
            _ => "Ối, có chút trục trặc! Em thử lại sau nhé.",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Resolve(e) => write!(f, "解析错误: {}", e),
            AppError::Solver(e) => write!(f, "远程服务错误: {}", e),
            AppError::Store(e) => write!(f, "凭据存储错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Resolve(e) => Some(e),
            AppError::Solver(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 题库文件解析失败
    BankParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::BankParseFailed { path, source } => {
                write!(f, "题库文件解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::BankParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置值不合法
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                name,
                value,
                reason,
            } => {
                write!(f, "配置项 {} 的值 '{}' 不合法: {}", name, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        AppError::Resolve(err)
    }
}

impl From<SolverError> for AppError {
    fn from(err: SolverError) -> Self {
        AppError::Solver(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建题库解析错误
    pub fn bank_parse_failed(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::File(FileError::BankParseFailed {
            path: path.into(),
            source: source.into(),
        })
    }

    /// 创建配置值错误
    pub fn invalid_config(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = AppError::from(SolverError::Transport("connection reset by 10.0.0.1".to_string()));
        assert!(!err.user_message().contains("10.0.0.1"));
        assert!(err.to_string().contains("10.0.0.1"));
    }

    #[test]
    fn test_resolve_error_message() {
        let err = AppError::from(ResolveError::EmptySubmission);
        assert_eq!(err.user_message(), ResolveError::EmptySubmission.user_message());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_bank_parse_failed_keeps_source() {
        let err = AppError::bank_parse_failed("bank.toml", anyhow::anyhow!("expected `=`"));
        assert!(err.to_string().contains("bank.toml"));
        assert!(err.source().and_then(|e| e.source()).is_some());
    }

    #[test]
    fn test_invalid_config() {
        let err = AppError::invalid_config("REMOTE_TIMEOUT_SECS", 0, "必须大于 0");
        assert!(err.to_string().contains("REMOTE_TIMEOUT_SECS"));
    }
}
