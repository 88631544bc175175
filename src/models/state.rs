//! 请求状态机
//!
//! `Idle → Resolving → Resolved | Failed`，只由 `ResolutionPolicy` 驱动。

use std::fmt;

use crate::models::solution::{DetailedMethod, Solution};

/// 讲解来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// 远程 AI 服务
    Remote,
    /// 本地题库
    Local,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Remote => write!(f, "remote"),
            Origin::Local => write!(f, "local"),
        }
    }
}

/// 远程与本地都没有给出讲解的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// 未配置 API key，本地题库也没有匹配
    NoMatch,
    /// 已配置 API key 但被服务拒绝，本地题库也没有匹配
    CredentialRejected,
    /// 已配置 API key，远程调用失败，本地题库也没有匹配
    RemoteAndLocalFailed,
}

impl FailureReason {
    /// 面向学生的提示文案
    pub fn user_message(self) -> &'static str {
        match self {
            FailureReason::NoMatch => {
                "Bài này chưa có trong thư viện của Thầy. Em hãy cài đặt API key để AI của Thầy Sang giải giúp em nhé!"
            }
            FailureReason::CredentialRejected => {
                "API key của em không hợp lệ hoặc đã hết hạn. Em hãy kiểm tra lại trong phần Cài đặt AI nhé!"
            }
            FailureReason::RemoteAndLocalFailed => {
                "Thầy chưa nhận diện được bài toán này. Em hãy chụp lại ảnh rõ nét, vuông góc và đủ sáng nhé!"
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoMatch => write!(f, "NoMatch"),
            FailureReason::CredentialRejected => write!(f, "CredentialRejected"),
            FailureReason::RemoteAndLocalFailed => write!(f, "RemoteAndLocalFailed"),
        }
    }
}

/// 一次解析请求的状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Resolving,
    Resolved { solution: Solution, origin: Origin },
    Failed(FailureReason),
}

impl RequestState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, RequestState::Resolving)
    }

    /// `Resolved` 与 `Failed` 是终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Resolved { .. } | RequestState::Failed(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            RequestState::Resolved { solution, .. } => Some(solution),
            _ => None,
        }
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            RequestState::Resolved { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// 只有成功状态才有可导出的详细解答
    pub fn export_view(&self) -> Option<&DetailedMethod> {
        self.solution().map(Solution::export_view)
    }

    /// 状态名（日志用）
    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Resolving => "resolving",
            RequestState::Resolved { .. } => "resolved",
            RequestState::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = RequestState::default();
        assert!(state.is_idle());
        assert!(!state.is_terminal());
        assert!(state.export_view().is_none());
    }

    #[test]
    fn test_failure_messages_are_distinct() {
        let messages = [
            FailureReason::NoMatch.user_message(),
            FailureReason::CredentialRejected.user_message(),
            FailureReason::RemoteAndLocalFailed.user_message(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
        assert!(messages[0].contains("API key"));
    }

    #[test]
    fn test_failed_is_terminal() {
        let state = RequestState::Failed(FailureReason::NoMatch);
        assert!(state.is_terminal());
        assert_eq!(state.label(), "failed");
        assert!(state.origin().is_none());
    }
}
