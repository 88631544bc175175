//! 远程解题服务的边界
//!
//! 流程层只依赖这里的契约：请求进，`Solution` 或 `SolverError` 出。

use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::models::{ImageData, Solution};

/// 一次远程解题请求
#[derive(Debug, Clone, Copy)]
pub struct SolveRequest<'a> {
    /// 备注文字，可能为空（只有图片时）
    pub note_text: &'a str,
    pub image: Option<&'a ImageData>,
    pub credential: &'a str,
}

/// 远程调用失败的分类
///
/// 流程层对所有分支都降级到本地题库，只有 `Unauthorized` 会影响失败文案。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("未配置 API key")]
    MissingCredential,
    #[error("网络请求失败: {0}")]
    Transport(String),
    #[error("API key 被拒绝: {0}")]
    Unauthorized(String),
    #[error("返回内容无法解析: {0}")]
    Malformed(String),
    #[error("请求超时 ({0:?})")]
    Timeout(Duration),
}

impl SolverError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SolverError::Unauthorized(_))
    }
}

/// 远程解题服务
pub trait RemoteSolver: Send + Sync {
    fn solve<'a>(&'a self, request: SolveRequest<'a>) -> BoxFuture<'a, Result<Solution, SolverError>>;
}
