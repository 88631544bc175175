//! 请求上下文
//!
//! 封装"这是第几次提交"这一信息，所有状态迁移都用它核对代数。

use std::fmt::Display;

use crate::models::Submission;
use crate::utils::logging::truncate_text;

/// 请求上下文
#[derive(Debug, Clone)]
pub struct RequestCtx {
    /// 发起请求时的代数
    pub generation: u64,

    /// 题目预览（仅用于日志显示）
    pub note_preview: String,

    /// 是否附带图片
    pub has_image: bool,
}

impl RequestCtx {
    pub fn new(generation: u64, submission: &Submission) -> Self {
        Self {
            generation,
            note_preview: truncate_text(submission.note_text().trim(), 40),
            has_image: submission.has_image(),
        }
    }
}

impl Display for RequestCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[请求 #{} 图片#{}]",
            self.generation,
            if self.has_image { "有" } else { "无" }
        )
    }
}
