use serde::{Deserialize, Serialize};

use crate::models::solution::Solution;

/// 本地题库的一条记录：主题标签 + 关键词 + 预先写好的讲解
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    pub topic: String,
    pub keywords: Vec<String>,
    pub solution: Solution,
}

impl BankEntry {
    pub fn new(topic: impl Into<String>, keywords: &[&str], solution: Solution) -> Self {
        Self {
            topic: topic.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            solution,
        }
    }

    /// 小写后的文本是否包含任一关键词
    pub fn matches(&self, lowered_text: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_text.contains(keyword.as_str()))
    }
}
