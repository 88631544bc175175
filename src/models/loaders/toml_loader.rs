use crate::models::bank_entry::BankEntry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    entries: Vec<BankEntry>,
}

/// 从 TOML 文件加载额外的本地题库条目
///
/// 不合法的条目（没有关键词或讲解不满足渲染约定）会被跳过并记录警告。
pub async fn load_answer_bank_toml(toml_file_path: &Path) -> Result<Vec<BankEntry>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let entries = parse_answer_bank_toml(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    info!(
        "从 {} 加载了 {} 条题库记录",
        toml_file_path.display(),
        entries.len()
    );

    Ok(entries)
}

/// 解析题库 TOML 内容
pub fn parse_answer_bank_toml(content: &str) -> Result<Vec<BankEntry>> {
    let file: BankFile = toml::from_str(content)?;

    let mut accepted = Vec::with_capacity(file.entries.len());
    for mut entry in file.entries {
        entry.keywords = entry
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if entry.keywords.is_empty() {
            warn!("题库条目 {} 没有关键词，已跳过", entry.topic);
            continue;
        }

        if let Err(defect) = entry.solution.validate() {
            warn!("题库条目 {} 的讲解不合法，已跳过: {}", entry.topic, defect);
            continue;
        }

        accepted.push(entry);
    }

    Ok(accepted)
}
