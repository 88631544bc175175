//! 行内公式切分
//!
//! 把 `$...$` 包裹的公式与普通文字分开，交给排版引擎处理公式部分。

use std::sync::LazyLock;

use regex::Regex;

static MATH_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    // 与 `\$.*?\$` 相同的非贪婪匹配，但不跨越换行
    Regex::new(r"\$[^$\n]*?\$").expect("公式正则不合法")
});

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://\S+\.(jpeg|jpg|gif|png|svg)$").expect("图片正则不合法")
});

/// 文本片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// 公式内容（不含 `$`）
    Math(&'a str),
}

/// 按 `$...$` 切分文本，空片段会被丢弃
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut parts = Vec::new();
    let mut cursor = 0;

    for m in MATH_SPAN.find_iter(text) {
        if m.start() > cursor {
            parts.push(Segment::Text(&text[cursor..m.start()]));
        }
        let inner = &text[m.start() + 1..m.end() - 1];
        if !inner.is_empty() {
            parts.push(Segment::Math(inner));
        }
        cursor = m.end();
    }

    if cursor < text.len() {
        parts.push(Segment::Text(&text[cursor..]));
    }

    parts
}

/// 整段内容是否是一张图片（data URL 或图片链接）
pub fn is_image_url(content: &str) -> bool {
    let content = content.trim();
    content.starts_with("data:image/") || IMAGE_URL.is_match(content)
}
