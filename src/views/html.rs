//! 详细解答的 HTML 页面
//!
//! 导出图片时由无头浏览器加载，公式交给 MathJax 排版。

use crate::models::DetailedMethod;
use crate::views::math_text::{is_image_url, segments, Segment};

/// 导出区域的元素 id
pub const EXPORT_ELEMENT_ID: &str = "detailed-method";

const FOOTER: &str = "Lưu từ MathGuru AI - Thầy Sang THPT Mang Thít";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="vi">
<head>
<meta charset="utf-8">
<script>
window.MathJax = {
  tex: { inlineMath: [['$', '$']] },
  startup: { typeset: true }
};
</script>
<script src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js" async></script>
<style>
body { margin: 0; background: #ffffff; font-family: "Be Vietnam Pro", "Segoe UI", sans-serif; }
#detailed-method { padding: 30px; max-width: 760px; color: #475569; }
h3 { text-transform: uppercase; color: #1e293b; }
h4 { color: #6d28d9; font-style: italic; }
ol { padding-left: 1.4em; }
li { margin: 0.8em 0; font-weight: 700; line-height: 1.6; }
.conclusion { margin-top: 1.5em; font-size: 1.3em; font-weight: 900; color: #047857; }
.footer { margin-top: 2em; text-align: center; font-size: 10px; color: #cbd5e1; text-transform: uppercase; font-style: italic; }
img.math-diagram { max-width: 100%; max-height: 400px; }
</style>
</head>
<body>
"#;

/// 渲染详细解答为独立 HTML 页面
pub fn render_detailed_method(method: &DetailedMethod) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str(&format!("<section id=\"{}\">\n", EXPORT_ELEMENT_ID));
    html.push_str("<h3>Trình bày Chi tiết (Tự luận)</h3>\n");
    html.push_str(&format!("<h4>{}</h4>\n", escape_html(&method.title)));

    html.push_str("<ol>\n");
    for step in &method.steps {
        html.push_str(&format!("<li>{}</li>\n", render_content(step)));
    }
    html.push_str("</ol>\n");

    if let Some(conclusion) = &method.conclusion {
        html.push_str(&format!(
            "<div class=\"conclusion\">{}</div>\n",
            render_content(conclusion)
        ));
    }

    html.push_str(&format!("<div class=\"footer\">{}</div>\n", FOOTER));
    html.push_str("</section>\n</body>\n</html>\n");

    html
}

/// 渲染一段内容：图片链接直接显示为图片，其余按公式切分
pub fn render_content(content: &str) -> String {
    if is_image_url(content) {
        return format!(
            "<img class=\"math-diagram\" alt=\"Math Diagram\" src=\"{}\">",
            escape_html(content.trim())
        );
    }

    segments(content)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => format!("<span>{}</span>", escape_html(text)),
            Segment::Math(tex) => {
                format!("<span class=\"formula\">${}$</span>", escape_html(tex))
            }
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DetailedMethod {
        DetailedMethod {
            title: "Phương pháp 2".to_string(),
            steps: vec![
                "Bước 1: $a < b$ nên <b>".to_string(),
                "https://example.com/hinh.png".to_string(),
            ],
            conclusion: Some("$x = 1$".to_string()),
        }
    }

    #[test]
    fn test_render_page_structure() {
        let html = render_detailed_method(&sample());
        assert!(html.contains("id=\"detailed-method\""));
        assert!(html.contains("<h4>Phương pháp 2</h4>"));
        assert!(html.contains("class=\"conclusion\""));
        assert!(html.contains(FOOTER));
    }

    #[test]
    fn test_render_escapes_text_and_formula() {
        let rendered = render_content("Bước 1: $a < b$ nên <b>");
        assert!(rendered.contains("<span class=\"formula\">$a &lt; b$</span>"));
        assert!(rendered.contains("nên &lt;b&gt;"));
    }

    #[test]
    fn test_render_image_step() {
        let rendered = render_content("https://example.com/hinh.png");
        assert!(rendered.starts_with("<img class=\"math-diagram\""));
    }

    #[test]
    fn test_render_without_conclusion() {
        let mut method = sample();
        method.conclusion = None;
        let html = render_detailed_method(&method);
        assert!(!html.contains("class=\"conclusion\""));
    }
}
