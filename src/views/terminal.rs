//! 终端展示
//!
//! 按状态输出纯文本，公式保留 `$...$` 原样。

use crate::models::{Origin, RequestState, Solution};

const LOADING_MESSAGES: [&str; 5] = [
    "Thầy Sang đang nghiên cứu bài tập của em...",
    "Đang truy lục kiến thức trọng tâm...",
    "Đang xây dựng lộ trình giải tối ưu...",
    "MathMaster AI đang hoàn tất lời giải...",
    "Sắp xong rồi, em chuẩn bị xem bài nhé!",
];

/// 等待期间轮播的提示语
pub fn loading_message(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}

/// 渲染任意状态
pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => {
            "Giải toán Thật Đơn Giản\nTải ảnh bài toán lên hoặc nhập đề bài (mỗi lần gởi 01 bài, ảnh rõ nét).\n"
                .to_string()
        }
        RequestState::Resolving => format!("⏳ {}\n", loading_message(0)),
        RequestState::Resolved { solution, origin } => render_solution(solution, *origin),
        RequestState::Failed(reason) => {
            format!("Ối, có chút trục trặc!\n{}\n", reason.user_message())
        }
    }
}

/// 渲染四步讲解
pub fn render_solution(solution: &Solution, origin: Origin) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    out.push_str(&format!("{}\n", rule));
    out.push_str("Nội dung đề bài trích dẫn\n");
    out.push_str(&format!("{}\n", solution.problem_statement));
    out.push_str(&format!("[{}]\n", origin_label(origin)));
    out.push_str(&format!("{}\n\n", rule));

    // 1
    out.push_str("1. PHÂN TÍCH & LÝ THUYẾT\n");
    for line in &solution.analysis_and_theory.logic {
        out.push_str(&format!("  • {}\n", line));
    }
    for point in &solution.analysis_and_theory.formulas {
        out.push_str(&format!("  🔑 {}  ({})\n", point.formula, point.note));
    }
    out.push('\n');

    // 2
    let optimal = &solution.optimal_method;
    out.push_str("2. GIẢI PHÁP TỐI ƯU\n");
    out.push_str(&format!("  {}\n", optimal.title));
    push_steps(&mut out, &optimal.steps);
    out.push_str(&format!("  Kết quả / Đáp số: {}\n\n", optimal.conclusion));

    // 3
    let detailed = &solution.detailed_method;
    out.push_str("3. TRÌNH BÀY CHI TIẾT (TỰ LUẬN)\n");
    out.push_str(&format!("  {}\n", detailed.title));
    push_steps(&mut out, &detailed.steps);
    if let Some(conclusion) = &detailed.conclusion {
        out.push_str(&format!("  ⇒ {}\n", conclusion));
    }
    out.push('\n');

    // 4
    out.push_str("4. LƯU Ý & CẢNH BÁO\n");
    if solution.summary_notes.is_empty() {
        out.push_str("  (không có)\n");
    }
    for note in &solution.summary_notes {
        out.push_str(&format!("  ✗ Lỗi hay mắc: {}\n", note.wrong));
        out.push_str(&format!("  ✓ Cách làm đúng: {}\n", note.right));
        out.push_str(&format!("  ★ Mẹo nhớ từ Thầy Sang: {}\n", note.tip));
    }

    out.push_str(&format!("{}\n", "─".repeat(60)));
    out.push_str("Thầy Sang - THPT Mang Thít · \"Học toán giá trị - Kiến tạo tương lai\"\n");

    out
}

fn push_steps(out: &mut String, steps: &[String]) {
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, step));
    }
}

fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Remote => "Lời giải từ AI của Thầy Sang",
        Origin::Local => "Lời giải từ thư viện bài mẫu",
    }
}
