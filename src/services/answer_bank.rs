//! 本地题库 - 业务能力层
//!
//! 只负责"按关键词查找预置讲解"能力，不做任何 I/O。
//!
//! 匹配规则：备注文字转小写后做子串匹配，按条目声明顺序扫描，
//! 第一条命中任一关键词的条目胜出。

use phf::phf_ordered_map;
use tracing::debug;

use crate::models::{
    AnalysisAndTheory, BankEntry, DetailedMethod, OptimalMethod, Solution, SummaryNote,
    TheoryPoint,
};

const DAO_HAM_KEYWORDS: &[&str] = &["đạo hàm", "phân thức"];
const XAC_SUAT_KEYWORDS: &[&str] = &["xác suất", "bi xanh", "bi đỏ"];
const CAP_SO_CONG_KEYWORDS: &[&str] = &["cấp số cộng"];

/// 主题 → (关键词, 讲解构造函数)
type TopicSeed = (&'static [&'static str], fn() -> Solution);

/// 内置主题表，迭代顺序即优先级
static BUILTIN_TOPICS: phf::OrderedMap<&'static str, TopicSeed> = phf_ordered_map! {
    "dao_ham" => (DAO_HAM_KEYWORDS, derivative_solution as fn() -> Solution),
    "xac_suat" => (XAC_SUAT_KEYWORDS, probability_solution as fn() -> Solution),
    "cap_so_cong" => (CAP_SO_CONG_KEYWORDS, arithmetic_progression_solution as fn() -> Solution),
};

/// 本地题库
///
/// 进程生命周期内只读。
#[derive(Debug, Clone)]
pub struct LocalAnswerBank {
    entries: Vec<BankEntry>,
}

impl LocalAnswerBank {
    /// 只包含内置条目的题库
    pub fn builtin() -> Self {
        let entries = BUILTIN_TOPICS
            .entries()
            .map(|(topic, (keywords, solution))| BankEntry::new(*topic, keywords, solution()))
            .collect();

        Self { entries }
    }

    /// 追加条目，追加的条目优先级低于已有条目
    pub fn extend(mut self, entries: impl IntoIterator<Item = BankEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.topic.as_str())
    }

    /// 查找匹配的条目
    pub fn lookup_entry(&self, note_text: &str) -> Option<&BankEntry> {
        let lowered = note_text.to_lowercase();
        let hit = self.entries.iter().find(|entry| entry.matches(&lowered));

        match hit {
            Some(entry) => debug!("本地题库命中主题: {}", entry.topic),
            None => debug!("本地题库未命中"),
        }

        hit
    }

    /// 查找匹配的讲解
    pub fn lookup(&self, note_text: &str) -> Option<&Solution> {
        self.lookup_entry(note_text).map(|entry| &entry.solution)
    }

    /// 查找匹配的主题标签
    pub fn lookup_topic(&self, note_text: &str) -> Option<&str> {
        self.lookup_entry(note_text).map(|entry| entry.topic.as_str())
    }
}

impl Default for LocalAnswerBank {
    fn default() -> Self {
        Self::builtin()
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn theory(formula: &str, note: &str) -> TheoryPoint {
    TheoryPoint {
        formula: formula.to_string(),
        note: note.to_string(),
    }
}

fn derivative_solution() -> Solution {
    Solution {
        problem_statement: "Tính đạo hàm của hàm số $y = \\frac{2x+1}{x-1}$".to_string(),
        analysis_and_theory: AnalysisAndTheory {
            logic: lines(&[
                "Đề bài → Hàm số phân thức bậc nhất trên bậc nhất",
                "Xác định dữ kiện → Tử $u=2x+1$, Mẫu $v=x-1$",
                "Nhận dạng → Dạng thương $\\left(\\frac{u}{v}\\right)'$",
                "Lộ trình → Tìm điều kiện → Tính $u', v'$ → Ráp công thức",
            ]),
            formulas: vec![
                theory(
                    "$\\left(\\frac{u}{v}\\right)' = \\frac{u'v - uv'}{v^2}$",
                    "Quy tắc đạo hàm của một thương",
                ),
                theory(
                    "$\\left(\\frac{ax+b}{cx+d}\\right)' = \\frac{ad-bc}{(cx+d)^2}$",
                    "Mẹo tính nhanh hàm bậc nhất",
                ),
            ],
        },
        optimal_method: OptimalMethod {
            title: "Phương pháp 1: Tính nhanh trắc nghiệm (Tối ưu)".to_string(),
            steps: lines(&[
                "Bước 1: Điều kiện $x \\neq 1$.",
                "Bước 2: Sắp xếp hệ số: $a=2, b=1, c=1, d=-1$.",
                "Bước 3: Tính định thức $ad-bc = 2(-1) - 1(1) = -3$.",
                "Bước 4: Ráp vào mẫu bình phương.",
            ]),
            conclusion: "$y' = \\frac{-3}{(x-1)^2}$".to_string(),
        },
        detailed_method: DetailedMethod {
            title: "Phương pháp 2: Biến đổi đại số (Tư duy kiểm chứng)".to_string(),
            steps: lines(&[
                "Bước 1: Tách tử số theo mẫu: $2x+1 = 2(x-1) + 3$.",
                "Bước 2: Chia tử cho mẫu: $y = 2 + \\frac{3}{x-1}$.",
                "Bước 3: Đạo hàm từng phần: $(2)' = 0$; $\\left(\\frac{3}{x-1}\\right)' = 3 \\cdot \\frac{-1}{(x-1)^2}$.",
            ]),
            conclusion: Some("$y' = -\\frac{3}{(x-1)^2}$".to_string()),
        },
        summary_notes: vec![SummaryNote {
            wrong: "Quên không bình phương mẫu số khi giải tự luận.".to_string(),
            right: "Mẫu số luôn là $(x-1)^2$.".to_string(),
            tip: "Hàm bậc nhất/bậc nhất luôn đơn điệu (không có cực trị).".to_string(),
        }],
    }
}

fn probability_solution() -> Solution {
    Solution {
        problem_statement: "Một hộp có 5 bi xanh và 3 bi đỏ. Lấy ngẫu nhiên 2 bi. Tính xác suất lấy được 2 bi cùng màu.".to_string(),
        analysis_and_theory: AnalysisAndTheory {
            logic: lines(&[
                "Đề bài → Chọn 2 từ 8 bi (không thứ tự)",
                "Xác định → Không gian mẫu $n(\\Omega) = C_8^2$",
                "Biến cố $A$ → Lấy 2 xanh HOẶC 2 đỏ",
                "Lộ trình → Tính $n(\\Omega)$ → Tính $n(A)$ → Lập tỉ số",
            ]),
            formulas: vec![
                theory(
                    "$P(A) = \\frac{n(A)}{n(\\Omega)}$",
                    "Định nghĩa xác suất cổ điển",
                ),
                theory(
                    "$C_n^k = \\frac{n!}{k!(n-k)!}$",
                    "Công thức tổ hợp (chọn không thứ tự)",
                ),
            ],
        },
        optimal_method: OptimalMethod {
            title: "Phương pháp 1: Liệt kê trực tiếp biến cố (Tối ưu)".to_string(),
            steps: lines(&[
                "Bước 1: Không gian mẫu $n(\\Omega) = C_8^2 = 28$.",
                "Bước 2: Trường hợp 1: Lấy 2 bi xanh $\\implies C_5^2 = 10$.",
                "Bước 3: Trường hợp 2: Lấy 2 bi đỏ $\\implies C_3^2 = 3$.",
                "Bước 4: $n(A) = 10 + 3 = 13$.",
            ]),
            conclusion: "$P(A) = \\frac{13}{28}$".to_string(),
        },
        detailed_method: DetailedMethod {
            title: "Phương pháp 2: Dùng biến cố đối (Kiểm chứng)".to_string(),
            steps: lines(&[
                "Bước 1: Biến cố đối $\\overline{A}$ là lấy 2 bi khác màu.",
                "Bước 2: Số cách chọn 2 bi khác màu: $C_5^1 \\cdot C_3^1 = 5 \\cdot 3 = 15$.",
                "Bước 3: $P(\\overline{A}) = \\frac{15}{28}$.",
                "Bước 4: $P(A) = 1 - P(\\overline{A}) = 1 - \\frac{15}{28}$.",
            ]),
            conclusion: Some("$P(A) = \\frac{13}{28}$".to_string()),
        },
        summary_notes: vec![SummaryNote {
            wrong: "Dùng chỉnh hợp $A_n^k$ thay vì tổ hợp $C_n^k$.".to_string(),
            right: "Lấy bi cùng lúc không quan trọng thứ tự $\\implies$ dùng $C$.".to_string(),
            tip: "Hãy nhớ: Lấy lần lượt thì dùng $A$, lấy cùng lúc thì dùng $C$.".to_string(),
        }],
    }
}

fn arithmetic_progression_solution() -> Solution {
    Solution {
        problem_statement: "Bài toán về cấp số cộng.".to_string(),
        analysis_and_theory: AnalysisAndTheory {
            logic: lines(&[
                "Đây là dạng toán cấp số cộng.",
                "Cần xác định số hạng đầu $u_1$ và công sai $d$.",
            ]),
            formulas: vec![
                theory("$u_n = u_1 + (n-1)d$", "Số hạng tổng quát"),
                theory("$S_n = \\frac{n(u_1+u_n)}{2}$", "Tổng cấp số cộng"),
            ],
        },
        optimal_method: OptimalMethod {
            title: "Cách giải nhanh".to_string(),
            steps: lines(&[
                "Xác định $u_1$ và $d$.",
                "Áp dụng công thức cấp số cộng.",
                "Tính ra kết quả.",
            ]),
            conclusion: "Hoàn thành bài toán.".to_string(),
        },
        detailed_method: DetailedMethod {
            title: "Lời giải chi tiết".to_string(),
            steps: lines(&[
                "Xác định dạng toán.",
                "Viết công thức $u_n = u_1 + (n-1)d$.",
                "Thay số và tính.",
            ]),
            conclusion: None,
        },
        summary_notes: Vec::new(),
    }
}
