//! 四步讲解结果
//!
//! 远程服务返回的 JSON 与本地题库都使用同一结构（camelCase 字段名）。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 行内公式分隔符
pub const MATH_DELIMITER: char = '$';

/// 公式 + 说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryPoint {
    pub formula: String,
    pub note: String,
}

/// 第一步：分析与理论
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisAndTheory {
    pub logic: Vec<String>,
    pub formulas: Vec<TheoryPoint>,
}

/// 第二步：最优解法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimalMethod {
    pub title: String,
    pub steps: Vec<String>,
    pub conclusion: String,
}

/// 第三步：详细解答
///
/// 导出图片时使用的就是这一部分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedMethod {
    pub title: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

/// 第四步：易错点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryNote {
    pub wrong: String,
    pub right: String,
    pub tip: String,
}

/// 完整的四步讲解
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub problem_statement: String,
    pub analysis_and_theory: AnalysisAndTheory,
    pub optimal_method: OptimalMethod,
    pub detailed_method: DetailedMethod,
    pub summary_notes: Vec<SummaryNote>,
}

/// 讲解结构不合法的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolutionDefect {
    #[error("题目陈述为空")]
    EmptyProblemStatement,
    #[error("字段 {field} 的公式分隔符 `$` 不成对: {text}")]
    UnbalancedMath { field: String, text: String },
}

impl Solution {
    /// 检查讲解是否满足渲染约定
    ///
    /// 五个顶层字段由反序列化保证存在，这里检查：
    /// - 题目陈述非空
    /// - 每个字符串字段中的 `$` 成对出现
    pub fn validate(&self) -> Result<(), SolutionDefect> {
        if self.problem_statement.trim().is_empty() {
            return Err(SolutionDefect::EmptyProblemStatement);
        }

        for (field, text) in self.text_fields() {
            if !is_math_balanced(text) {
                return Err(SolutionDefect::UnbalancedMath {
                    field,
                    text: text.to_string(),
                });
            }
        }

        Ok(())
    }

    /// 导出图片用的详细解答视图
    pub fn export_view(&self) -> &DetailedMethod {
        &self.detailed_method
    }

    /// 按 (字段路径, 文本) 列出所有字符串字段
    fn text_fields(&self) -> Vec<(String, &str)> {
        let mut fields = vec![("problemStatement".to_string(), self.problem_statement.as_str())];

        let theory = &self.analysis_and_theory;
        for (i, line) in theory.logic.iter().enumerate() {
            fields.push((format!("analysisAndTheory.logic[{}]", i), line.as_str()));
        }
        for (i, point) in theory.formulas.iter().enumerate() {
            fields.push((format!("analysisAndTheory.formulas[{}].formula", i), point.formula.as_str()));
            fields.push((format!("analysisAndTheory.formulas[{}].note", i), point.note.as_str()));
        }

        let optimal = &self.optimal_method;
        fields.push(("optimalMethod.title".to_string(), optimal.title.as_str()));
        for (i, step) in optimal.steps.iter().enumerate() {
            fields.push((format!("optimalMethod.steps[{}]", i), step.as_str()));
        }
        fields.push(("optimalMethod.conclusion".to_string(), optimal.conclusion.as_str()));

        let detailed = &self.detailed_method;
        fields.push(("detailedMethod.title".to_string(), detailed.title.as_str()));
        for (i, step) in detailed.steps.iter().enumerate() {
            fields.push((format!("detailedMethod.steps[{}]", i), step.as_str()));
        }
        if let Some(conclusion) = &detailed.conclusion {
            fields.push(("detailedMethod.conclusion".to_string(), conclusion.as_str()));
        }

        for (i, note) in self.summary_notes.iter().enumerate() {
            fields.push((format!("summaryNotes[{}].wrong", i), note.wrong.as_str()));
            fields.push((format!("summaryNotes[{}].right", i), note.right.as_str()));
            fields.push((format!("summaryNotes[{}].tip", i), note.tip.as_str()));
        }

        fields
    }
}

/// `$` 的个数为偶数
pub fn is_math_balanced(text: &str) -> bool {
    text.chars().filter(|&c| c == MATH_DELIMITER).count() % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "problemStatement": "Tính $1 + 1$",
        "analysisAndTheory": {
            "logic": ["Cộng hai số"],
            "formulas": [{ "formula": "$a + b$", "note": "Phép cộng" }]
        },
        "optimalMethod": {
            "title": "Nhẩm",
            "steps": ["$1 + 1 = 2$"],
            "conclusion": "$2$"
        },
        "detailedMethod": {
            "title": "Trình bày",
            "steps": ["Ta có $1 + 1 = 2$."]
        },
        "summaryNotes": []
    }"#;

    #[test]
    fn test_parse_camel_case_payload() {
        let solution: Solution = serde_json::from_str(SAMPLE_JSON).unwrap();
        assert_eq!(solution.problem_statement, "Tính $1 + 1$");
        assert_eq!(solution.detailed_method.conclusion, None);
        assert!(solution.summary_notes.is_empty());
        assert!(solution.validate().is_ok());
    }

    #[test]
    fn test_missing_top_level_field_fails_to_parse() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_JSON).unwrap();
        value.as_object_mut().unwrap().remove("optimalMethod");
        assert!(serde_json::from_value::<Solution>(value).is_err());
    }

    #[test]
    fn test_unbalanced_math_is_rejected() {
        let mut solution: Solution = serde_json::from_str(SAMPLE_JSON).unwrap();
        solution.detailed_method.steps.push("Ta có $x^2".to_string());

        match solution.validate() {
            Err(SolutionDefect::UnbalancedMath { field, .. }) => {
                assert_eq!(field, "detailedMethod.steps[1]");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_blank_problem_statement_is_rejected() {
        let mut solution: Solution = serde_json::from_str(SAMPLE_JSON).unwrap();
        solution.problem_statement = "  ".to_string();
        assert_eq!(
            solution.validate(),
            Err(SolutionDefect::EmptyProblemStatement)
        );
    }

    #[test]
    fn test_optional_conclusion_is_not_serialized_when_absent() {
        let solution: Solution = serde_json::from_str(SAMPLE_JSON).unwrap();
        let json = serde_json::to_value(solution.export_view()).unwrap();
        assert!(json.get("conclusion").is_none());
        assert_eq!(json["title"], "Trình bày");
    }
}
