//! LLM 解题服务 - 业务能力层
//!
//! 只负责"把题目发给视觉大模型并解析出四步讲解"，不关心降级流程。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（默认 Gemini 的 OpenAI 兼容端点）
//! - 图片以 base64 `data:` URL 的形式附在用户消息中

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{ImageData, Solution};
use crate::services::remote_solver::{RemoteSolver, SolveRequest, SolverError};
use crate::utils::logging::truncate_text;

const SYSTEM_INSTRUCTION: &str = r#"VAI TRÒ: Bạn là "Thầy Sang (Mang Thít)" - Tác giả của ứng dụng MathMaster AI.
PHƯƠNG CHÂM: "Học hiểu bản chất - Kiến tạo tương lai".

NHIỆM VỤ: Phân tích bài toán theo quy trình 4 bước chuẩn mực của Thầy Sang:
1. analysisAndTheory: (PHÂN TÍCH & LÝ THUYẾT) Phân tích các dữ kiện, logic giải và liệt kê các công thức toán học cần áp dụng.
2. optimalMethod: (GIẢI PHÁP TỐI ƯU) Phương pháp giải nhanh nhất, mẹo bấm máy Casio hoặc cách tư duy trắc nghiệm.
3. detailedMethod: (TRÌNH BÀY CHI TIẾT) Lời giải tự luận đầy đủ các bước đại số để học sinh nộp bài trên lớp hoặc hiểu sâu kiến thức.
4. summaryNotes: (LƯU Ý & CẢNH BÁO) Chỉ ra các lỗi sai mà học sinh thường vấp phải và mẹo ghi nhớ.

YÊU CẦU:
- TẤT CẢ công thức toán học phải nằm trong cặp dấu $...$.
- Kết quả phản hồi PHẢI là JSON thuần túy theo schema:
  {"problemStatement": string,
   "analysisAndTheory": {"logic": string[], "formulas": [{"formula": string, "note": string}]},
   "optimalMethod": {"title": string, "steps": string[], "conclusion": string},
   "detailedMethod": {"title": string, "steps": string[], "conclusion": string},
   "summaryNotes": [{"wrong": string, "right": string, "tip": string}]}
- ProblemStatement: Phải trích dẫn lại đề bài chính xác.
- Giọng văn: Tận tâm, từ THPT Mang Thít."#;

const IMAGE_ONLY_PROBLEM: &str = "Hãy giải bài tập trong ảnh";

/// LLM 解题服务
///
/// 职责：
/// - 构建包含文字与图片的请求
/// - 调用 API，按失败类型分类
/// - 严格解析返回的 JSON
///
/// API key 每次请求时由调用方传入，不在服务内保存。
pub struct LlmSolver {
    api_base_url: String,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmSolver {
    /// 创建新的 LLM 解题服务
    pub fn new(config: &Config) -> Self {
        Self {
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            temperature: 0.1,
            max_tokens: 8000,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn solve_inner(&self, request: SolveRequest<'_>) -> Result<Solution, SolverError> {
        if request.credential.trim().is_empty() {
            return Err(SolverError::MissingCredential);
        }

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "题目: {} | 图片: {}",
            truncate_text(request.note_text, 80),
            request.image.map(|i| i.mime_type.as_str()).unwrap_or("无")
        );

        let openai_config = OpenAIConfig::new()
            .with_api_key(request.credential)
            .with_api_base(&self.api_base_url);
        let client = Client::with_config(openai_config);

        let chat_request = self
            .build_request(request.note_text, request.image)
            .map_err(|e| SolverError::Transport(format!("构建请求失败: {}", e)))?;

        let response = client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_api_error(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| SolverError::Malformed("LLM 返回内容为空".to_string()))?;

        parse_solution_payload(&content)
    }

    /// 构建聊天请求
    fn build_request(
        &self,
        note_text: &str,
        image: Option<&ImageData>,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_INSTRUCTION)
            .build()?;

        let prompt = build_user_prompt(note_text);

        let user_msg = match image {
            Some(image) => {
                // Vision：文字 + 图片
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText { text: prompt },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: image_data_url(image),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ),
                ];

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(
                        content_parts,
                    ))
                    .build()?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?,
        };

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
    }
}

impl RemoteSolver for LlmSolver {
    fn solve<'a>(&'a self, request: SolveRequest<'a>) -> BoxFuture<'a, Result<Solution, SolverError>> {
        self.solve_inner(request).boxed()
    }
}

/// 用户消息：文字为空时让模型直接看图
fn build_user_prompt(note_text: &str) -> String {
    let problem = if note_text.trim().is_empty() {
        IMAGE_ONLY_PROBLEM
    } else {
        note_text.trim()
    };

    format!(
        "Giải Toán THPT ngắn gọn, đúng 4 bước của Thầy Sang.\n\
         - Nhắc công thức ($...$)\n\
         - Giải nhanh & Giải chi tiết\n\
         - Ra đáp án chính xác\n\n\
         Bài toán:\n{}",
        problem
    )
}

/// `data:<mime>;base64,<payload>`
pub fn image_data_url(image: &ImageData) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type,
        BASE64.encode(&image.bytes)
    )
}

/// 把 API 错误归类
///
/// 服务端拒绝且提示与 key 有关的归为 `Unauthorized`，其余都按传输失败处理。
fn classify_api_error(err: OpenAIError) -> SolverError {
    let message = err.to_string();
    match &err {
        OpenAIError::ApiError(_) if looks_unauthorized(&message) => {
            SolverError::Unauthorized(message)
        }
        OpenAIError::JSONDeserialize(..) => SolverError::Malformed(message),
        _ => SolverError::Transport(message),
    }
}

fn looks_unauthorized(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ["api key", "api_key", "unauthorized", "unauthenticated", "permission_denied", "401", "403"]
        .iter()
        .any(|needle| lowered.contains(needle))
}

/// 解析模型返回的文本为 `Solution`
///
/// 模型有时会用 Markdown 代码块包裹 JSON，或在前后加说明文字，
/// 这里取第一个 `{` 到最后一个 `}` 之间的内容。
pub fn parse_solution_payload(text: &str) -> Result<Solution, SolverError> {
    let body = extract_json_object(text).ok_or_else(|| {
        warn!("JSON_PARSE_ERROR: {}", truncate_text(text, 200));
        SolverError::Malformed("返回内容中没有 JSON 对象".to_string())
    })?;

    let solution: Solution = serde_json::from_str(body).map_err(|e| {
        warn!("JSON_PARSE_ERROR: {}", e);
        SolverError::Malformed(e.to_string())
    })?;

    solution
        .validate()
        .map_err(|defect| SolverError::Malformed(defect.to_string()))?;

    Ok(solution)
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "problemStatement": "Giải $x + 1 = 2$",
        "analysisAndTheory": { "logic": ["Chuyển vế"], "formulas": [] },
        "optimalMethod": { "title": "Nhẩm", "steps": ["$x = 1$"], "conclusion": "$x = 1$" },
        "detailedMethod": { "title": "Tự luận", "steps": ["$x = 2 - 1 = 1$"], "conclusion": "$x = 1$" },
        "summaryNotes": [{ "wrong": "Quên đổi dấu", "right": "$x = 2 - 1$", "tip": "Chuyển vế đổi dấu" }]
    }"#;

    fn create_test_solver() -> LlmSolver {
        LlmSolver::new(&Config::default())
    }

    #[test]
    fn test_parse_plain_payload() {
        let solution = parse_solution_payload(PAYLOAD).unwrap();
        assert_eq!(solution.problem_statement, "Giải $x + 1 = 2$");
        assert_eq!(solution.summary_notes.len(), 1);
    }

    #[test]
    fn test_parse_fenced_payload() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        assert!(parse_solution_payload(&fenced).is_ok());
    }

    #[test]
    fn test_parse_payload_missing_field_is_malformed() {
        let broken = PAYLOAD.replace("\"optimalMethod\"", "\"otherMethod\"");
        assert!(matches!(
            parse_solution_payload(&broken),
            Err(SolverError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_non_json_is_malformed() {
        assert!(matches!(
            parse_solution_payload("Xin lỗi, tôi không đọc được ảnh."),
            Err(SolverError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_unbalanced_math_is_malformed() {
        let broken = PAYLOAD.replace("$x = 2 - 1 = 1$", "$x = 2 - 1 = 1");
        assert!(matches!(
            parse_solution_payload(&broken),
            Err(SolverError::Malformed(_))
        ));
    }

    #[test]
    fn test_image_data_url() {
        let image = ImageData::new(b"abc".to_vec(), "image/png");
        assert_eq!(image_data_url(&image), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_user_prompt_falls_back_to_image() {
        assert!(build_user_prompt("  ").ends_with(IMAGE_ONLY_PROBLEM));
        assert!(build_user_prompt("đạo hàm").ends_with("đạo hàm"));
    }

    #[test]
    fn test_looks_unauthorized() {
        assert!(looks_unauthorized("API key not valid. Please pass a valid API key."));
        assert!(looks_unauthorized("status 401"));
        assert!(!looks_unauthorized("model overloaded"));
    }

    #[test]
    fn test_build_request_with_image() {
        let solver = create_test_solver();
        let image = ImageData::new(vec![1, 2, 3], "image/jpeg");
        let request = solver.build_request("", Some(&image)).unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.model, solver.model_name());
    }

    #[tokio::test]
    async fn test_blank_credential_is_rejected_without_network() {
        let solver = create_test_solver();
        let request = SolveRequest {
            note_text: "đạo hàm",
            image: None,
            credential: "  ",
        };
        assert_eq!(
            solver.solve(request).await,
            Err(SolverError::MissingCredential)
        );
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_live_solve -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_solve() {
        let _ = tracing_subscriber::fmt::try_init();

        let key = std::env::var("LLM_API_KEY").expect("需要设置 LLM_API_KEY");
        let solver = create_test_solver();

        let result = solver
            .solve(SolveRequest {
                note_text: "Tính đạo hàm của $y = x^3 - 3x$",
                image: None,
                credential: &key,
            })
            .await;

        match result {
            Ok(solution) => {
                println!("{:#?}", solution);
                assert!(!solution.detailed_method.steps.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
