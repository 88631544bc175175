//! # Math Guru
//!
//! 数学辅导核心：学生提交题目（文字 / 图片），得到四步讲解
//!
//! ## 架构设计
//!
//! 本系统沿用分层结构：
//!
//! ### ① 数据模型（Models）
//! - `models/` - 提交、讲解、请求状态，以及题库 / 图片加载
//! - `RequestState` - Idle / Resolving / Resolved / Failed
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `RemoteSolver` / `LlmSolver` - 远程 AI 讲解能力
//! - `LocalAnswerBank` - 本地题库（关键词匹配）
//! - `CredentialStore` - API key 存取能力
//! - `ImageExporter` - 详细解答导出为图片
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整处理流程
//! - `ResolutionPolicy` - 远程优先 → 本地题库 → 失败
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 组装各项能力，对外提供提交 / 重置 / 导出
//!
//! ### 展示（Views）
//! - `views/` - 只消费 `RequestState`，输出终端文本或导出用 HTML

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod views;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{FailureReason, ImageData, Origin, RequestState, Solution, Submission};
pub use orchestrator::App;
pub use services::{
    CredentialStore, LocalAnswerBank, RemoteSolver, SolveRequest, SolverError,
};
pub use workflow::{ResolutionPolicy, ResolveError};
