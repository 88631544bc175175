//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 组装各项能力，对外提供"一个学生会话"所需的全部操作。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (配置、凭据、导出)
//!     ↓
//! workflow::ResolutionPolicy (单次提交的解析流程)
//!     ↓
//! services (能力层：remote solver / answer bank / credential store / export)
//!     ↓
//! models (Submission / Solution / RequestState)
//! ```

pub mod app;

pub use app::App;
