pub mod answer_bank;
pub mod credential_store;
pub mod image_export;
pub mod llm_solver;
pub mod remote_solver;

pub use answer_bank::LocalAnswerBank;
pub use credential_store::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError,
};
pub use image_export::{ExportError, ImageExporter};
pub use llm_solver::LlmSolver;
pub use remote_solver::{RemoteSolver, SolveRequest, SolverError};
