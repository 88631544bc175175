pub mod bank_entry;
pub mod loaders;
pub mod solution;
pub mod state;
pub mod submission;

pub use bank_entry::BankEntry;
pub use loaders::{load_answer_bank_toml, load_image};
pub use solution::{
    AnalysisAndTheory, DetailedMethod, OptimalMethod, Solution, SolutionDefect, SummaryNote,
    TheoryPoint,
};
pub use state::{FailureReason, Origin, RequestState};
pub use submission::{ImageData, Submission};
