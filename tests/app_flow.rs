use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use math_guru::services::{
    ExportError, LocalAnswerBank, MemoryCredentialStore, RemoteSolver, SolveRequest,
    SolverError,
};
use math_guru::error::FileError;
use math_guru::{App, AppError, Config, Origin, ResolveError, Solution, Submission};

/// 总是拒绝 API key 的远程服务
struct RejectingSolver;

impl RemoteSolver for RejectingSolver {
    fn solve<'a>(
        &'a self,
        _request: SolveRequest<'a>,
    ) -> BoxFuture<'a, Result<Solution, SolverError>> {
        async { Err(SolverError::Unauthorized("401".to_string())) }.boxed()
    }
}

fn test_app() -> App {
    App::with_parts(
        Config::default(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(RejectingSolver),
        LocalAnswerBank::builtin(),
    )
}

#[tokio::test]
async fn test_submit_then_reset() {
    let app = test_app();
    assert!(app.state().is_idle());

    let state = app
        .submit(Submission::text("Cho cấp số cộng có u1 = 2, d = 3"))
        .await
        .unwrap();
    assert_eq!(state.origin(), Some(Origin::Local));
    assert_eq!(app.state(), state);

    app.reset();
    assert!(app.state().is_idle());
}

#[tokio::test]
async fn test_empty_submission_is_reported() {
    let app = test_app();
    let err = app.submit(Submission::text("")).await.unwrap_err();

    assert!(matches!(err, AppError::Resolve(ResolveError::EmptySubmission)));
    assert!(app.state().is_idle());
}

#[tokio::test]
async fn test_credential_settings() {
    let app = test_app();
    assert!(!app.credential_configured());

    assert!(app.save_credential("   ").is_err());
    assert!(!app.credential_configured());

    app.save_credential("  sk-abc  ").unwrap();
    assert!(app.credential_configured());

    // 被拒绝的 key 仍然可以用本地题库
    let state = app.submit(Submission::text("đạo hàm")).await.unwrap();
    assert_eq!(state.origin(), Some(Origin::Local));

    app.clear_credential().unwrap();
    assert!(!app.credential_configured());
}

#[tokio::test]
async fn test_export_without_solution() {
    let app = test_app();
    let err = app.export_current().await.unwrap_err();

    assert!(matches!(err, AppError::Export(ExportError::NothingToExport)));
    assert!(app.state().is_idle());
}

#[tokio::test]
async fn test_missing_bank_file_fails_initialize() {
    let config = Config {
        answer_bank_file: Some("does/not/exist/bank.toml".to_string()),
        ..Config::default()
    };

    let err = App::initialize(config).await.err().unwrap();

    assert!(matches!(
        err,
        AppError::File(FileError::BankParseFailed { ref path, .. }) if path == "does/not/exist/bank.toml"
    ));
}
