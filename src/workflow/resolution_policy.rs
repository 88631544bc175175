//! 解析策略 - 流程层
//!
//! 核心职责：决定一次提交由谁来回答
//!
//! 流程顺序：
//! 1. 校验提交（空提交停在 Idle）
//! 2. 有 API key → 远程服务（带超时）
//! 3. 远程失败或没有 API key → 本地题库
//! 4. 都没有结果 → Failed，按原因给出不同文案
//!
//! 同一时间只允许一个请求在途；`reset` 会让在途请求作废，
//! 作废请求的结果按代数核对后丢弃。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::models::{FailureReason, Origin, RequestState, Solution, Submission};
use crate::services::{
    Credential, CredentialStore, LocalAnswerBank, RemoteSolver, SolveRequest, SolverError,
};
use crate::workflow::request_ctx::RequestCtx;

/// 远程调用的默认超时
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// 解析请求被拒绝或作废
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// 既没有文字也没有图片
    #[error("提交内容为空")]
    EmptySubmission,
    /// 已有请求在途
    #[error("已有题目正在解析")]
    Busy,
    /// 请求在途期间被重置或被新的提交取代
    #[error("请求 #{generation} 已作废")]
    Cancelled { generation: u64 },
}

impl ResolveError {
    /// 面向学生的提示文案
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::EmptySubmission => {
                "Em hãy tải ảnh bài toán lên hoặc nhập đề bài trước nhé!"
            }
            ResolveError::Busy => "Thầy đang giải bài trước, em đợi một chút nhé!",
            ResolveError::Cancelled { .. } => "Yêu cầu đã được hủy.",
        }
    }
}

#[derive(Debug, Default)]
struct Machine {
    generation: u64,
    state: RequestState,
}

/// 解析策略
///
/// - 持有远程服务、凭据存储、本地题库三项能力
/// - 只读凭据，不修改凭据与题库
/// - 唯一的挂起点是远程调用
pub struct ResolutionPolicy {
    solver: Arc<dyn RemoteSolver>,
    credentials: Arc<dyn CredentialStore>,
    bank: Arc<LocalAnswerBank>,
    remote_timeout: Duration,
    machine: Mutex<Machine>,
}

impl ResolutionPolicy {
    pub fn new(
        solver: Arc<dyn RemoteSolver>,
        credentials: Arc<dyn CredentialStore>,
        bank: Arc<LocalAnswerBank>,
    ) -> Self {
        Self {
            solver,
            credentials,
            bank,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            machine: Mutex::new(Machine::default()),
        }
    }

    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    /// 当前状态快照
    pub fn state(&self) -> RequestState {
        self.lock().state.clone()
    }

    pub fn bank(&self) -> &LocalAnswerBank {
        &self.bank
    }

    /// 当前代数
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// 回到 Idle，在途请求作废
    pub fn reset(&self) {
        let mut machine = self.lock();
        machine.generation += 1;
        if machine.state.is_resolving() {
            info!("请求 #{} 在途时被重置", machine.generation - 1);
        }
        machine.state = RequestState::Idle;
    }

    /// 解析一次提交
    ///
    /// # 返回
    /// - `Ok(Resolved | Failed)`：本次请求的终态
    /// - `Err(EmptySubmission)`：空提交，状态停在 Idle
    /// - `Err(Busy)`：已有请求在途，状态不变
    /// - `Err(Cancelled)`：在途期间被重置或取代，结果已丢弃
    pub async fn resolve(&self, submission: Submission) -> Result<RequestState, ResolveError> {
        let in_flight = InFlight {
            policy: self,
            ctx: self.begin(&submission)?,
        };
        let ctx = &in_flight.ctx;
        info!("{} 开始解析: {}", ctx, ctx.note_preview);

        let remote_failure = match self.read_credential() {
            Some(credential) => match self.try_remote(ctx, &submission, &credential).await {
                Ok(solution) => {
                    info!("{} ✓ 远程服务返回讲解", ctx);
                    return self.commit(
                        ctx,
                        RequestState::Resolved {
                            solution,
                            origin: Origin::Remote,
                        },
                    );
                }
                Err(e) => {
                    warn!("{} ⚠️ 远程服务失败，降级到本地题库: {}", ctx, e);
                    self.ensure_current(ctx)?;
                    Some(e)
                }
            },
            None => {
                info!("{} 未配置 API key，直接查本地题库", ctx);
                None
            }
        };

        let next = match self.bank.lookup_entry(submission.note_text()) {
            Some(entry) => {
                info!("{} ✓ 本地题库命中: {}", ctx, entry.topic);
                RequestState::Resolved {
                    solution: entry.solution.clone(),
                    origin: Origin::Local,
                }
            }
            None => {
                let reason = failure_reason(remote_failure.as_ref());
                warn!("{} 本地题库未命中，结束: {}", ctx, reason);
                RequestState::Failed(reason)
            }
        };

        self.commit(ctx, next)
    }

    fn lock(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle → Resolving，分配新的代数
    fn begin(&self, submission: &Submission) -> Result<RequestCtx, ResolveError> {
        let mut machine = self.lock();

        if machine.state.is_resolving() {
            debug!("请求 #{} 在途，拒绝新的提交", machine.generation);
            return Err(ResolveError::Busy);
        }

        machine.generation += 1;
        machine.state = RequestState::Idle;

        if submission.is_empty() {
            debug!("空提交，停在 Idle");
            return Err(ResolveError::EmptySubmission);
        }

        machine.state = RequestState::Resolving;
        Ok(RequestCtx::new(machine.generation, submission))
    }

    fn read_credential(&self) -> Option<Credential> {
        match self.credentials.get() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("读取 API key 失败，按未配置处理: {}", e);
                None
            }
        }
    }

    async fn try_remote(
        &self,
        ctx: &RequestCtx,
        submission: &Submission,
        credential: &Credential,
    ) -> Result<Solution, SolverError> {
        debug!("{} 调用远程服务，超时 {:?}", ctx, self.remote_timeout);

        let request = SolveRequest {
            note_text: submission.note_text(),
            image: submission.image(),
            credential: credential.expose(),
        };

        let solution = match timeout(self.remote_timeout, self.solver.solve(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(SolverError::Timeout(self.remote_timeout)),
        };

        solution
            .validate()
            .map_err(|defect| SolverError::Malformed(defect.to_string()))?;

        Ok(solution)
    }

    fn ensure_current(&self, ctx: &RequestCtx) -> Result<(), ResolveError> {
        if self.lock().generation == ctx.generation {
            Ok(())
        } else {
            debug!("{} 已作废", ctx);
            Err(ResolveError::Cancelled {
                generation: ctx.generation,
            })
        }
    }

    /// Resolving → 终态；代数不匹配时丢弃
    fn commit(&self, ctx: &RequestCtx, next: RequestState) -> Result<RequestState, ResolveError> {
        let mut machine = self.lock();

        if machine.generation != ctx.generation {
            debug!(
                "{} 已作废（当前代数 #{}），丢弃结果: {}",
                ctx,
                machine.generation,
                next.label()
            );
            return Err(ResolveError::Cancelled {
                generation: ctx.generation,
            });
        }

        debug!("{} {} → {}", ctx, machine.state.label(), next.label());
        machine.state = next.clone();
        Ok(next)
    }
}

/// 在途请求守卫
///
/// `resolve` 的 future 在提交前被丢弃（abort、外层超时、select）时，
/// 若该请求仍是当前代数且停在 Resolving，则退回 Idle 并作废。
struct InFlight<'a> {
    policy: &'a ResolutionPolicy,
    ctx: RequestCtx,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut machine = self.policy.lock();
        if machine.generation == self.ctx.generation && machine.state.is_resolving() {
            warn!("{} 未完成即被丢弃，回到 Idle", self.ctx);
            machine.generation += 1;
            machine.state = RequestState::Idle;
        }
    }
}

/// 本地题库未命中时的失败原因
fn failure_reason(remote_failure: Option<&SolverError>) -> FailureReason {
    match remote_failure {
        None | Some(SolverError::MissingCredential) => FailureReason::NoMatch,
        Some(e) if e.is_unauthorized() => FailureReason::CredentialRejected,
        Some(_) => FailureReason::RemoteAndLocalFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_mapping() {
        assert_eq!(failure_reason(None), FailureReason::NoMatch);
        assert_eq!(
            failure_reason(Some(&SolverError::Unauthorized("401".to_string()))),
            FailureReason::CredentialRejected
        );
        assert_eq!(
            failure_reason(Some(&SolverError::Transport("dns".to_string()))),
            FailureReason::RemoteAndLocalFailed
        );
        assert_eq!(
            failure_reason(Some(&SolverError::Timeout(DEFAULT_REMOTE_TIMEOUT))),
            FailureReason::RemoteAndLocalFailed
        );
        assert_eq!(
            failure_reason(Some(&SolverError::Malformed("json".to_string()))),
            FailureReason::RemoteAndLocalFailed
        );
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_REMOTE_TIMEOUT, Duration::from_secs(30));
    }
}
