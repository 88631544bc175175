pub mod request_ctx;
pub mod resolution_policy;

pub use request_ctx::RequestCtx;
pub use resolution_policy::{ResolutionPolicy, ResolveError, DEFAULT_REMOTE_TIMEOUT};
