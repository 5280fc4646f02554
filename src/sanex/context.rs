use super::{SuppressionPolicy, NOOP_SANITIZATION};
use crate::task_local::TaskLocal;
use std::future::Future;
use tokio::task::LocalKey;

tokio::task_local! {
    static SANITIZATION_LEVEL: SuppressionPolicy;
}

/// Task-local holder of the ambient sanitization level.
pub struct SanitizationLevel;

impl TaskLocal for SanitizationLevel {
    type Value = SuppressionPolicy;

    fn local_key() -> &'static LocalKey<Self::Value> {
        &SANITIZATION_LEVEL
    }
}

/// The policy established by the innermost enclosing scope on this task or thread, or
/// [`NOOP_SANITIZATION`] if there is none.
pub fn current_sanitization_level() -> SuppressionPolicy {
    SanitizationLevel::try_cloned_value().unwrap_or(NOOP_SANITIZATION)
}

/// Runs `f` with `policy` as the ambient level. Other tasks are unaffected, including tasks
/// spawned from within `f`; see [`inherit_sanitization_level`].
pub async fn with_sanitization_level<F: Future>(policy: SuppressionPolicy, f: F) -> F::Output {
    SanitizationLevel::scope(policy, f).await
}

/// Synchronous counterpart of [`with_sanitization_level`].
pub fn sync_with_sanitization_level<U>(policy: SuppressionPolicy, f: impl FnOnce() -> U) -> U {
    SanitizationLevel::sync_scope(policy, f)
}

/// Wraps `f` so that it runs with the caller's current level, typically before spawning it.
pub fn inherit_sanitization_level<F: Future>(f: F) -> impl Future<Output = F::Output> {
    SanitizationLevel::scope(current_sanitization_level(), f)
}
