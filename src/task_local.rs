use std::future::Future;
use tokio::task::{futures::TaskLocalFuture, LocalKey};

/// Represents state stored in a task-local variable.
///
/// Values are established for the duration of a future ([`Self::scope`]) or a closure
/// ([`Self::sync_scope`]); nested establishments shadow outer ones and the outer value is restored
/// when the inner scope exits, whether normally or by unwinding.
pub trait TaskLocal {
    type Value: 'static;

    fn local_key() -> &'static LocalKey<Self::Value>;

    fn try_with<U>(f: impl FnOnce(&Self::Value) -> U) -> Option<U> {
        let lk = Self::local_key();
        lk.try_with(|v| f(v)).ok()
    }

    fn try_cloned_value() -> Option<Self::Value>
    where
        Self::Value: Clone,
    {
        Self::try_with(|v| v.clone())
    }

    fn scope<F: Future>(value: Self::Value, f: F) -> TaskLocalFuture<Self::Value, F> {
        Self::local_key().scope(value, f)
    }

    fn sync_scope<U>(value: Self::Value, f: impl FnOnce() -> U) -> U {
        Self::local_key().sync_scope(value, f)
    }
}
