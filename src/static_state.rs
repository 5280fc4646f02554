use std::sync::OnceLock;

/// Access to process-wide state held in a `static` [`OnceLock`].
pub trait StaticState<S: 'static> {
    fn get_static() -> &'static OnceLock<S>;

    /// Returns the state, initializing it with [`Default::default`] on first access.
    fn state() -> &'static S
    where
        S: Default,
    {
        Self::get_static().get_or_init(S::default)
    }
}

#[cfg(test)]
mod test {
    use super::StaticState;
    use std::sync::OnceLock;

    struct Counter;

    impl StaticState<Vec<u32>> for Counter {
        fn get_static() -> &'static OnceLock<Vec<u32>> {
            static STATE: OnceLock<Vec<u32>> = OnceLock::new();
            &STATE
        }
    }

    #[test]
    fn test_init_once() {
        assert!(Counter::get_static().get().is_none());
        let first = Counter::state();
        assert!(first.is_empty());
        assert!(std::ptr::eq(first, Counter::state()));
    }
}
