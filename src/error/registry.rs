use super::{
    Constructor, Data, Error, ErrorFormSpec, FormKeys, FormRef, Key, MetadataFn, RaiseSite, Result,
};
use crate::StaticState;
use dashmap::DashMap;
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, OnceLock},
};

//===========================
// region:      --- Registry

/// Shared mapping from tag to error form. Cloning yields another handle on the same mapping.
///
/// Registration is last-writer-wins: registering under an existing tag replaces the binding, and
/// handles that look the tag up afterwards observe the new form. There is no removal; an injected
/// registry goes away with its last handle.
#[derive(Clone, Default)]
pub struct Registry {
    forms: Arc<DashMap<String, Arc<super::ErrorForm>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`FormRef`]'s plain `Deserialize` impl.
    pub fn global() -> &'static Registry {
        GlobalRegistry::state()
    }

    /// Creates the form described by `spec`, binds it to its tag, and returns a handle on it.
    pub fn register(&self, spec: ErrorFormSpec) -> FormRef {
        let form = Arc::new(spec.build());
        let tag = form.tag().to_owned();
        let replaced = self.forms.insert(tag.clone(), form.clone());
        match replaced {
            Some(prev) => log::info!(
                "replaced error form {tag} (previous registration had {} raise sites)",
                prev.raise_count()
            ),
            None => log::debug!("registered error form {tag}"),
        }
        FormRef::new(form)
    }

    /// Positional form of [`Self::register`]; `None` for `constructor` selects
    /// [`super::ErrorForm::default_constructor`].
    pub fn register_form(
        &self,
        tag: impl Into<String>,
        keys: FormKeys,
        constructor: Option<Constructor>,
        metadata_fns: HashMap<Key, MetadataFn>,
    ) -> FormRef {
        let mut spec = ErrorFormSpec::new(tag)
            .with_keys(keys)
            .with_metadata_fns(metadata_fns);
        if let Some(constructor) = constructor {
            spec = spec.with_shared_constructor(constructor);
        }
        self.register(spec)
    }

    pub fn lookup(&self, tag: &str) -> Result<FormRef> {
        self.try_lookup(tag).ok_or_else(|| Error::unknown_tag(tag))
    }

    pub fn try_lookup(&self, tag: &str) -> Option<FormRef> {
        // The shard guard is dropped before the handle is used.
        let form = self.forms.get(tag).map(|entry| entry.value().clone());
        form.map(FormRef::new)
    }

    /// Appends a raise site for the caller's location to `form`'s audit log.
    #[track_caller]
    pub fn record_raise(&self, form: &FormRef, extra: Data) {
        form.descriptor().add_raised_site(RaiseSite::here(extra));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.forms.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = self
            .forms
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags())
            .finish()
    }
}

struct GlobalRegistry;

impl StaticState<Registry> for GlobalRegistry {
    fn get_static() -> &'static OnceLock<Registry> {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        &REGISTRY
    }
}

// endregion:   --- Registry

#[cfg(test)]
mod test {
    use super::Registry;
    use crate::error::{
        BacktraceSpec, Constructor, ErrorFormSpec, FieldMap, FormError, FormKeys, FormRef, Trace,
    };
    use std::{collections::HashMap, sync::Arc};

    #[test]
    fn test_register_lookup() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        let form = registry.register(ErrorFormSpec::new("acme/a").with_backtrace(BacktraceSpec::No));
        registry.register(ErrorFormSpec::new("acme/b"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.tags(), ["acme/a", "acme/b"]);
        assert!(registry.lookup("acme/a").unwrap().same_descriptor(&form));
        assert!(registry.lookup("acme/c").unwrap_err().is_unknown_tag());
    }

    #[test]
    fn test_replace_on_reregister() {
        let registry = Registry::new();
        let old = registry.register(ErrorFormSpec::new("acme/a").with_backtrace(BacktraceSpec::No));
        let new = registry.register(
            ErrorFormSpec::new("acme/a").with_constructor(|form: &FormRef, fields: FieldMap| {
                FormError::new(
                    form.clone(),
                    FieldMap::new(format!("v2: {}", fields.message)),
                    Trace::empty(),
                )
            }),
        );
        assert_eq!(registry.len(), 1);
        assert!(!old.same_descriptor(&new));

        let refreshed = old.refresh(&registry).unwrap();
        assert!(refreshed.same_descriptor(&new));
        assert_eq!(refreshed.raise(FieldMap::new("boom")).message(), "v2: boom");
        assert_eq!(old.raise(FieldMap::new("boom")).message(), "boom");
    }

    #[test]
    fn test_register_form_positional() {
        let registry = Registry::new();
        let keys = FormKeys::new("t", "m", "d", "c", "s");
        let constructor: Constructor = Arc::new(|form: &FormRef, fields: FieldMap| {
            FormError::new(form.clone(), fields, Trace::empty())
        });
        let form = registry.register_form(
            "acme/pos",
            keys.clone(),
            Some(constructor.clone()),
            HashMap::new(),
        );
        assert_eq!(form.keys(), &keys);
        assert!(Arc::ptr_eq(form.descriptor().constructor(), &constructor));
        let err = form.raise(FieldMap::new("x"));
        assert!(err.type_name().is_none());
    }

    #[test]
    fn test_record_raise() {
        let registry = Registry::new();
        let form = registry.register(ErrorFormSpec::new("acme/a"));
        let mut extra = crate::error::Data::new();
        extra.insert("request".into(), "r-1".into());
        registry.record_raise(&form, extra.clone());
        let sites = form.descriptor().raised_sites();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].extra, extra);
    }
}
