use super::{BacktraceSpec, Data, FieldMap, FormError, FormKeys, FormRef, Key, Trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::Debug,
    panic::Location,
    sync::Arc,
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

/// Builds an instance of an error form from business fields.
pub type Constructor = Arc<dyn Fn(&FormRef, FieldMap) -> FormError + Send + Sync>;

/// Per-field transformer applied when presenting a payload entry.
pub type MetadataFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

//===========================
// region:      --- RaiseSite

/// Audit entry for one occasion on which a form was used to raise an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaiseSite {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub thread: Option<String>,
    pub timestamp_millis: u64,
    pub extra: Data,
}

impl RaiseSite {
    /// Captures the caller's location, thread name, and the current time.
    #[track_caller]
    pub fn here(extra: Data) -> Self {
        let location = Location::caller();
        let timestamp_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self {
            file: location.file().to_owned(),
            line: location.line(),
            column: location.column(),
            thread: thread::current().name().map(str::to_owned),
            timestamp_millis,
            extra,
        }
    }
}

// endregion:   --- RaiseSite

//===========================
// region:      --- ErrorForm

/// Full definition of one error kind. Everything but the raise-site log is immutable.
pub struct ErrorForm {
    tag: String,
    keys: FormKeys,
    type_name: String,
    constructor: Constructor,
    metadata_fns: HashMap<Key, MetadataFn>,
    backtrace_spec: BacktraceSpec,
    raised_sites: Mutex<Vec<RaiseSite>>,
}

impl ErrorForm {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn keys(&self) -> &FormKeys {
        &self.keys
    }

    /// Value written under the type key of every payload this form constructs.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn metadata_fns(&self) -> &HashMap<Key, MetadataFn> {
        &self.metadata_fns
    }

    pub fn metadata_fn(&self, name: &str) -> Option<&MetadataFn> {
        self.metadata_fns.get(name)
    }

    pub fn backtrace_spec(&self) -> BacktraceSpec {
        self.backtrace_spec
    }

    /// Snapshot of the raise-site log, in append order.
    pub fn raised_sites(&self) -> Vec<RaiseSite> {
        self.raised_sites.lock().clone()
    }

    pub fn raise_count(&self) -> usize {
        self.raised_sites.lock().len()
    }

    pub(crate) fn add_raised_site(&self, site: RaiseSite) {
        log::trace!(
            "error form {} raised at {}:{}",
            self.tag,
            site.file,
            site.line
        );
        self.raised_sites.lock().push(site);
    }

    /// Constructor used when none is supplied: stamps the type discriminant into the payload and
    /// captures a trace according to the form's [`BacktraceSpec`].
    pub fn default_constructor() -> Constructor {
        Arc::new(|form: &FormRef, mut fields: FieldMap| {
            let descriptor = form.descriptor();
            fields.data.insert(
                descriptor.keys().type_key.to_string(),
                descriptor.type_name().into(),
            );
            let trace = Trace::capture(descriptor.backtrace_spec());
            FormError::new(form.clone(), fields, trace)
        })
    }
}

impl Debug for ErrorForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fn_keys = self.metadata_fns.keys().collect::<Vec<_>>();
        fn_keys.sort();
        f.debug_struct("ErrorForm")
            .field("tag", &self.tag)
            .field("keys", &self.keys)
            .field("type_name", &self.type_name)
            .field("metadata_fns", &fn_keys)
            .field("backtrace_spec", &self.backtrace_spec)
            .field("raise_count", &self.raise_count())
            .finish()
    }
}

// endregion:   --- ErrorForm

//===========================
// region:      --- ErrorFormSpec

/// Everything needed to register an error form. See [`crate::error::Registry::register`].
pub struct ErrorFormSpec {
    tag: String,
    keys: FormKeys,
    type_name: Option<String>,
    constructor: Option<Constructor>,
    metadata_fns: HashMap<Key, MetadataFn>,
    backtrace_spec: BacktraceSpec,
}

impl ErrorFormSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            keys: FormKeys::default(),
            type_name: None,
            constructor: None,
            metadata_fns: HashMap::new(),
            backtrace_spec: BacktraceSpec::default(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn with_keys(self, keys: FormKeys) -> Self {
        Self { keys, ..self }
    }

    /// Defaults to the tag.
    pub fn with_type_name(self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..self
        }
    }

    pub fn with_constructor(
        self,
        constructor: impl Fn(&FormRef, FieldMap) -> FormError + Send + Sync + 'static,
    ) -> Self {
        self.with_shared_constructor(Arc::new(constructor))
    }

    /// Like [`Self::with_constructor`], keeping the given handle as the descriptor's constructor.
    pub fn with_shared_constructor(self, constructor: Constructor) -> Self {
        Self {
            constructor: Some(constructor),
            ..self
        }
    }

    pub fn with_metadata_fn(
        mut self,
        name: impl Into<Key>,
        f: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.metadata_fns.insert(name.into(), Arc::new(f));
        self
    }

    pub fn with_metadata_fns(self, metadata_fns: HashMap<Key, MetadataFn>) -> Self {
        Self {
            metadata_fns,
            ..self
        }
    }

    pub fn with_backtrace(self, backtrace_spec: BacktraceSpec) -> Self {
        Self {
            backtrace_spec,
            ..self
        }
    }

    pub(crate) fn build(self) -> ErrorForm {
        let type_name = self.type_name.unwrap_or_else(|| self.tag.clone());
        ErrorForm {
            tag: self.tag,
            keys: self.keys,
            type_name,
            constructor: self
                .constructor
                .unwrap_or_else(ErrorForm::default_constructor),
            metadata_fns: self.metadata_fns,
            backtrace_spec: self.backtrace_spec,
            raised_sites: Mutex::new(Vec::new()),
        }
    }
}

// endregion:   --- ErrorFormSpec

#[cfg(test)]
mod test {
    use super::{ErrorFormSpec, RaiseSite};
    use crate::error::{BacktraceSpec, Data, FormKeys};

    #[test]
    fn test_build_defaults() {
        let form = ErrorFormSpec::new("acme/timeout").build();
        assert_eq!(form.tag(), "acme/timeout");
        assert_eq!(form.type_name(), "acme/timeout");
        assert_eq!(form.keys(), &FormKeys::default());
        assert_eq!(form.raise_count(), 0);
    }

    #[test]
    fn test_metadata_fn_lookup() {
        let form = ErrorFormSpec::new("acme/auth")
            .with_metadata_fn("password", |_| "****".into())
            .with_backtrace(BacktraceSpec::No)
            .build();
        let f = form.metadata_fn("password").unwrap();
        assert_eq!(f(&"hunter2".into()), serde_json::Value::from("****"));
        assert!(form.metadata_fn("user").is_none());
    }

    #[test]
    fn test_raise_site_location() {
        let site = RaiseSite::here(Data::new());
        assert!(site.file.ends_with("form.rs"));
        assert!(site.line > 0);
    }
}
