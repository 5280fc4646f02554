use super::{current_sanitization_level, SuppressionPolicy};
use crate::error::{Data, ErrorValue, FormError, GenericError, Trace};
use std::error::Error as StdError;

/// Sanitizes `err` with the ambient level; see [`current_sanitization_level`].
pub fn sanitize(err: &ErrorValue) -> ErrorValue {
    sanitize_with(err, &current_sanitization_level())
}

/// Returns a redacted copy of `err` according to `policy`, outermost link first.
///
/// Never fails and never touches the registry. Form links stay form links; with
/// `suppress_data` only their type-identification entries survive, and a payload that lacks
/// its discriminant gets the one declared by its descriptor.
pub fn sanitize_with(err: &ErrorValue, policy: &SuppressionPolicy) -> ErrorValue {
    if policy.is_noop() {
        return err.clone();
    }

    let mut link: ErrorValue = match err {
        ErrorValue::Form(e) => sanitize_form(e, policy).into(),
        ErrorValue::Generic(e) => sanitize_generic(e, policy).into(),
    };

    let cause = match err.cause() {
        _ if policy.suppress_cause => None,
        Some(cause) if policy.suppress_recursively => Some(sanitize_with(cause, policy)),
        Some(cause) => Some(cause.clone()),
        None => None,
    };
    link.set_cause(cause);

    link
}

/// Converts an arbitrary std error chain with [`ErrorValue::from_std`] and sanitizes it with
/// `policy`, or with the ambient level if `policy` is `None`.
pub fn sanitize_std(
    err: &(dyn StdError + 'static),
    policy: Option<&SuppressionPolicy>,
) -> ErrorValue {
    let value = ErrorValue::from_std(err);
    match policy {
        Some(policy) => sanitize_with(&value, policy),
        None => sanitize(&value),
    }
}

fn redact_message(message: &str, policy: &SuppressionPolicy) -> String {
    if policy.suppress_message {
        String::new()
    } else {
        message.to_owned()
    }
}

fn redact_trace(trace: &Trace, policy: &SuppressionPolicy) -> Trace {
    if policy.suppress_stack {
        Trace::empty()
    } else {
        trace.clone()
    }
}

// The cause is set by the caller.
fn sanitize_form(e: &FormError, policy: &SuppressionPolicy) -> FormError {
    let data = if policy.suppress_data {
        let keys = e.form().keys();
        let mut data = e
            .data()
            .iter()
            .filter(|(name, _)| keys.is_identification_key(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect::<Data>();
        if e.type_name().is_none() {
            log::debug!("error form {} raised without its type discriminant", e.tag());
            data.insert(
                keys.type_key.to_string(),
                e.form().descriptor().type_name().into(),
            );
        }
        data
    } else {
        e.data().clone()
    };

    FormError {
        form: e.form().clone(),
        message: redact_message(e.message(), policy),
        data,
        cause: None,
        trace: redact_trace(e.trace(), policy),
    }
}

fn sanitize_generic(e: &GenericError, policy: &SuppressionPolicy) -> GenericError {
    GenericError {
        type_name: e.type_name.clone(),
        message: redact_message(e.message(), policy),
        cause: None,
        trace: redact_trace(e.trace(), policy),
    }
}

#[cfg(test)]
mod test {
    use super::{sanitize, sanitize_std, sanitize_with};
    use crate::error::{
        BacktraceSpec, ErrorFormSpec, ErrorValue, FieldMap, FormError, FormRef, GenericError,
        Registry, Trace, TrivialError,
    };
    use crate::sanex::{
        sync_with_sanitization_level, SuppressionPolicy, DEFAULT_SANITIZATION, NOOP_SANITIZATION,
    };

    fn form_error(registry: &Registry, message: &str, cause: Option<ErrorValue>) -> ErrorValue {
        let form = registry.lookup("acme/db").unwrap();
        let mut fields = FieldMap::new(message).with_entry("password", "hunter2");
        fields.cause = cause;
        let mut err = form.raise(fields);
        err.trace = Trace::from_frames(["frame 0", "frame 1"]);
        err.into()
    }

    fn registry() -> Registry {
        let registry = Registry::new();
        registry.register(ErrorFormSpec::new("acme/db").with_backtrace(BacktraceSpec::No));
        registry
    }

    #[test]
    fn test_suppress_data_keeps_discriminant() {
        let registry = registry();
        let err = form_error(&registry, "query failed", None);
        let policy = SuppressionPolicy::new(true, false, false, false, false);
        let out = sanitize_with(&err, &policy);
        let data = out.data().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(out.type_name(), Some("acme/db"));
        assert_eq!(out.message(), "query failed");
        assert_eq!(out.trace().frames().len(), 2);
    }

    #[test]
    fn test_suppress_stack_and_message() {
        let registry = registry();
        let err = form_error(&registry, "query failed", None);
        let policy = SuppressionPolicy::new(false, false, true, true, false);
        let out = sanitize_with(&err, &policy);
        assert_eq!(out.message(), "");
        assert!(out.trace().is_empty());
        assert_eq!(out.data(), err.data());
    }

    #[test]
    fn test_non_recursive_leaves_cause() {
        let registry = registry();
        let cause = form_error(&registry, "inner", None);
        let err = form_error(&registry, "outer", Some(cause.clone()));
        let policy = SuppressionPolicy::new(true, false, true, true, false);
        let out = sanitize_with(&err, &policy);
        assert_eq!(out.message(), "");
        assert_eq!(out.cause(), Some(&cause));
    }

    #[test]
    fn test_generic_gets_message_and_stack_only() {
        let err: ErrorValue = GenericError::new("disk full")
            .with_type_name("io")
            .with_trace(Trace::from_frames(["frame 0"]))
            .into();
        let policy = SuppressionPolicy::new(true, true, true, true, true);
        let out = sanitize_with(&err, &policy);
        assert_eq!(out, GenericError::new("").with_type_name("io").into());
    }

    #[test]
    fn test_custom_constructor_keeps_form() {
        let registry = Registry::new();
        let form = registry.register(
            ErrorFormSpec::new("acme/raw")
                .with_type_name("RawFailure")
                .with_constructor(|form: &FormRef, fields: FieldMap| {
                    FormError::new(form.clone(), fields, Trace::empty())
                }),
        );
        let inner: ErrorValue = GenericError::new("inner secret").into();
        let err: ErrorValue = form
            .raise(FieldMap::new("outer secret").with_entry("k", "v").with_cause(inner))
            .into();
        assert_eq!(err.type_name(), None);

        let policy = SuppressionPolicy::new(true, false, true, false, true);
        let out = sanitize_with(&err, &policy);
        assert_eq!(out.form(), Some(&form));
        assert_eq!(out.type_name(), Some("RawFailure"));
        assert_eq!(out.data().unwrap().len(), 1);
        assert_eq!(out.message(), "");
        assert_eq!(out.cause().unwrap().message(), "");
    }

    #[test]
    fn test_does_not_record_raises() {
        let registry = registry();
        let err = form_error(&registry, "query failed", None);
        let form = registry.lookup("acme/db").unwrap();
        assert_eq!(form.descriptor().raise_count(), 1);
        let _ = sanitize_with(&err, &DEFAULT_SANITIZATION);
        assert_eq!(form.descriptor().raise_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ambient() {
        let registry = registry();
        let err = form_error(&registry, "query failed", None);
        assert_eq!(sanitize(&err), sanitize_with(&err, &NOOP_SANITIZATION));
        let scoped = sync_with_sanitization_level(DEFAULT_SANITIZATION, || sanitize(&err));
        assert_eq!(scoped, sanitize_with(&err, &DEFAULT_SANITIZATION));
    }

    #[test]
    fn test_sanitize_std() {
        let out = sanitize_std(
            &TrivialError("token=abc"),
            Some(&SuppressionPolicy::new(false, false, true, false, false)),
        );
        assert_eq!(out.message(), "");
        assert!(out.form().is_none());
    }
}
