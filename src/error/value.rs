use super::{error_chain, FormRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    error::Error as StdError,
    fmt::{Debug, Display},
};

/// Structured payload carried by an error value.
pub type Data = serde_json::Map<String, Value>;

//===========================
// region:      --- BacktraceSpec, Trace

/// Specifies different backtrace generation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BacktraceSpec {
    /// A backtrace is always generated
    Yes,
    /// A backtrace is never generated
    No,
    /// Backtrace generation is based on environment variables as per
    /// [`std::backtrace::Backtrace`](https://doc.rust-lang.org/std/backtrace/struct.Backtrace.html).
    #[default]
    Env,
}

/// Captured stack information, kept as text frames so that it can cross process boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<String>);

impl Trace {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn capture(spec: BacktraceSpec) -> Self {
        let backtrace = match spec {
            BacktraceSpec::Yes => Backtrace::force_capture(),
            BacktraceSpec::No => return Self::empty(),
            BacktraceSpec::Env => Backtrace::capture(),
        };
        match backtrace.status() {
            BacktraceStatus::Captured => Self::from_backtrace(&backtrace),
            _ => Self::empty(),
        }
    }

    pub fn from_frames<S: Into<String>>(frames: impl IntoIterator<Item = S>) -> Self {
        Self(frames.into_iter().map(Into::into).collect())
    }

    fn from_backtrace(backtrace: &Backtrace) -> Self {
        let frames = backtrace
            .to_string()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self(frames)
    }

    pub fn frames(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// endregion:   --- BacktraceSpec, Trace

//===========================
// region:      --- FieldMap

/// Business fields handed to a form's constructor.
#[derive(Debug, Default)]
pub struct FieldMap {
    pub message: String,
    pub data: Data,
    pub cause: Option<ErrorValue>,
}

impl FieldMap {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_data(self, data: Data) -> Self {
        Self { data, ..self }
    }

    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_cause(self, cause: impl Into<ErrorValue>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..self
        }
    }
}

// endregion:   --- FieldMap

//===========================
// region:      --- FormError

/// An error built from a registered error form.
#[derive(Clone, PartialEq)]
pub struct FormError {
    pub(crate) form: FormRef,
    pub(crate) message: String,
    pub(crate) data: Data,
    pub(crate) cause: Option<Box<ErrorValue>>,
    pub(crate) trace: Trace,
}

impl FormError {
    /// Assembles an instance without running the form's constructor or recording a raise site.
    /// Intended for use inside constructors; application code should call [`FormRef::raise`].
    pub fn new(form: FormRef, fields: FieldMap, trace: Trace) -> Self {
        Self {
            form,
            message: fields.message,
            data: fields.data,
            cause: fields.cause.map(Box::new),
            trace,
        }
    }

    pub fn form(&self) -> &FormRef {
        &self.form
    }

    pub fn tag(&self) -> &str {
        self.form.tag()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn cause(&self) -> Option<&ErrorValue> {
        self.cause.as_deref()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The type discriminant recorded in the payload, if present.
    pub fn type_name(&self) -> Option<&str> {
        let type_key = self.form.keys().type_key.as_str();
        self.data.get(type_key).and_then(Value::as_str)
    }

    /// True if this instance was rebuilt from its wire form.
    pub fn is_serialized(&self) -> bool {
        let serialized_key = self.form.keys().serialized_key.as_str();
        matches!(self.data.get(serialized_key), Some(Value::Bool(true)))
    }

    /// Returns a map keyed by the form's field names, with each payload entry passed through
    /// the form's metadata function for that entry, when one exists. The type discriminant
    /// appears once, at the top level; identification entries are left out of the data map.
    pub fn present(&self) -> Data {
        let keys = self.form.keys();
        let data = self
            .data
            .iter()
            .filter(|(name, _)| !keys.is_identification_key(name))
            .map(|(name, value)| {
                let value = match self.form.descriptor().metadata_fn(name) {
                    Some(f) => f(value),
                    None => value.clone(),
                };
                (name.clone(), value)
            })
            .collect::<Data>();

        let mut map = Data::new();
        if let Some(type_name) = self.type_name() {
            map.insert(keys.type_key.to_string(), type_name.into());
        }
        map.insert(keys.message_key.to_string(), self.message.clone().into());
        map.insert(keys.data_key.to_string(), Value::Object(data));
        if let Some(cause) = &self.cause {
            map.insert(keys.cause_key.to_string(), Value::Object(cause.present()));
        }
        map
    }
}

impl Debug for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormError")
            .field("tag", &self.form.tag())
            .field("message", &self.message)
            .field("data", &self.data)
            .field("cause", &self.cause)
            .field("trace_len", &self.trace.frames().len())
            .finish()
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for FormError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

// endregion:   --- FormError

//===========================
// region:      --- GenericError

/// An error-like value not built from a registered form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericError {
    pub(crate) type_name: Option<String>,
    pub(crate) message: String,
    pub(crate) cause: Option<Box<ErrorValue>>,
    pub(crate) trace: Trace,
}

impl GenericError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_type_name(self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..self
        }
    }

    pub fn with_cause(self, cause: impl Into<ErrorValue>) -> Self {
        Self {
            cause: Some(Box::new(cause.into())),
            ..self
        }
    }

    pub fn with_trace(self, trace: Trace) -> Self {
        Self { trace, ..self }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&ErrorValue> {
        self.cause.as_deref()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

impl Display for GenericError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for GenericError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

// endregion:   --- GenericError

//===========================
// region:      --- ErrorValue

/// Any error-like value: message, optional cause, stack, and (for form errors) payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    Form(FormError),
    Generic(GenericError),
}

impl ErrorValue {
    /// Converts an arbitrary std error chain. Links that already are [`ErrorValue`]s, [`FormError`]s,
    /// or [`GenericError`]s are cloned as-is, keeping their form identity and everything beneath them.
    pub fn from_std(err: &(dyn StdError + 'static)) -> Self {
        let mut links = Vec::new();
        for link in error_chain(err) {
            if let Some(value) = known_value(link) {
                links.push(value);
                break;
            }
            links.push(GenericError::new(link.to_string()).into());
        }

        let mut acc: Option<ErrorValue> = None;
        while let Some(mut link) = links.pop() {
            if let Some(cause) = acc.take() {
                link.set_cause(Some(cause));
            }
            acc = Some(link);
        }
        acc.unwrap_or_else(|| GenericError::new(err.to_string()).into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Form(e) => e.message(),
            Self::Generic(e) => e.message(),
        }
    }

    pub fn cause(&self) -> Option<&ErrorValue> {
        match self {
            Self::Form(e) => e.cause(),
            Self::Generic(e) => e.cause(),
        }
    }

    pub fn trace(&self) -> &Trace {
        match self {
            Self::Form(e) => e.trace(),
            Self::Generic(e) => e.trace(),
        }
    }

    pub fn data(&self) -> Option<&Data> {
        match self {
            Self::Form(e) => Some(e.data()),
            Self::Generic(_) => None,
        }
    }

    pub fn form(&self) -> Option<&FormRef> {
        match self {
            Self::Form(e) => Some(e.form()),
            Self::Generic(_) => None,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Form(e) => e.type_name(),
            Self::Generic(e) => e.type_name(),
        }
    }

    /// Iterates over this value followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ErrorValue> {
        std::iter::successors(Some(self), |v| ErrorValue::cause(v))
    }

    pub fn present(&self) -> Data {
        match self {
            Self::Form(e) => e.present(),
            Self::Generic(e) => {
                let mut map = Data::new();
                if let Some(type_name) = e.type_name() {
                    map.insert("type".into(), type_name.into());
                }
                map.insert("message".into(), e.message.clone().into());
                if let Some(cause) = &e.cause {
                    map.insert("cause".into(), Value::Object(cause.present()));
                }
                map
            }
        }
    }

    pub(crate) fn set_cause(&mut self, cause: Option<ErrorValue>) {
        let cause = cause.map(Box::new);
        match self {
            Self::Form(e) => e.cause = cause,
            Self::Generic(e) => e.cause = cause,
        }
    }
}

fn known_value(err: &(dyn StdError + 'static)) -> Option<ErrorValue> {
    if let Some(value) = err.downcast_ref::<ErrorValue>() {
        return Some(value.clone());
    }
    if let Some(form_err) = err.downcast_ref::<FormError>() {
        return Some(form_err.clone().into());
    }
    err.downcast_ref::<GenericError>()
        .map(|generic| generic.clone().into())
}

impl From<FormError> for ErrorValue {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<GenericError> for ErrorValue {
    fn from(value: GenericError) -> Self {
        Self::Generic(value)
    }
}

impl Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for ErrorValue {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Form(e) => e.source(),
            Self::Generic(e) => e.source(),
        }
    }
}

// endregion:   --- ErrorValue
