use super::{Data, ErrorForm, FieldMap, FormError, FormKeys, RaiseSite, Registry, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::{fmt::Debug, sync::Arc};

//===========================
// region:      --- WireTag

/// The serialized form of a [`FormRef`]: the tag and nothing else.
///
/// Documents that embed a form carry a `WireTag` and resolve it after parsing with
/// [`FormRef::rehydrate`], so an unknown tag is reported as
/// [`crate::error::Error::UnknownTag`] rather than as a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireTag(pub String);

// endregion:   --- WireTag

//===========================
// region:      --- FormRef

/// Lightweight handle on a registered error form; this is what crosses serialization boundaries.
///
/// Only the tag is written. Reading requires a registry with a form under that tag, and the
/// rehydrated handle shares the registered descriptor (functions and raise-site log included)
/// with every other handle of the same kind. A `FormRef` is never partially populated.
#[derive(Clone)]
pub struct FormRef {
    form: Arc<ErrorForm>,
}

impl FormRef {
    pub(crate) fn new(form: Arc<ErrorForm>) -> Self {
        Self { form }
    }

    pub fn tag(&self) -> &str {
        self.form.tag()
    }

    pub fn keys(&self) -> &FormKeys {
        self.form.keys()
    }

    pub fn descriptor(&self) -> &ErrorForm {
        &self.form
    }

    /// True if both handles point to the same registration, not merely the same tag.
    pub fn same_descriptor(&self, other: &FormRef) -> bool {
        Arc::ptr_eq(&self.form, &other.form)
    }

    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn rehydrate(wire: WireTag, registry: &Registry) -> Result<FormRef> {
        registry.lookup(&wire.0)
    }

    /// Like [`Self::rehydrate`], for an optional embedded tag.
    pub fn rehydrate_opt(wire: Option<WireTag>, registry: &Registry) -> Result<Option<FormRef>> {
        wire.map(|wire| Self::rehydrate(wire, registry)).transpose()
    }

    /// Parses wire text and rehydrates it. Malformed text yields [`crate::error::Error::Deser`];
    /// a well-formed tag absent from `registry` yields [`crate::error::Error::UnknownTag`].
    pub fn from_wire(json: &str, registry: &Registry) -> Result<FormRef> {
        let wire: WireTag = serde_json::from_str(json)?;
        Self::rehydrate(wire, registry)
    }

    /// Looks the tag up again, observing any replacement registered since this handle was made.
    pub fn refresh(&self, registry: &Registry) -> Result<FormRef> {
        registry.lookup(self.tag())
    }

    /// Records a raise site for the caller's location and builds an error with the form's
    /// constructor.
    #[track_caller]
    pub fn raise(&self, fields: FieldMap) -> FormError {
        self.raise_with_site(fields, Data::new())
    }

    /// Like [`Self::raise`], with caller-defined metadata stored in the raise site.
    #[track_caller]
    pub fn raise_with_site(&self, fields: FieldMap, extra: Data) -> FormError {
        self.form.add_raised_site(RaiseSite::here(extra));
        (self.form.constructor())(self, fields)
    }
}

impl PartialEq for FormRef {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for FormRef {}

impl Debug for FormRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("FormRef({})", self.tag()))
    }
}

impl Serialize for FormRef {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.tag())
    }
}

// endregion:   --- FormRef
