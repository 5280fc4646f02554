use std::{
    borrow::Borrow,
    fmt::{Debug, Display},
    sync::Arc,
};

//===========================
// region:      --- Key

/// Opaque identifier naming one conceptual field of an error form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(":{}", self.0))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// endregion:   --- Key

//===========================
// region:      --- FormKeys

/// The field names an error form exposes: type discriminant, message, payload, cause,
/// and serialized-form indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormKeys {
    pub type_key: Key,
    pub message_key: Key,
    pub data_key: Key,
    pub cause_key: Key,
    pub serialized_key: Key,
}

impl FormKeys {
    pub fn new(
        type_key: impl Into<Key>,
        message_key: impl Into<Key>,
        data_key: impl Into<Key>,
        cause_key: impl Into<Key>,
        serialized_key: impl Into<Key>,
    ) -> Self {
        Self {
            type_key: type_key.into(),
            message_key: message_key.into(),
            data_key: data_key.into(),
            cause_key: cause_key.into(),
            serialized_key: serialized_key.into(),
        }
    }

    /// Payload entries carrying type identification. These survive data suppression.
    pub fn is_identification_key(&self, name: &str) -> bool {
        name == self.type_key.as_str() || name == self.serialized_key.as_str()
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self::new(
            "errform/type",
            "errform/message",
            "errform/data",
            "errform/cause",
            "errform/serialized?",
        )
    }
}

// endregion:   --- FormKeys

#[cfg(test)]
mod test {
    use super::{FormKeys, Key};

    #[test]
    fn test_identification_keys() {
        let keys = FormKeys::default();
        assert!(keys.is_identification_key("errform/type"));
        assert!(keys.is_identification_key("errform/serialized?"));
        assert!(!keys.is_identification_key("errform/data"));
        assert!(!keys.is_identification_key("user_id"));
    }

    #[test]
    fn test_key_fmt() {
        let key = Key::new("acme/type");
        assert_eq!(format!("{key:?}"), ":acme/type");
        assert_eq!(key.to_string(), "acme/type");
    }
}
