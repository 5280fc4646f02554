use super::{
    Data, ErrorValue, FormError, FormRef, GenericError, Registry, Result, Trace, WireTag,
};
use serde::{Deserialize, Serialize};

//===========================
// region:      --- SerErrorValue

#[derive(Serialize)]
struct SerErrorValue<'a> {
    form: Option<&'a FormRef>,
    type_name: Option<&'a str>,
    message: &'a str,
    data: Option<&'a Data>,
    cause: Option<&'a ErrorValue>,
    trace: &'a Trace,
}

/// Form links are written with their tag only; see [`DeserErrorValue::rehydrate`].
impl Serialize for ErrorValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SerErrorValue {
            form: self.form(),
            type_name: self.type_name(),
            message: self.message(),
            data: self.data(),
            cause: self.cause(),
            trace: self.trace(),
        }
        .serialize(serializer)
    }
}

impl ErrorValue {
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_wire(json: &str, registry: &Registry) -> Result<ErrorValue> {
        DeserErrorValue::from_json(json)?.rehydrate(registry)
    }
}

// endregion:   --- SerErrorValue

//===========================
// region:      --- DeserErrorValue

/// Wire shape of an [`ErrorValue`] chain before its tags are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeserErrorValue {
    pub form: Option<WireTag>,
    pub type_name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub data: Option<Data>,
    #[serde(default)]
    pub cause: Option<Box<DeserErrorValue>>,
    #[serde(default)]
    pub trace: Trace,
}

impl DeserErrorValue {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves every form link against `registry`. Rehydrated form payloads are marked with the
    /// form's serialized key. Fails with [`crate::error::Error::UnknownTag`] on the first unknown
    /// tag, building nothing.
    pub fn rehydrate(self, registry: &Registry) -> Result<ErrorValue> {
        let cause = match self.cause {
            Some(cause) => Some(Box::new(cause.rehydrate(registry)?)),
            None => None,
        };

        let value: ErrorValue = match FormRef::rehydrate_opt(self.form, registry)? {
            Some(form) => {
                let mut data = self.data.unwrap_or_default();
                data.insert(form.keys().serialized_key.to_string(), true.into());
                FormError {
                    form,
                    message: self.message,
                    data,
                    cause,
                    trace: self.trace,
                }
                .into()
            }
            None => GenericError {
                type_name: self.type_name,
                message: self.message,
                cause,
                trace: self.trace,
            }
            .into(),
        };

        Ok(value)
    }
}

// endregion:   --- DeserErrorValue
