use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Names of the five suppression flags, in constructor order.
pub const FLAG_NAMES: [&str; 5] = [
    "suppress_data",
    "suppress_cause",
    "suppress_message",
    "suppress_stack",
    "suppress_recursively",
];

//===========================
// region:      --- SuppressionPolicy

/// Which fields of an error chain to redact.
///
/// - `suppress_data`: removes payload entries other than the form's type identification.
/// - `suppress_cause`: detaches the cause.
/// - `suppress_message`: replaces the message with an empty string.
/// - `suppress_stack`: replaces the trace with an empty one.
/// - `suppress_recursively`: applies the policy to retained causes as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuppressionPolicy {
    pub suppress_data: bool,
    pub suppress_cause: bool,
    pub suppress_message: bool,
    pub suppress_stack: bool,
    pub suppress_recursively: bool,
}

/// Redacts nothing. In effect wherever no other level is established.
pub const NOOP_SANITIZATION: SuppressionPolicy =
    SuppressionPolicy::new(false, false, false, false, false);

/// Removes payloads and traces throughout the chain; keeps messages and causes.
pub const DEFAULT_SANITIZATION: SuppressionPolicy =
    SuppressionPolicy::new(true, false, false, true, true);

impl SuppressionPolicy {
    pub const fn new(
        suppress_data: bool,
        suppress_cause: bool,
        suppress_message: bool,
        suppress_stack: bool,
        suppress_recursively: bool,
    ) -> Self {
        Self {
            suppress_data,
            suppress_cause,
            suppress_message,
            suppress_stack,
            suppress_recursively,
        }
    }

    pub fn builder() -> SuppressionPolicyBuilder {
        SuppressionPolicyBuilder::default()
    }

    /// True if no field of any link would change.
    pub const fn is_noop(&self) -> bool {
        !(self.suppress_data || self.suppress_cause || self.suppress_message || self.suppress_stack)
    }

    /// Parses a JSON object with all five flags. Missing flags yield [`Error::MalformedPolicy`].
    pub fn from_json(json: &str) -> Result<Self> {
        let builder: SuppressionPolicyBuilder = serde_json::from_str(json)?;
        builder.build()
    }

    /// Reads `<PREFIX>_SUPPRESS_DATA`, `<PREFIX>_SUPPRESS_CAUSE`, and so on from the environment.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`] with a caller-supplied variable source. Accepts `true`/`false`/`1`/`0`,
    /// case-insensitively; anything else, or an absent variable, is reported as malformed.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let values = FLAG_NAMES.map(|flag| {
            let var = format!("{prefix}_{}", flag.to_uppercase());
            lookup(&var).and_then(|v| parse_flag(&v))
        });
        let [suppress_data, suppress_cause, suppress_message, suppress_stack, suppress_recursively] =
            values;
        SuppressionPolicyBuilder {
            suppress_data,
            suppress_cause,
            suppress_message,
            suppress_stack,
            suppress_recursively,
        }
        .build()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

// endregion:   --- SuppressionPolicy

//===========================
// region:      --- SuppressionPolicyBuilder

/// Collects flags one at a time; [`Self::build`] rejects any flag left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SuppressionPolicyBuilder {
    suppress_data: Option<bool>,
    suppress_cause: Option<bool>,
    suppress_message: Option<bool>,
    suppress_stack: Option<bool>,
    suppress_recursively: Option<bool>,
}

impl SuppressionPolicyBuilder {
    pub fn suppress_data(self, v: bool) -> Self {
        Self {
            suppress_data: Some(v),
            ..self
        }
    }

    pub fn suppress_cause(self, v: bool) -> Self {
        Self {
            suppress_cause: Some(v),
            ..self
        }
    }

    pub fn suppress_message(self, v: bool) -> Self {
        Self {
            suppress_message: Some(v),
            ..self
        }
    }

    pub fn suppress_stack(self, v: bool) -> Self {
        Self {
            suppress_stack: Some(v),
            ..self
        }
    }

    pub fn suppress_recursively(self, v: bool) -> Self {
        Self {
            suppress_recursively: Some(v),
            ..self
        }
    }

    pub fn build(self) -> Result<SuppressionPolicy> {
        let flags = [
            self.suppress_data,
            self.suppress_cause,
            self.suppress_message,
            self.suppress_stack,
            self.suppress_recursively,
        ];
        let missing = FLAG_NAMES
            .into_iter()
            .zip(flags)
            .filter(|(_, flag)| flag.is_none())
            .map(|(name, _)| name)
            .collect::<Vec<_>>();

        match flags {
            [Some(d), Some(c), Some(m), Some(s), Some(r)] => {
                Ok(SuppressionPolicy::new(d, c, m, s, r))
            }
            _ => Err(Error::MalformedPolicy { missing }),
        }
    }
}

// endregion:   --- SuppressionPolicyBuilder
