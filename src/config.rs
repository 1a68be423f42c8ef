//! Caller-facing knobs for the accessor.
use serde::{Deserialize, Serialize};

/// What a lookup that *almost* matches (index past the end, key not present,
/// value explicitly absent) turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// `get` yields `None`, `set` does nothing.
    #[default]
    Lenient,
    /// Both report `KeyPathError::NotFound`; writes refused by `kind_check`
    /// report `KeyPathError::KindMismatch`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessPolicy {
    pub missing: MissingPolicy,
    /// Opt-in narrowing: refuse terminal writes whose kind differs from the
    /// container's element kind. Off by default, so any `Value` is accepted.
    pub kind_check: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self { missing: MissingPolicy::Lenient, kind_check: false }
    }
}

impl AccessPolicy {
    pub fn strict() -> Self {
        Self { missing: MissingPolicy::Strict, ..Self::default() }
    }

    pub fn with_kind_check(mut self, kind_check: bool) -> Self {
        self.kind_check = kind_check;
        self
    }
}
