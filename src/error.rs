use thiserror::Error;

use crate::value::Kind;

pub type Result<T> = std::result::Result<T, KeyPathError>;

/// Failures surfaced by keypath traversal and service metadata loading.
///
/// `NonNumericIndex`, `NotAContainer` and `MissingContainer` are caller
/// misuse: the path does not fit the shape of the tree. `NotFound` and
/// `KindMismatch` are only produced under `MissingPolicy::Strict`.
#[derive(Debug, Error)]
pub enum KeyPathError {
    #[error("empty key path")]
    EmptyPath,

    #[error("segment `{segment}` at depth {depth} is not an index into a sequence")]
    NonNumericIndex { segment: String, depth: usize },

    #[error("segment `{segment}` at depth {depth} addresses a leaf value")]
    NotAContainer { segment: String, depth: usize },

    #[error("no sequence or mapping at `{segment}` (depth {depth}) to descend into")]
    MissingContainer { segment: String, depth: usize },

    #[error("value of kind {found:?} rejected at `{segment}` (depth {depth}), container holds {expected:?}")]
    KindMismatch { segment: String, depth: usize, expected: Kind, found: Kind },

    #[error("nothing at `{segment}` (depth {depth})")]
    NotFound { segment: String, depth: usize },

    #[error("service metadata: {0}")]
    Metadata(String),
}

impl KeyPathError {
    /// True for errors that signal a path/tree shape mismatch.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            KeyPathError::EmptyPath
                | KeyPathError::NonNumericIndex { .. }
                | KeyPathError::NotAContainer { .. }
                | KeyPathError::MissingContainer { .. }
        )
    }
}
