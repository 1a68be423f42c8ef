//! Dotted key paths: `"0.subarray.1.leaf"`.
//!
//! Segments are split on `.` verbatim. There is no escaping, no trimming and
//! no filtering of empty segments; `"a."` is `["a", ""]`.
use std::fmt;
use std::str::FromStr;

use crate::error::KeyPathError;

pub const SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

/// A non-empty list of segments, stored root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl Segment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-negative integer form, used against sequences.
    ///
    /// Only plain ASCII digits are accepted; `"+1"` and `" 1"` are not indices.
    pub fn as_index(&self) -> Option<usize> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl KeyPath {
    /// `None` only for the empty string ("no path").
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() {
            return None;
        }
        Self::from_segments(path.split(SEPARATOR))
    }

    pub fn from_segments<I>(segments: I) -> Option<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let segments: Vec<Segment> = segments.into_iter().map(|s| Segment(s.into())).collect();
        if segments.is_empty() { None } else { Some(Self { segments }) }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment addressing the root container's child.
    pub fn first(&self) -> &Segment {
        &self.segments[0]
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(KeyPathError::EmptyPath)
    }
}
