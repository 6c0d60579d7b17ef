//! The six JSON value kinds a [`crate::controller::StreamController`] can
//! be declared for.

/// The kind of value found (or expected) at a given path.
///
/// A controller's kind is immutable after creation: declaring a path as a
/// different kind than was previously established is a programmer error
/// surfaced as [`crate::error::Error::TypeMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

impl ValueKind {
    /// The kind implied by the first non-whitespace character of a value,
    /// per the first-character dispatch table.
    #[must_use]
    pub fn from_first_char(c: char) -> Self {
        match c {
            '"' => Self::String,
            '{' => Self::Object,
            '[' => Self::Array,
            't' | 'f' => Self::Boolean,
            'n' => Self::Null,
            _ => Self::Number,
        }
    }
}
