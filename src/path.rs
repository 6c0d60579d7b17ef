//! Canonical, composable addresses for JSON nodes.
//!
//! A [`Path`] is a sequence of [`PathComponent`]s: object keys or array
//! indices. The empty path addresses the root value. Paths compare by
//! segment equality and stringify canonically (`a.b[0]`, never `.a.b[0]`
//! or `a[0].`).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// One segment of a [`Path`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    Key(Arc<str>),
    Index(usize),
}

impl PathComponent {
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }

    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }
}

impl From<&str> for PathComponent {
    fn from(key: &str) -> Self {
        Self::Key(Arc::from(key))
    }
}

impl From<usize> for PathComponent {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A canonical, opaque address of a JSON node within the root value.
///
/// The empty path (`Path::root()`) denotes the root value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<PathComponent>);

impl Path {
    /// The path of the root value.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathComponent] {
        &self.0
    }

    /// Returns a new path with an object key appended.
    #[must_use]
    pub fn append_key(&self, key: impl Into<Arc<str>>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathComponent::Key(key.into()));
        Self(segments)
    }

    /// Returns a new path with an array index appended.
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathComponent::Index(index));
        Self(segments)
    }

    /// Parses a canonical textual path such as `a.b[0]` or `[0][1].c`.
    ///
    /// Two consecutive dots, a leading dot, or an empty segment are
    /// rejected with [`Error::BadPath`].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let bad_path = || Error::BadPath {
            text: text.to_string(),
        };

        let mut segments = Vec::new();
        let mut i = 0;
        let mut expect_segment = true;

        while i < text.len() {
            match text.as_bytes()[i] {
                b'[' => {
                    let end = text[i + 1..]
                        .find(']')
                        .map(|p| p + i + 1)
                        .ok_or_else(bad_path)?;
                    let digits = &text[i + 1..end];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(bad_path());
                    }
                    let index: usize = digits.parse().map_err(|_| bad_path())?;
                    segments.push(PathComponent::Index(index));
                    i = end + 1;
                    expect_segment = false;
                }
                b'.' => {
                    if expect_segment {
                        return Err(bad_path());
                    }
                    i += 1;
                    expect_segment = true;
                }
                _ => {
                    if !expect_segment {
                        return Err(bad_path());
                    }
                    let end = text[i..].find(['.', '[']).map_or(text.len(), |p| p + i);
                    let key = &text[i..end];
                    if key.is_empty() {
                        return Err(bad_path());
                    }
                    segments.push(PathComponent::Key(Arc::from(key)));
                    i = end;
                    expect_segment = false;
                }
            }
        }

        if expect_segment && !segments.is_empty() {
            return Err(bad_path());
        }

        Ok(Self(segments))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathComponent::Key(k) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{k}")?;
                }
                PathComponent::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        assert!(Path::root().is_root());
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn append_and_display() {
        let p = Path::root()
            .append_key("user")
            .append_key("profile")
            .append_index(0);
        assert_eq!(p.to_string(), "user.profile[0]");
    }

    #[test]
    fn parse_roundtrip() {
        for text in ["a.b", "a.b[0]", "[0].b", "[0][1]", "a"] {
            let parsed = Path::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_double_dot() {
        assert!(matches!(Path::parse("a..b"), Err(Error::BadPath { .. })));
    }

    #[test]
    fn parse_rejects_leading_dot() {
        assert!(matches!(Path::parse(".a"), Err(Error::BadPath { .. })));
    }

    #[test]
    fn parse_rejects_empty_index() {
        assert!(matches!(Path::parse("a[]"), Err(Error::BadPath { .. })));
    }

    #[test]
    fn equality_by_segments() {
        let a = Path::parse("a[0].b").unwrap();
        let b = Path::root().append_key("a").append_index(0).append_key("b");
        assert_eq!(a, b);
    }
}
