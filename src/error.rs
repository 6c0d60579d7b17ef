//! Error taxonomy surfaced through subscription handles.
//!
//! Errors are local to a single path's controller and propagate only to
//! that path's subscribers, except for [`Error::Disposed`] and
//! [`Error::SourceError`], which fail every not-yet-closed controller in
//! the parser and then freeze it.

use std::sync::Arc;

use crate::kind::ValueKind;
use crate::path::Path;

/// An error surfaced through a subscription handle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// End-of-stream reached while a delegate (or one of its descendants)
    /// was still unfinished.
    #[error("incomplete value at {path}")]
    Incomplete { path: Path },

    /// A delegate's state machine encountered a character that is
    /// forbidden in a strict position.
    #[error("malformed input at {path}: {message}")]
    Malformed { path: Path, message: String },

    /// A subscriber requested a path with a `kind` different from the
    /// kind discovered by the parser (or previously declared by another
    /// subscriber).
    #[error("type mismatch at {path}: expected {expected:?}, found {found:?}")]
    TypeMismatch {
        path: Path,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A textual path failed to parse.
    #[error("bad path: {text:?}")]
    BadPath { text: String },

    /// The parser (or engine) was explicitly disposed.
    #[error("parser disposed")]
    Disposed,

    /// The upstream fragment source signalled an error.
    #[error("upstream source error: {0}")]
    SourceError(Arc<dyn std::error::Error + Send + Sync>),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Incomplete { path: a }, Self::Incomplete { path: b }) => a == b,
            (
                Self::Malformed {
                    path: a,
                    message: am,
                },
                Self::Malformed {
                    path: b,
                    message: bm,
                },
            ) => a == b && am == bm,
            (
                Self::TypeMismatch {
                    path: a,
                    expected: ae,
                    found: af,
                },
                Self::TypeMismatch {
                    path: b,
                    expected: be,
                    found: bf,
                },
            ) => a == b && ae == be && af == bf,
            (Self::BadPath { text: a }, Self::BadPath { text: b }) => a == b,
            (Self::Disposed, Self::Disposed) => true,
            (Self::SourceError(a), Self::SourceError(b)) => {
                std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
            }
            _ => false,
        }
    }
}
