//! Per-node state machines that consume characters, emit chunks/snapshots
//! through their controller, and spawn child delegates.
//!
//! Delegates form a parent-to-child stack mirroring the JSON tree
//! currently being parsed (see [`crate::facade::ParserFacade`]). A
//! delegate never holds a back-reference to its parent; instead the
//! parent keeps the child's own [`StreamController`] handle and reads its
//! final value once notified via [`PropertyDelegate::on_child_done`].

mod array;
mod boolean;
mod null;
mod number;
mod object;
mod string;

pub(crate) use array::ArrayDelegate;
pub(crate) use boolean::BooleanDelegate;
pub(crate) use null::NullDelegate;
pub(crate) use number::NumberDelegate;
pub(crate) use object::ObjectDelegate;
pub(crate) use string::StringDelegate;

use std::sync::Arc;

use crate::controller::StreamController;
use crate::error::Error;
use crate::kind::ValueKind;
use crate::options::ParserOptions;
use crate::path::{Path, PathComponent};
use crate::registry::Registry;

/// The escape table applied to both string literals and object keys
/// (§4.3.1's default, reused for `ReadingKey` per the crate's own
/// resolution of that spec ambiguity). Unknown escape letters are not
/// decoded; the caller is expected to push the backslash and reprocess
/// the letter verbatim, which also yields the crate's chosen behavior
/// for `\u` (never decoded).
pub(crate) fn decode_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '/' => Some('/'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// What happened when a delegate was fed one more character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The delegate consumed the character and is not yet finished.
    Continue,
    /// The delegate finished. `reprocess` is the single subtlest contract
    /// in the parser: `true` means the character that triggered
    /// completion was a delimiter the delegate did **not** consume (an
    /// atomic scalar's terminator), and the caller must re-deliver it to
    /// whichever delegate becomes active next. `false` means the
    /// character was consumed by this completion (a container's own
    /// closing bracket).
    Done { reprocess: bool },
}

/// Per-node parsing state machine. See the module docs for the stack
/// protocol that owns these.
pub(crate) trait PropertyDelegate: std::fmt::Debug {
    /// Feeds one character. May return a newly-spawned child delegate,
    /// which the caller (the facade) must push onto the delegate stack
    /// immediately, making it the new active delegate.
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error>;

    /// Called at the boundary between upstream fragments, innermost
    /// delegate first, so that delegates accumulating partial values can
    /// flush a progress emission.
    fn on_chunk_end(&mut self);

    /// Called on the new top-of-stack delegate immediately after its
    /// active child finished and was popped, before any reprocessing of
    /// a left-over delimiter. The child's final value is available via
    /// the controller handle the parent captured when it spawned the
    /// child.
    fn on_child_done(&mut self);
}

/// Builds the delegate appropriate for `kind`, but does not feed it any
/// character yet.
pub(crate) fn build_delegate(
    kind: ValueKind,
    path: Path,
    controller: Arc<StreamController>,
    registry: Arc<Registry>,
    options: ParserOptions,
    first_char: char,
) -> Box<dyn PropertyDelegate> {
    match kind {
        ValueKind::String => Box::new(StringDelegate::new(path, controller)),
        ValueKind::Number => Box::new(NumberDelegate::new(path, controller)),
        ValueKind::Boolean => Box::new(BooleanDelegate::new(path, controller, first_char, options)),
        ValueKind::Null => Box::new(NullDelegate::new(path, controller, options)),
        ValueKind::Object => Box::new(ObjectDelegate::new(path, controller, registry, options)),
        ValueKind::Array => Box::new(ArrayDelegate::new(path, controller, registry, options)),
    }
}

/// Creates the controller and delegate for a newly-discovered child of an
/// object or array, forwards the deciding character to it (step (e) of
/// §4.3.5/§4.3.6), and returns both. The caller is then responsible for
/// announcing the child on its own controller and pushing the returned
/// delegate onto the facade's stack.
///
/// A subscriber may have pre-declared `child_path` with a kind that turns
/// out to differ from what is actually parsed here; that is local to the
/// subscriber's own subscription (spec §7), so it is resolved via
/// [`Registry::resolve_for_parser`] rather than erroring the whole parse.
pub(crate) fn spawn_child(
    child_path: Path,
    first_char: char,
    registry: &Arc<Registry>,
    options: ParserOptions,
) -> Result<(Arc<StreamController>, Box<dyn PropertyDelegate>), Error> {
    let kind = ValueKind::from_first_char(first_char);
    let controller = registry.resolve_for_parser(&child_path, kind);
    let mut delegate = build_delegate(
        kind,
        child_path.clone(),
        Arc::clone(&controller),
        Arc::clone(registry),
        options,
        first_char,
    );
    let (step, spawned) = delegate.add_character(first_char)?;
    debug_assert!(
        spawned.is_none(),
        "a delegate's first (deciding) character must never itself spawn a grandchild"
    );
    if matches!(step, Step::Done { .. }) {
        return Err(Error::Malformed {
            path: child_path,
            message: "value completed on its first character".into(),
        });
    }
    Ok((controller, delegate))
}

/// Computes the child path for a newly-discovered object key or array
/// index.
pub(crate) fn child_path(parent: &Path, component: &PathComponent) -> Path {
    match component {
        PathComponent::Key(k) => parent.append_key(Arc::clone(k)),
        PathComponent::Index(i) => parent.append_index(*i),
    }
}
