//! Owns the delegate stack and drives character-by-character dispatch.
//!
//! The facade never recurses into delegates' private state; it only ever
//! calls [`crate::delegate::PropertyDelegate::add_character`] on the
//! current top-of-stack, pushes a spawned child, or pops a finished one and
//! notifies the new top via `on_child_done`. The "reprocessing rule" (see
//! the module docs on [`crate::delegate`]) is implemented entirely here:
//! a `Step::Done { reprocess: true }` re-feeds the same character to the
//! delegate that becomes active after the pop.

use std::sync::Arc;

use crate::delegate::{build_delegate, PropertyDelegate, Step};
use crate::error::Error;
use crate::kind::ValueKind;
use crate::options::ParserOptions;
use crate::path::Path;
use crate::registry::Registry;

pub(crate) struct ParserFacade {
    stack: Vec<Box<dyn PropertyDelegate>>,
    registry: Arc<Registry>,
    options: ParserOptions,
    /// Set once the root delegate completes. From then on every character
    /// is silently discarded (the yap filter).
    root_done: bool,
}

impl ParserFacade {
    pub(crate) fn new(registry: Arc<Registry>, options: ParserOptions) -> Self {
        Self {
            stack: Vec::new(),
            registry,
            options,
            root_done: false,
        }
    }

    #[must_use]
    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub(crate) fn root_done(&self) -> bool {
        self.root_done
    }

    /// Feeds one character of upstream text. Before the root kind is
    /// known, leading whitespace is skipped and the first non-whitespace
    /// character selects and spawns the root delegate.
    pub(crate) fn add_character(&mut self, c: char) -> Result<(), Error> {
        if self.root_done {
            return Ok(());
        }

        if self.stack.is_empty() {
            if self.options.is_whitespace(c) {
                return Ok(());
            }
            let kind = ValueKind::from_first_char(c);
            // A subscriber may have pre-declared the root with a kind that
            // differs from what the document actually starts with; that is
            // local to the subscriber's own subscription (spec §7), so it
            // must not fail the parse itself.
            let controller = self.registry.resolve_for_parser(&Path::root(), kind);
            let mut root = build_delegate(
                kind,
                Path::root(),
                controller,
                Arc::clone(&self.registry),
                self.options,
                c,
            );
            let (step, spawned) = root.add_character(c)?;
            self.stack.push(root);
            if let Some(child) = spawned {
                self.stack.push(child);
            } else if matches!(step, Step::Done { .. }) {
                // Only a deciding character that also completes the value
                // can trigger this; no scalar delegate does so on its
                // first character, but it is handled rather than assumed
                // away.
                self.stack.pop();
                self.root_done = true;
            }
            return Ok(());
        }

        let mut pending = Some(c);
        while let Some(ch) = pending.take() {
            let top = self
                .stack
                .last_mut()
                .expect("loop only runs while the stack is non-empty");
            let (step, spawned) = top.add_character(ch)?;
            if let Some(child) = spawned {
                self.stack.push(child);
                continue;
            }
            if let Step::Done { reprocess } = step {
                self.stack.pop();
                if self.stack.is_empty() {
                    self.root_done = true;
                    return Ok(());
                }
                self.stack
                    .last_mut()
                    .expect("checked non-empty above")
                    .on_child_done();
                if reprocess {
                    pending = Some(ch);
                }
            }
        }
        Ok(())
    }

    /// Called at the boundary between upstream fragments: innermost
    /// delegate first, root last.
    pub(crate) fn on_chunk_end(&mut self) {
        for delegate in self.stack.iter_mut().rev() {
            delegate.on_chunk_end();
        }
    }

    /// End-of-stream flush: one last `on_chunk_end`, then, if the root
    /// never completed, fails every still-open controller with
    /// `Incomplete`.
    pub(crate) fn finish(&mut self) {
        self.on_chunk_end();
        if !self.root_done {
            self.registry.fail_all_open(&Error::Incomplete {
                path: Path::root(),
            });
        }
    }
}
