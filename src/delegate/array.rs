use std::sync::Arc;

use super::{child_path, spawn_child, PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::options::ParserOptions;
use crate::path::{Path, PathComponent};
use crate::registry::Registry;
use crate::value::JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    WaitingForElementOrEnd,
    /// Like `WaitingForElementOrEnd`, but reached after a comma: a `]`
    /// found here is a trailing comma, tolerated unless `options.strict`.
    WaitingForElementOrEndAfterComma,
    /// Reachable only structurally; see [`super::object::ObjectDelegate`]'s
    /// identically-named state for why this is never entered in practice.
    ReadingElement,
    WaitingForCommaOrEnd,
}

/// §4.3.6 — parses a JSON array.
#[derive(Debug)]
pub(crate) struct ArrayDelegate {
    path: Path,
    controller: Arc<StreamController>,
    registry: Arc<Registry>,
    options: ParserOptions,
    state: State,
    latest: Vec<JsonValue>,
    active_child: Option<Arc<StreamController>>,
}

impl ArrayDelegate {
    pub(crate) fn new(
        path: Path,
        controller: Arc<StreamController>,
        registry: Arc<Registry>,
        options: ParserOptions,
    ) -> Self {
        Self {
            path,
            controller,
            registry,
            options,
            state: State::Start,
            latest: Vec::new(),
            active_child: None,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::Malformed {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn finish(&mut self) {
        self.controller
            .complete(JsonValue::Array(std::mem::take(&mut self.latest)));
    }

    fn spawn_element(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        let index = self.latest.len();
        let component = PathComponent::Index(index);
        let path = child_path(&self.path, &component);

        self.latest.push(JsonValue::Null);

        let (controller, delegate) = spawn_child(path.clone(), c, &self.registry, self.options)?;
        self.controller.announce_child(component, path);
        self.active_child = Some(controller);
        self.state = State::ReadingElement;
        Ok((Step::Continue, Some(delegate)))
    }
}

impl PropertyDelegate for ArrayDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        match self.state {
            State::Start => {
                debug_assert_eq!(c, '[');
                self.state = State::WaitingForElementOrEnd;
                Ok((Step::Continue, None))
            }

            State::WaitingForElementOrEnd | State::WaitingForElementOrEndAfterComma => {
                if self.options.is_whitespace(c) {
                    return Ok((Step::Continue, None));
                }
                if c == ']' {
                    if self.state == State::WaitingForElementOrEndAfterComma && self.options.strict
                    {
                        return Err(self.malformed("trailing comma before ']'"));
                    }
                    self.finish();
                    return Ok((Step::Done { reprocess: false }, None));
                }
                self.spawn_element(c)
            }

            State::ReadingElement => {
                unreachable!(
                    "ArrayDelegate is never top-of-stack while its child is active: {c:?}"
                )
            }

            State::WaitingForCommaOrEnd => {
                if self.options.is_whitespace(c) {
                    return Ok((Step::Continue, None));
                }
                match c {
                    ',' => {
                        self.state = State::WaitingForElementOrEndAfterComma;
                        Ok((Step::Continue, None))
                    }
                    ']' => {
                        self.finish();
                        Ok((Step::Done { reprocess: false }, None))
                    }
                    _ => Err(self.malformed(format!("expected ',' or ']', found {c:?}"))),
                }
            }
        }
    }

    fn on_chunk_end(&mut self) {
        self.controller
            .publish_snapshot(JsonValue::Array(self.latest.clone()));
    }

    fn on_child_done(&mut self) {
        let controller = self
            .active_child
            .take()
            .expect("on_child_done called without an active child");
        let value = controller.peek_final().unwrap_or(JsonValue::Null);
        *self
            .latest
            .last_mut()
            .expect("element slot reserved when the child was spawned") = value;
        self.state = State::WaitingForCommaOrEnd;
    }
}
