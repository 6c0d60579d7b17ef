use std::sync::Arc;

use super::{child_path, decode_escape, spawn_child, PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::options::ParserOptions;
use crate::path::{Path, PathComponent};
use crate::registry::Registry;
use crate::value::{JsonValue, Map};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    WaitingForKey,
    /// Like `WaitingForKey`, but reached after a comma: a `}` found here
    /// is a trailing comma, tolerated unless `options.strict`.
    WaitingForKeyAfterComma,
    ReadingKey,
    WaitingForValue,
    /// Reachable only structurally (mirrors the JSON-node's lifecycle);
    /// never invoked directly, because while a value is being read its
    /// child delegate sits on top of the facade's stack and receives
    /// every character instead of this delegate.
    ReadingValue,
    WaitingForCommaOrEnd,
}

/// §4.3.5 — parses a JSON object.
#[derive(Debug)]
pub(crate) struct ObjectDelegate {
    path: Path,
    controller: Arc<StreamController>,
    registry: Arc<Registry>,
    options: ParserOptions,
    state: State,
    key_buffer: String,
    key_escaping: bool,
    current_key: Option<Arc<str>>,
    latest: Map,
    active_child: Option<(Arc<str>, Arc<StreamController>)>,
}

impl ObjectDelegate {
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
            key_buffer: String::new(),
            key_escaping: false,
            current_key: None,
            latest: Map::new(),
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
            .complete(JsonValue::Object(std::mem::take(&mut self.latest)));
    }
}

impl PropertyDelegate for ObjectDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        match self.state {
            State::Start => {
                debug_assert_eq!(c, '{');
                self.state = State::WaitingForKey;
                Ok((Step::Continue, None))
            }

            State::WaitingForKey | State::WaitingForKeyAfterComma => {
                if self.options.is_whitespace(c) {
                    return Ok((Step::Continue, None));
                }
                match c {
                    '"' => {
                        self.key_buffer.clear();
                        self.key_escaping = false;
                        self.state = State::ReadingKey;
                        Ok((Step::Continue, None))
                    }
                    '}' if self.state == State::WaitingForKeyAfterComma && self.options.strict => {
                        Err(self.malformed("trailing comma before '}'"))
                    }
                    '}' => {
                        self.finish();
                        Ok((Step::Done { reprocess: false }, None))
                    }
                    _ => Err(self.malformed(format!("expected '\"' or '}}', found {c:?}"))),
                }
            }

            State::ReadingKey => {
                if self.key_escaping {
                    self.key_escaping = false;
                    match decode_escape(c) {
                        Some(decoded) => self.key_buffer.push(decoded),
                        None => {
                            self.key_buffer.push('\\');
                            self.key_buffer.push(c);
                        }
                    }
                    return Ok((Step::Continue, None));
                }
                match c {
                    '\\' => {
                        self.key_escaping = true;
                        Ok((Step::Continue, None))
                    }
                    '"' => {
                        self.current_key = Some(Arc::from(self.key_buffer.as_str()));
                        self.state = State::WaitingForValue;
                        Ok((Step::Continue, None))
                    }
                    _ => {
                        self.key_buffer.push(c);
                        Ok((Step::Continue, None))
                    }
                }
            }

            State::WaitingForValue => {
                if c == ':' || self.options.is_whitespace(c) {
                    return Ok((Step::Continue, None));
                }
                let key = self
                    .current_key
                    .clone()
                    .expect("current_key set before entering WaitingForValue");
                let component = PathComponent::Key(Arc::clone(&key));
                let path = child_path(&self.path, &component);

                self.latest.insert(key.to_string(), JsonValue::Null);

                let (controller, delegate) =
                    spawn_child(path.clone(), c, &self.registry, self.options)?;
                self.controller.announce_child(component, path);
                self.active_child = Some((key, controller));
                self.state = State::ReadingValue;
                Ok((Step::Continue, Some(delegate)))
            }

            State::ReadingValue => {
                unreachable!(
                    "ObjectDelegate is never top-of-stack while its child is active: {c:?}"
                )
            }

            State::WaitingForCommaOrEnd => {
                if self.options.is_whitespace(c) {
                    return Ok((Step::Continue, None));
                }
                match c {
                    ',' => {
                        self.state = State::WaitingForKeyAfterComma;
                        Ok((Step::Continue, None))
                    }
                    '}' => {
                        self.finish();
                        Ok((Step::Done { reprocess: false }, None))
                    }
                    _ => Err(self.malformed(format!("expected ',' or '}}', found {c:?}"))),
                }
            }
        }
    }

    fn on_chunk_end(&mut self) {
        self.controller
            .publish_snapshot(JsonValue::Object(self.latest.clone()));
    }

    fn on_child_done(&mut self) {
        let (key, controller) = self
            .active_child
            .take()
            .expect("on_child_done called without an active child");
        let value = controller.peek_final().unwrap_or(JsonValue::Null);
        self.latest.insert(key.to_string(), value);
        self.state = State::WaitingForCommaOrEnd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ValueKind;

    fn fresh() -> (Arc<StreamController>, ObjectDelegate) {
        let registry = Registry::new();
        let controller = StreamController::new(Path::root(), ValueKind::Object);
        let delegate = ObjectDelegate::new(
            Path::root(),
            Arc::clone(&controller),
            registry,
            ParserOptions::default(),
        );
        (controller, delegate)
    }

    #[test]
    fn parses_empty_object() {
        let (controller, mut delegate) = fresh();
        delegate.add_character('{').unwrap();
        let (step, _) = delegate.add_character('}').unwrap();
        assert_eq!(step, Step::Done { reprocess: false });
        assert_eq!(controller.peek_final(), Some(JsonValue::Object(Map::new())));
    }

    #[test]
    fn spawns_child_on_atomic_value_and_reprocesses_its_delimiter() {
        let (controller, mut delegate) = fresh();
        delegate.add_character('{').unwrap();
        for c in "\"age\":".chars() {
            delegate.add_character(c).unwrap();
        }
        let (_, child) = delegate.add_character('3').unwrap();
        let mut child = child.expect("age's value spawns a NumberDelegate");
        let (step, _) = child.add_character('0').unwrap();
        assert_eq!(step, Step::Continue);
        // The closing brace terminates the number but is not consumed by
        // it; the object delegate must see it again after on_child_done.
        let (step, _) = child.add_character('}').unwrap();
        assert_eq!(step, Step::Done { reprocess: true });
        delegate.on_child_done();
        let (step, _) = delegate.add_character('}').unwrap();
        assert_eq!(step, Step::Done { reprocess: false });

        let mut expected = Map::new();
        expected.insert("age".into(), JsonValue::Number(30.0));
        assert_eq!(controller.peek_final(), Some(JsonValue::Object(expected)));
    }

    #[test]
    fn trailing_comma_is_tolerated_in_lenient_mode() {
        let (controller, mut delegate) = fresh();
        delegate.add_character('{').unwrap();
        for c in "\"a\":".chars() {
            delegate.add_character(c).unwrap();
        }
        let (_, child) = delegate.add_character('1').unwrap();
        let mut child = child.expect("a's value spawns a NumberDelegate");
        let (step, _) = child.add_character(',').unwrap();
        assert_eq!(step, Step::Done { reprocess: true });
        delegate.on_child_done();
        delegate.add_character(',').unwrap();
        let (step, _) = delegate.add_character('}').unwrap();
        assert_eq!(step, Step::Done { reprocess: false });

        let mut expected = Map::new();
        expected.insert("a".into(), JsonValue::Number(1.0));
        assert_eq!(controller.peek_final(), Some(JsonValue::Object(expected)));
    }

    #[test]
    fn strict_mode_rejects_trailing_comma() {
        let registry = Registry::new();
        let controller = StreamController::new(Path::root(), ValueKind::Object);
        let mut delegate = ObjectDelegate::new(
            Path::root(),
            controller,
            registry,
            ParserOptions {
                strict: true,
                ..Default::default()
            },
        );
        delegate.add_character('{').unwrap();
        for c in "\"a\":".chars() {
            delegate.add_character(c).unwrap();
        }
        let (_, child) = delegate.add_character('1').unwrap();
        let mut child = child.unwrap();
        let (step, _) = child.add_character(',').unwrap();
        assert_eq!(step, Step::Done { reprocess: true });
        delegate.on_child_done();
        delegate.add_character(',').unwrap();
        assert!(matches!(
            delegate.add_character('}'),
            Err(Error::Malformed { .. })
        ));
    }
}
