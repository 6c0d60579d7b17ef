use std::sync::Arc;

use super::{decode_escape, PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::path::Path;
use crate::value::JsonValue;

/// §4.3.1 — parses a JSON string literal.
#[derive(Debug)]
pub(crate) struct StringDelegate {
    path: Path,
    controller: Arc<StreamController>,
    buffer: String,
    escaping: bool,
    seen_open_quote: bool,
}

impl StringDelegate {
    pub(crate) fn new(path: Path, controller: Arc<StreamController>) -> Self {
        Self {
            path,
            controller,
            buffer: String::new(),
            escaping: false,
            seen_open_quote: false,
        }
    }
}

impl PropertyDelegate for StringDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        if !self.seen_open_quote {
            if c != '"' {
                return Err(Error::Malformed {
                    path: self.path.clone(),
                    message: format!("expected opening '\"', found {c:?}"),
                });
            }
            self.seen_open_quote = true;
            return Ok((Step::Continue, None));
        }

        if self.escaping {
            self.escaping = false;
            match decode_escape(c) {
                Some(decoded) => self.buffer.push(decoded),
                None => {
                    self.buffer.push('\\');
                    self.buffer.push(c);
                }
            }
            return Ok((Step::Continue, None));
        }

        match c {
            '\\' => {
                self.escaping = true;
                Ok((Step::Continue, None))
            }
            '"' => {
                if !self.buffer.is_empty() {
                    self.controller.append_text(&self.buffer);
                    self.buffer.clear();
                }
                let full = self.controller.latest_text();
                self.controller.complete(JsonValue::String(full));
                Ok((Step::Done { reprocess: false }, None))
            }
            _ => {
                self.buffer.push(c);
                Ok((Step::Continue, None))
            }
        }
    }

    fn on_chunk_end(&mut self) {
        if !self.buffer.is_empty() {
            self.controller.append_text(&self.buffer);
            self.buffer.clear();
        }
    }

    fn on_child_done(&mut self) {
        unreachable!("StringDelegate never spawns children");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ValueKind;

    fn feed(delegate: &mut StringDelegate, text: &str) {
        for c in text.chars() {
            let (step, spawn) = delegate.add_character(c).unwrap();
            assert!(spawn.is_none());
            assert_eq!(step, Step::Continue);
        }
    }

    #[test]
    fn parses_simple_string() {
        let controller = StreamController::new(Path::root(), ValueKind::String);
        let mut delegate = StringDelegate::new(Path::root(), Arc::clone(&controller));
        feed(&mut delegate, "\"hello");
        let (step, _) = delegate.add_character('"').unwrap();
        assert_eq!(step, Step::Done { reprocess: false });
        assert_eq!(controller.peek_final(), Some(JsonValue::String("hello".into())));
    }

    #[test]
    fn decodes_named_escapes() {
        let controller = StreamController::new(Path::root(), ValueKind::String);
        let mut delegate = StringDelegate::new(Path::root(), Arc::clone(&controller));
        feed(&mut delegate, "\"Hello\\nWorld");
        delegate.add_character('"').unwrap();
        assert_eq!(
            controller.peek_final(),
            Some(JsonValue::String("Hello\nWorld".into()))
        );
    }

    #[test]
    fn unknown_escape_passes_through_verbatim() {
        let controller = StreamController::new(Path::root(), ValueKind::String);
        let mut delegate = StringDelegate::new(Path::root(), Arc::clone(&controller));
        feed(&mut delegate, "\"a\\u0041b");
        delegate.add_character('"').unwrap();
        assert_eq!(
            controller.peek_final(),
            Some(JsonValue::String("a\\u0041b".into()))
        );
    }

    #[test]
    fn chunk_end_flushes_buffer() {
        let controller = StreamController::new(Path::root(), ValueKind::String);
        let mut delegate = StringDelegate::new(Path::root(), Arc::clone(&controller));
        feed(&mut delegate, "\"par");
        delegate.on_chunk_end();
        assert_eq!(controller.latest_text(), "par");
        feed(&mut delegate, "tial");
        delegate.add_character('"').unwrap();
        assert_eq!(controller.latest_text(), "partial");
    }
}
