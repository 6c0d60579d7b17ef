use std::sync::Arc;

use super::{PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::options::ParserOptions;
use crate::path::Path;
use crate::value::JsonValue;

/// §4.3.3 — matches the literal character sequences `true`/`false`.
#[derive(Debug)]
pub(crate) struct BooleanDelegate {
    path: Path,
    controller: Arc<StreamController>,
    expected: &'static str,
    value: bool,
    matched: usize,
    options: ParserOptions,
}

impl BooleanDelegate {
    pub(crate) fn new(
        path: Path,
        controller: Arc<StreamController>,
        first: char,
        options: ParserOptions,
    ) -> Self {
        let (expected, value) = if first == 't' {
            ("true", true)
        } else {
            ("false", false)
        };
        Self {
            path,
            controller,
            expected,
            value,
            matched: 0,
            options,
        }
    }
}

impl PropertyDelegate for BooleanDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        let expected_char = self.expected.as_bytes()[self.matched] as char;
        if c == expected_char {
            self.matched += 1;
            if self.matched == self.expected.len() {
                self.controller.complete(JsonValue::Boolean(self.value));
                return Ok((Step::Done { reprocess: false }, None));
            }
            return Ok((Step::Continue, None));
        }

        // A delimiter before the literal finished: in lenient mode, the
        // delegate completes with the value it already committed to.
        if !self.options.strict && matches!(c, ',' | '}' | ']') {
            self.controller.complete(JsonValue::Boolean(self.value));
            return Ok((Step::Done { reprocess: true }, None));
        }

        Err(Error::Malformed {
            path: self.path.clone(),
            message: format!("expected {:?}, found {c:?}", self.expected),
        })
    }

    fn on_chunk_end(&mut self) {}

    fn on_child_done(&mut self) {
        unreachable!("BooleanDelegate never spawns children");
    }
}
