use std::sync::Arc;

use super::{PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::path::Path;
use crate::value::JsonValue;

/// §4.3.2 — parses a JSON number literal. Atomic: emits no intermediate
/// chunks, and does not consume the delimiter that ends it.
#[derive(Debug)]
pub(crate) struct NumberDelegate {
    path: Path,
    controller: Arc<StreamController>,
    buffer: String,
}

impl NumberDelegate {
    pub(crate) fn new(path: Path, controller: Arc<StreamController>) -> Self {
        Self {
            path,
            controller,
            buffer: String::new(),
        }
    }

    fn is_number_char(c: char) -> bool {
        c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
    }
}

impl PropertyDelegate for NumberDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        if Self::is_number_char(c) {
            self.buffer.push(c);
            return Ok((Step::Continue, None));
        }

        let value: f64 = self.buffer.parse().map_err(|_| Error::Malformed {
            path: self.path.clone(),
            message: format!("invalid number literal {:?}", self.buffer),
        })?;
        self.controller.complete(JsonValue::Number(value));
        Ok((Step::Done { reprocess: true }, None))
    }

    fn on_chunk_end(&mut self) {}

    fn on_child_done(&mut self) {
        unreachable!("NumberDelegate never spawns children");
    }
}
