use std::sync::Arc;

use super::{PropertyDelegate, Step};
use crate::controller::StreamController;
use crate::error::Error;
use crate::options::ParserOptions;
use crate::path::Path;
use crate::value::JsonValue;

const NULL: &str = "null";

/// §4.3.4 — analogous to [`super::BooleanDelegate`] for the literal `null`.
#[derive(Debug)]
pub(crate) struct NullDelegate {
    path: Path,
    controller: Arc<StreamController>,
    matched: usize,
    options: ParserOptions,
}

impl NullDelegate {
    pub(crate) fn new(path: Path, controller: Arc<StreamController>, options: ParserOptions) -> Self {
        Self {
            path,
            controller,
            matched: 0,
            options,
        }
    }
}

impl PropertyDelegate for NullDelegate {
    fn add_character(
        &mut self,
        c: char,
    ) -> Result<(Step, Option<Box<dyn PropertyDelegate>>), Error> {
        let expected_char = NULL.as_bytes()[self.matched] as char;
        if c == expected_char {
            self.matched += 1;
            if self.matched == NULL.len() {
                self.controller.complete(JsonValue::Null);
                return Ok((Step::Done { reprocess: false }, None));
            }
            return Ok((Step::Continue, None));
        }

        if !self.options.strict && matches!(c, ',' | '}' | ']') {
            self.controller.complete(JsonValue::Null);
            return Ok((Step::Done { reprocess: true }, None));
        }

        Err(Error::Malformed {
            path: self.path.clone(),
            message: format!("expected \"null\", found {c:?}"),
        })
    }

    fn on_chunk_end(&mut self) {}

    fn on_child_done(&mut self) {
        unreachable!("NullDelegate never spawns children");
    }
}
