//! A streaming, path-addressable JSON parser for loosely-formatted LLM
//! output.
//!
//! The parser consumes a sequence of text fragments known to contain a
//! single top-level JSON value, optionally surrounded by extraneous text,
//! and exposes each property as an independent async subscription keyed
//! by a dotted/indexed [`Path`] (`user.profile.name`, `items[2].tags[0]`).
//! Subscribers may attach before, during, or after the value at their
//! path has parsed, and receive a final value plus, where meaningful, a
//! sequence of incremental updates as fragments arrive.
//!
//! ```no_run
//! use futures::stream;
//! use pathjson::{Parser, ParserOptions, Path, ValueKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = Parser::new(ParserOptions::default());
//! let handle = parser.subscribe(&Path::parse("name")?, ValueKind::String)?;
//!
//! let engine = parser.engine();
//! let fragments = stream::iter(vec![Ok::<_, std::io::Error>(
//!     r#"{"name":"Alice"}"#.to_string(),
//! )]);
//! tokio::spawn(engine.run(fragments));
//!
//! assert_eq!(handle.await_final().await?.as_str(), Some("Alice"));
//! # Ok(())
//! # }
//! ```

mod controller;
mod delegate;
mod engine;
mod error;
mod facade;
mod handle;
mod kind;
mod options;
mod path;
mod registry;
mod value;

pub use controller::Emission;
pub use engine::{Disposer, ParserEngine};
pub use error::Error;
pub use handle::{BoxStream, Handle};
pub use kind::ValueKind;
pub use options::ParserOptions;
pub use path::{Path, PathComponent};
pub use value::{Array, JsonValue, Map};

use std::sync::Arc;

use registry::Registry;

/// Entry point: owns the controller registry shared between subscribers
/// and a [`ParserEngine`] driving upstream fragments into it.
///
/// A `Parser` is cheap to clone; clones share the same registry, so
/// subscribing through one clone observes values discovered through
/// another. [`Parser::engine`] should be called exactly once per parse
/// session — it hands out the [`ParserEngine`] that must be driven with
/// [`ParserEngine::run`].
#[derive(Clone)]
pub struct Parser {
    registry: Arc<Registry>,
    options: ParserOptions,
}

impl Parser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    /// Subscribes to `path`, creating its controller as `kind` if it does
    /// not exist yet. Fails with [`Error::TypeMismatch`] if a controller
    /// already exists at `path` with a different kind.
    pub fn subscribe(&self, path: &Path, kind: ValueKind) -> Result<Handle, Error> {
        let controller = self.registry.get_or_create(path, kind)?;
        Ok(Handle::new(controller, Arc::clone(&self.registry)))
    }

    /// Builds the [`ParserEngine`] for this session. Call [`ParserEngine::run`]
    /// with the upstream fragment source to actually drive parsing.
    #[must_use]
    pub fn engine(&self) -> ParserEngine {
        ParserEngine::new(Arc::clone(&self.registry), self.options)
    }
}
