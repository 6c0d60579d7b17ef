//! The public, consumer-facing subscription API.

use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt as _;

use crate::controller::{ChildAnnounced, Emission, StreamController};
use crate::error::Error;
use crate::kind::ValueKind;
use crate::path::{Path, PathComponent};
use crate::registry::Registry;
use crate::value::JsonValue;

/// A boxed, `Send` async sequence, the shape every `iterate()`/`on_*()`
/// stream is returned as.
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// A consumer-side handle combining a one-shot future and an asynchronous
/// sequence over one path.
///
/// Obtained from [`crate::Parser::subscribe`]. May be obtained before,
/// during, or after the value at its path has been parsed.
#[derive(Clone)]
pub struct Handle {
    controller: Arc<StreamController>,
    registry: Arc<Registry>,
}

impl Handle {
    pub(crate) fn new(controller: Arc<StreamController>, registry: Arc<Registry>) -> Self {
        Self {
            controller,
            registry,
        }
    }

    /// The path this handle was subscribed at.
    #[must_use]
    pub fn path(&self) -> Path {
        self.controller.path()
    }

    /// The kind declared/discovered for this path.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.controller.kind()
    }

    /// Yields the full value once the node at this path completes.
    ///
    /// If the parser is disposed while this future is pending, it
    /// resolves with [`Error::Disposed`].
    pub async fn await_final(&self) -> Result<JsonValue, Error> {
        match self.controller.subscribe_future().await {
            Ok(result) => result,
            Err(_recv_error) => Err(Error::Disposed),
        }
    }

    /// An async sequence of `(chunk | snapshot)` for this path:
    ///
    /// - `String`: text fragments whose concatenation equals the final
    ///   value.
    /// - `Object`/`Array`: monotonic snapshots of partial contents.
    /// - Atomic kinds: the single final value, exactly once.
    #[must_use]
    pub fn iterate(&self) -> BoxStream<Result<Emission, Error>> {
        Box::pin(UnboundedReceiverStream::new(
            self.controller.subscribe_stream(),
        ))
    }

    /// Fires `(child_handle, key)` for each key discovered on an object,
    /// strictly before any chunk or completion is observed on that child.
    ///
    /// Only meaningful when [`Handle::kind`] is [`ValueKind::Object`].
    #[must_use]
    pub fn on_property(&self) -> BoxStream<(Handle, Arc<str>)> {
        let registry = Arc::clone(&self.registry);
        let announcements = self.controller.subscribe_children();
        Box::pin(UnboundedReceiverStream::new(announcements).filter_map(
            move |announced: ChildAnnounced| {
                let PathComponent::Key(key) = announced.component else {
                    return None;
                };
                let controller = registry.get(&announced.child_path)?;
                Some((Handle::new(controller, Arc::clone(&registry)), key))
            },
        ))
    }

    /// Fires `(child_handle, index)` for each element appended to an
    /// array, strictly before any chunk or completion is observed on that
    /// child.
    ///
    /// Only meaningful when [`Handle::kind`] is [`ValueKind::Array`].
    #[must_use]
    pub fn on_element(&self) -> BoxStream<(Handle, usize)> {
        let registry = Arc::clone(&self.registry);
        let announcements = self.controller.subscribe_children();
        Box::pin(UnboundedReceiverStream::new(announcements).filter_map(
            move |announced: ChildAnnounced| {
                let PathComponent::Index(index) = announced.component else {
                    return None;
                };
                let controller = registry.get(&announced.child_path)?;
                Some((Handle::new(controller, Arc::clone(&registry)), index))
            },
        ))
    }
}
