//! Per-path fan-out: buffers the latest value/snapshot and multiplexes
//! chunk deliveries and completion/error to any number of late or early
//! subscribers.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use crate::error::Error;
use crate::kind::ValueKind;
use crate::path::{Path, PathComponent};
use crate::value::JsonValue;

/// One item delivered to a stream-style subscriber.
#[derive(Debug, Clone)]
pub enum Emission {
    /// A text fragment appended to a string value. Concatenating every
    /// `StringChunk` emitted on a path reproduces the path's final value.
    StringChunk(Arc<str>),
    /// A shallow snapshot of an object or array's current partial
    /// contents.
    Snapshot(JsonValue),
    /// The single emission produced for atomic kinds (number, boolean,
    /// null): equal to the final value, emitted exactly once.
    Value(JsonValue),
}

/// Notification that an object gained a key or an array gained an element,
/// fired strictly before any chunk or completion is observed on the child.
#[derive(Debug, Clone)]
pub struct ChildAnnounced {
    pub component: PathComponent,
    pub child_path: Path,
}

struct Inner {
    kind: ValueKind,
    path: Path,
    text: String,
    snapshot: Option<JsonValue>,
    final_value: Option<JsonValue>,
    error: Option<Error>,
    closed: bool,
    chunk_subs: Vec<mpsc::UnboundedSender<Result<Emission, Error>>>,
    final_waiters: Vec<oneshot::Sender<Result<JsonValue, Error>>>,
    child_subs: Vec<mpsc::UnboundedSender<ChildAnnounced>>,
    announced_children: Vec<ChildAnnounced>,
}

/// The per-path fan-out point: one [`StreamController`] is created per path
/// on first demand, from either a subscriber or the parser itself.
pub struct StreamController {
    inner: Mutex<Inner>,
}

impl StreamController {
    pub(crate) fn new(path: Path, kind: ValueKind) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                kind,
                path,
                text: String::new(),
                snapshot: None,
                final_value: None,
                error: None,
                closed: false,
                chunk_subs: Vec::new(),
                final_waiters: Vec::new(),
                child_subs: Vec::new(),
                announced_children: Vec::new(),
            }),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.inner.lock().unwrap().kind
    }

    #[must_use]
    pub fn path(&self) -> Path {
        self.inner.lock().unwrap().path.clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// The accumulated text so far, for a `String`-kind controller.
    #[must_use]
    pub fn latest_text(&self) -> String {
        self.inner.lock().unwrap().text.clone()
    }

    /// The most recent shallow snapshot, for an `Object`/`Array`-kind
    /// controller.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<JsonValue> {
        self.inner.lock().unwrap().snapshot.clone()
    }

    /// Synchronously peeks the final value, if the controller has already
    /// completed successfully. Used internally by parent delegates to
    /// read a just-finished child's value without going through the async
    /// subscription API.
    #[must_use]
    pub(crate) fn peek_final(&self) -> Option<JsonValue> {
        self.inner.lock().unwrap().final_value.clone()
    }

    /// Appends a text fragment and notifies stream-style subscribers.
    /// No-op once the controller is closed.
    pub fn append_text(&self, delta: &str) {
        if delta.is_empty() {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.text.push_str(delta);
        let emission: Result<Emission, Error> = Ok(Emission::StringChunk(Arc::from(delta)));
        inner
            .chunk_subs
            .retain(|tx| tx.send(emission.clone()).is_ok());
    }

    /// Publishes a shallow snapshot and notifies stream-style subscribers.
    /// No-op once the controller is closed.
    pub fn publish_snapshot(&self, snapshot: JsonValue) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.snapshot = Some(snapshot.clone());
        let emission: Result<Emission, Error> = Ok(Emission::Snapshot(snapshot));
        inner
            .chunk_subs
            .retain(|tx| tx.send(emission.clone()).is_ok());
    }

    /// Announces a newly-discovered child (object key or array element) to
    /// any `on_property`/`on_element` observers. Must be called before any
    /// chunk or completion is observed on the child's own controller.
    pub fn announce_child(&self, component: PathComponent, child_path: Path) {
        let mut inner = self.inner.lock().unwrap();
        let msg = ChildAnnounced {
            component,
            child_path,
        };
        inner.announced_children.push(msg.clone());
        for tx in &inner.child_subs {
            let _ = tx.send(msg.clone());
        }
    }

    /// Completes the controller with its final value. A no-op if already
    /// closed (completion/error fire at most once).
    pub fn complete(&self, value: JsonValue) {
        let (waiters, chunk_subs, atomic_emission) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.closed = true;
            inner.final_value = Some(value.clone());
            let atomic_emission = matches!(
                inner.kind,
                ValueKind::Number | ValueKind::Boolean | ValueKind::Null
            )
            .then(|| Emission::Value(value.clone()));
            (
                std::mem::take(&mut inner.final_waiters),
                std::mem::take(&mut inner.chunk_subs),
                atomic_emission,
            )
        };
        for waiter in waiters {
            let _ = waiter.send(Ok(value.clone()));
        }
        for tx in chunk_subs {
            if let Some(emission) = &atomic_emission {
                let _ = tx.send(Ok(emission.clone()));
            }
            // Dropping `tx` here closes the channel, ending the
            // subscriber's async sequence.
        }
    }

    /// Fails the controller. A no-op if already closed.
    pub fn fail(&self, err: Error) {
        let (waiters, chunk_subs) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.closed = true;
            inner.error = Some(err.clone());
            (
                std::mem::take(&mut inner.final_waiters),
                std::mem::take(&mut inner.chunk_subs),
            )
        };
        for waiter in waiters {
            let _ = waiter.send(Err(err.clone()));
        }
        for tx in chunk_subs {
            let _ = tx.send(Err(err.clone()));
        }
    }

    /// Subscribes future-style: resolves once with the final value or
    /// error. If the controller is already closed, resolves immediately.
    pub fn subscribe_future(&self) -> oneshot::Receiver<Result<JsonValue, Error>> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = &inner.error {
            let _ = tx.send(Err(err.clone()));
        } else if let Some(value) = &inner.final_value {
            let _ = tx.send(Ok(value.clone()));
        } else {
            inner.final_waiters.push(tx);
        }
        rx
    }

    /// Subscribes stream-style: replays `latest` (if any), then delivers
    /// every subsequent emission in order, then ends on completion/error.
    /// A subscriber attaching after completion replays `latest`/the final
    /// value once and then the stream ends.
    pub fn subscribe_stream(&self) -> mpsc::UnboundedReceiver<Result<Emission, Error>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();

        match inner.kind {
            ValueKind::String if !inner.text.is_empty() => {
                let _ = tx.send(Ok(Emission::StringChunk(Arc::from(inner.text.as_str()))));
            }
            ValueKind::Object | ValueKind::Array => {
                if let Some(snapshot) = &inner.snapshot {
                    let _ = tx.send(Ok(Emission::Snapshot(snapshot.clone())));
                }
            }
            _ => {}
        }

        if let Some(err) = &inner.error {
            let _ = tx.send(Err(err.clone()));
        } else if let Some(value) = &inner.final_value {
            let atomic = matches!(
                inner.kind,
                ValueKind::Number | ValueKind::Boolean | ValueKind::Null
            );
            if atomic {
                let _ = tx.send(Ok(Emission::Value(value.clone())));
            }
            // `tx` drops here; the channel closes and `rx` ends cleanly.
        } else {
            inner.chunk_subs.push(tx);
        }

        rx
    }

    /// Subscribes to child-discovery announcements (`on_property`/
    /// `on_element`). Only meaningful for `Object`/`Array`-kind
    /// controllers. A subscriber attaching after some children were
    /// already discovered is first replayed every prior announcement, in
    /// order, before any new one — mirroring the late-subscriber replay
    /// [`Self::subscribe_stream`] already does for text/snapshots.
    pub fn subscribe_children(&self) -> mpsc::UnboundedReceiver<ChildAnnounced> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        for already in &inner.announced_children {
            let _ = tx.send(already.clone());
        }
        inner.child_subs.push(tx);
        rx
    }

    /// Returns `Ok(())` if `kind` matches this controller's declared kind,
    /// else `Err(Error::TypeMismatch)`.
    pub fn check_kind(&self, kind: ValueKind) -> Result<(), Error> {
        let inner = self.inner.lock().unwrap();
        if inner.kind == kind {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                path: inner.path.clone(),
                expected: kind,
                found: inner.kind,
            })
        }
    }
}
