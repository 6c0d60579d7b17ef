//! Binds an upstream sequence of text fragments to a [`ParserFacade`].

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_core::Stream;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::facade::ParserFacade;
use crate::options::ParserOptions;
use crate::registry::Registry;

/// Cooperative-cancellation handle for a [`ParserEngine`]. Disposing fails
/// every still-open controller with [`Error::Disposed`]; repeated calls
/// are no-ops.
#[derive(Clone)]
pub struct Disposer {
    disposed: Arc<AtomicBool>,
    registry: Arc<Registry>,
}

impl Disposer {
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.registry.fail_all_open(&Error::Disposed);
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Drives a [`ParserFacade`] character-by-character from a source of text
/// fragments. Binds one parse session: construct, call [`Self::run`] once
/// with the upstream fragment stream, and read results through the
/// controllers reachable from the shared [`Registry`].
pub struct ParserEngine {
    facade: ParserFacade,
    disposed: Arc<AtomicBool>,
}

impl ParserEngine {
    pub(crate) fn new(registry: Arc<Registry>, options: ParserOptions) -> Self {
        Self {
            facade: ParserFacade::new(registry, options),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hands out a [`Disposer`] sharing this engine's cancellation state.
    /// Must be called before [`Self::run`], which consumes the engine.
    #[must_use]
    pub fn disposer(&self) -> Disposer {
        Disposer {
            disposed: Arc::clone(&self.disposed),
            registry: Arc::clone(self.facade.registry()),
        }
    }

    /// Drives fragments from `source` into the facade until it ends,
    /// errors, or the engine is disposed, then performs the end-of-stream
    /// flush (a no-op after disposal, since disposal already closed every
    /// controller).
    pub async fn run<S, E>(mut self, source: S)
    where
        S: Stream<Item = Result<String, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        use tokio_stream::StreamExt;

        let mut source = Pin::from(Box::new(source));
        loop {
            if self.disposed.load(Ordering::SeqCst) {
                debug!("engine disposed, stopping before end-of-stream flush");
                return;
            }
            match source.next().await {
                None => break,
                Some(Ok(fragment)) => {
                    trace!(len = fragment.len(), "received fragment");
                    if let Err(err) = self.feed(&fragment) {
                        warn!(%err, "malformed input, failing open controllers");
                        self.facade.registry().fail_all_open(&err);
                        return;
                    }
                    self.facade.on_chunk_end();
                }
                Some(Err(source_err)) => {
                    let err = Error::SourceError(Arc::new(source_err));
                    warn!(%err, "upstream source error");
                    self.facade.registry().fail_all_open(&err);
                    return;
                }
            }
        }
        debug!("upstream ended, flushing");
        self.facade.finish();
    }

    fn feed(&mut self, fragment: &str) -> Result<(), Error> {
        for c in fragment.chars() {
            self.facade.add_character(c)?;
        }
        Ok(())
    }
}
