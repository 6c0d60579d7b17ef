//! The flat, path-keyed controller registry.
//!
//! A flat mapping from canonical [`Path`] to [`StreamController`] is
//! simpler and faster than a recursive tree mirroring the JSON structure,
//! and is exactly what the subscriber API wants: "give me the controller
//! for this path." The registry supports creation from either side (the
//! parser discovering a path, or a subscriber demanding one ahead of
//! time) through a single atomic get-or-insert-with-kind-check operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::controller::StreamController;
use crate::error::Error;
use crate::kind::ValueKind;
use crate::path::Path;

/// Owns every [`StreamController`] for a single parse session.
#[derive(Default)]
pub struct Registry {
    controllers: Mutex<HashMap<Path, Arc<StreamController>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the controller for `path`, creating it as `kind` if it does
    /// not yet exist. If it already exists with a different kind, returns
    /// [`Error::TypeMismatch`].
    pub fn get_or_create(&self, path: &Path, kind: ValueKind) -> Result<Arc<StreamController>, Error> {
        let mut controllers = self.controllers.lock().unwrap();
        if let Some(existing) = controllers.get(path) {
            existing.check_kind(kind)?;
            return Ok(Arc::clone(existing));
        }
        let controller = StreamController::new(path.clone(), kind);
        controllers.insert(path.clone(), Arc::clone(&controller));
        Ok(controller)
    }

    /// Resolves the controller the *parser* should parse `path`'s value
    /// into, once `kind` is discovered. Unlike [`Self::get_or_create`], a
    /// kind conflict here never fails the caller: it is local to the path
    /// that was mis-declared (spec §7 scopes `TypeMismatch` to "that
    /// subscription only"), so a pre-existing, differently-kinded
    /// controller (a subscriber's early guess) is itself failed with
    /// `TypeMismatch` and the parser is handed a fresh, unregistered
    /// controller of the discovered `kind` to keep parsing against —
    /// the rest of the document, and every other path's controller, is
    /// unaffected.
    pub fn resolve_for_parser(&self, path: &Path, kind: ValueKind) -> Arc<StreamController> {
        let mut controllers = self.controllers.lock().unwrap();
        if let Some(existing) = controllers.get(path) {
            let declared = existing.kind();
            if declared == kind {
                return Arc::clone(existing);
            }
            existing.fail(Error::TypeMismatch {
                path: path.clone(),
                expected: declared,
                found: kind,
            });
            return StreamController::new(path.clone(), kind);
        }
        let controller = StreamController::new(path.clone(), kind);
        controllers.insert(path.clone(), Arc::clone(&controller));
        controller
    }

    /// Returns the existing controller for `path`, if any, without
    /// creating one.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Arc<StreamController>> {
        self.controllers.lock().unwrap().get(path).cloned()
    }

    /// Fails every controller that has not yet closed. Used for
    /// `Disposed`/`SourceError`, which must freeze the whole parser.
    pub fn fail_all_open(&self, err: &Error) {
        for controller in self.controllers.lock().unwrap().values() {
            if !controller.is_closed() {
                controller.fail(err.clone());
            }
        }
    }

    /// All paths with a registered controller, for diagnostics/testing.
    #[must_use]
    pub fn paths(&self) -> Vec<Path> {
        self.controllers.lock().unwrap().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_reuses_existing_controller() {
        let registry = Registry::new();
        let a = registry.get_or_create(&Path::root(), ValueKind::Object).unwrap();
        let b = registry.get_or_create(&Path::root(), ValueKind::Object).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn get_or_create_rejects_kind_mismatch() {
        let registry = Registry::new();
        registry.get_or_create(&Path::root(), ValueKind::Object).unwrap();
        let err = registry.get_or_create(&Path::root(), ValueKind::Array).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn resolve_for_parser_fails_only_the_mismatched_path_and_keeps_going() {
        let registry = Registry::new();
        let declared = registry
            .get_or_create(&Path::root(), ValueKind::Object)
            .unwrap();
        let other = registry
            .get_or_create(&Path::parse("sibling").unwrap(), ValueKind::String)
            .unwrap();

        let discovered = registry.resolve_for_parser(&Path::root(), ValueKind::Array);
        assert_eq!(discovered.kind(), ValueKind::Array);
        assert!(!Arc::ptr_eq(&discovered, &declared));

        let err = declared.subscribe_future().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(!other.is_closed());
    }

    #[test]
    fn resolve_for_parser_creates_when_absent() {
        let registry = Registry::new();
        let controller = registry.resolve_for_parser(&Path::root(), ValueKind::String);
        assert_eq!(controller.kind(), ValueKind::String);
        assert!(Arc::ptr_eq(
            &controller,
            &registry.get(&Path::root()).unwrap()
        ));
    }
}
