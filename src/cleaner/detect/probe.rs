//! Presence probes consulted by the detector.

use std::fmt;

use crate::cleaner::core::ids::BackendId;
use crate::cleaner::detect::markers::is_backend_announced;

/// Answers "is this backend loaded in the process right now".
pub trait BackendProbe: Send + Sync {
    /// Backend this probe reports on.
    fn backend(&self) -> &BackendId;

    /// Whether the backend is present. Evaluated on every detection.
    fn is_present(&self) -> bool;
}

/// Probe backed by the process-wide marker table.
#[derive(Clone, Debug)]
pub struct MarkerProbe {
    backend: BackendId,
}

impl MarkerProbe {
    /// Probe for `backend`.
    #[must_use]
    pub const fn new(backend: BackendId) -> Self {
        Self { backend }
    }
}

impl BackendProbe for MarkerProbe {
    fn backend(&self) -> &BackendId {
        &self.backend
    }

    fn is_present(&self) -> bool {
        is_backend_announced(&self.backend)
    }
}

/// Probe backed by an arbitrary predicate.
pub struct FnProbe<F> {
    backend: BackendId,
    predicate: F,
}

impl<F> FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    /// Probe for `backend` that reports `predicate()`.
    pub const fn new(backend: BackendId, predicate: F) -> Self {
        Self { backend, predicate }
    }
}

impl<F> BackendProbe for FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn backend(&self) -> &BackendId {
        &self.backend
    }

    fn is_present(&self) -> bool {
        (self.predicate)()
    }
}

impl<F> fmt::Debug for FnProbe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProbe")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
