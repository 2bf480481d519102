//! Backend detection.
//!
//! The detector walks its probes in priority order and returns the first
//! backend reported present. It keeps no state between calls: caching the
//! answer is the dispatcher's job.

pub mod markers;
pub mod probe;

use tracing::{debug, warn};

use crate::cleaner::core::errors::{CleanerError, CleanerResult};
use crate::cleaner::core::ids::BackendId;

pub use markers::{announce_backend, is_backend_announced, withdraw_backend};
pub use probe::{BackendProbe, FnProbe, MarkerProbe};

/// Ordered list of backend probes.
pub struct BackendDetector {
    probes: Vec<Box<dyn BackendProbe>>,
}

impl Default for BackendDetector {
    /// One marker probe per well-known backend, in [`BackendId::KNOWN`] order.
    fn default() -> Self {
        Self {
            probes: BackendId::KNOWN
                .iter()
                .cloned()
                .map(|backend| Box::new(MarkerProbe::new(backend)) as Box<dyn BackendProbe>)
                .collect(),
        }
    }
}

impl BackendDetector {
    /// Detector with no probes; every detection fails until probes are added.
    #[must_use]
    pub fn empty() -> Self {
        Self { probes: Vec::new() }
    }

    /// Append a probe at the lowest priority.
    #[must_use]
    pub fn with_probe(mut self, probe: impl BackendProbe + 'static) -> Self {
        self.push_probe(probe);
        self
    }

    /// Append a predicate probe at the lowest priority.
    #[must_use]
    pub fn with_predicate<F>(self, backend: BackendId, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.with_probe(FnProbe::new(backend, predicate))
    }

    /// Append a probe at the lowest priority.
    pub fn push_probe(&mut self, probe: impl BackendProbe + 'static) {
        self.probes.push(Box::new(probe));
    }

    /// Backends in priority order.
    #[must_use]
    pub fn priority(&self) -> Vec<BackendId> {
        self.probes.iter().map(|p| p.backend().clone()).collect()
    }

    /// First backend reported present.
    ///
    /// # Errors
    /// Returns `NoBackendDetected` if no probe reports presence.
    pub fn detect(&self) -> CleanerResult<BackendId> {
        if let Some(probe) = self.probes.iter().find(|p| p.is_present()) {
            let backend = probe.backend().clone();
            debug!(%backend, "Detected backend");
            return Ok(backend);
        }

        warn!(probes = self.probes.len(), "No backend detected");
        Err(CleanerError::NoBackendDetected)
    }

    /// Every backend currently reported present, in priority order.
    #[must_use]
    pub fn present(&self) -> Vec<BackendId> {
        self.probes
            .iter()
            .filter(|p| p.is_present())
            .map(|p| p.backend().clone())
            .collect()
    }
}

impl std::fmt::Debug for BackendDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDetector")
            .field("priority", &self.priority())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    fn flag(value: bool) -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(value))
    }

    fn reads(flag: &Arc<AtomicBool>) -> impl Fn() -> bool + Send + Sync + 'static {
        let flag = Arc::clone(flag);
        move || flag.load(Ordering::SeqCst)
    }

    #[test]
    fn test_no_probe_present() {
        let detector = BackendDetector::empty()
            .with_predicate(BackendId::DIESEL, || false)
            .with_predicate(BackendId::MONGODB, || false);
        assert!(matches!(detector.detect(), Err(CleanerError::NoBackendDetected)));
        assert!(BackendDetector::empty().detect().is_err());
    }

    #[test]
    fn test_priority_wins_deterministically() {
        let detector = BackendDetector::empty()
            .with_predicate(BackendId::DIESEL, || true)
            .with_predicate(BackendId::SQLX, || true);

        for _ in 0..5 {
            assert_eq!(detector.detect().unwrap(), BackendId::DIESEL);
        }
        assert_eq!(detector.present(), vec![BackendId::DIESEL, BackendId::SQLX]);
    }

    #[test]
    fn test_detection_follows_state_changes() {
        let diesel = flag(true);
        let mongo = flag(false);
        let detector = BackendDetector::empty()
            .with_predicate(BackendId::DIESEL, reads(&diesel))
            .with_predicate(BackendId::MONGODB, reads(&mongo));

        assert_eq!(detector.detect().unwrap(), BackendId::DIESEL);

        diesel.store(false, Ordering::SeqCst);
        mongo.store(true, Ordering::SeqCst);
        assert_eq!(detector.detect().unwrap(), BackendId::MONGODB);
    }

    #[test]
    fn test_probes_evaluated_each_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let detector = BackendDetector::empty().with_predicate(BackendId::SQLX, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        detector.detect().unwrap();
        detector.detect().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_marker_probe_reads_table() {
        let backend = BackendId::new("detect-marker-probe-test").unwrap();
        let detector = BackendDetector::empty().with_probe(MarkerProbe::new(backend.clone()));
        assert!(detector.detect().is_err());

        announce_backend(backend.clone());
        assert_eq!(detector.detect().unwrap(), backend);
        withdraw_backend(&backend);
        assert!(detector.detect().is_err());
    }

    #[test]
    fn test_default_priority_matches_known() {
        assert_eq!(BackendDetector::default().priority(), BackendId::KNOWN.to_vec());
    }
}
