//! Process-wide table of announced backends.
//!
//! An integration crate announces its backend once it is linked in and
//! initialized (typically from test-suite setup). The default probes read
//! this table; nothing else in the crate writes to it.

use std::sync::LazyLock;

use dashmap::DashSet;
use tracing::debug;

use crate::cleaner::core::ids::BackendId;

static ANNOUNCED: LazyLock<DashSet<BackendId>> = LazyLock::new(DashSet::new);

/// Mark `backend` as present in this process.
///
/// Returns `false` if it was already announced.
pub fn announce_backend(backend: BackendId) -> bool {
    let fresh = ANNOUNCED.insert(backend.clone());
    if fresh {
        debug!(%backend, "Backend announced");
    }
    fresh
}

/// Remove `backend` from the table.
///
/// Returns `false` if it was not announced.
pub fn withdraw_backend(backend: &BackendId) -> bool {
    let removed = ANNOUNCED.remove(backend).is_some();
    if removed {
        debug!(%backend, "Backend withdrawn");
    }
    removed
}

/// Whether `backend` is currently announced.
#[must_use]
pub fn is_backend_announced(backend: &BackendId) -> bool {
    ANNOUNCED.contains(backend)
}
