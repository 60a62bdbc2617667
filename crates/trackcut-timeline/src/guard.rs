//! Single-flight flag for exports.
//!
//! A track hands out clones of its guard with every export snapshot, so two
//! runners working from the same track still see each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "an export is running" flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct ExportGuard(Arc<AtomicBool>);

impl ExportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag. `None` while another claim is alive.
    pub fn try_claim(&self) -> Option<ExportClaim> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(ExportClaim(Arc::clone(&self.0)))
    }

    pub fn is_claimed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl PartialEq for ExportGuard {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Releases the guard when the export ends, however it ends.
#[derive(Debug)]
pub struct ExportClaim(Arc<AtomicBool>);

impl Drop for ExportClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
