//! Upload progress.

use std::sync::atomic::{AtomicU8, Ordering};

/// Bytes sent so far out of the request body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// `round(loaded * 100 / total)`, capped at 100.
    ///
    /// `None` when the total is unknown or zero.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|t| *t > 0)?;
        let loaded = self.loaded.min(total) as u128;
        let total = total as u128;
        let pct = (loaded * 200 + total) / (total * 2);
        Some(pct.min(100) as u8)
    }
}

/// Shared percentage cell written by the progress callback.
#[derive(Debug, Default)]
pub(crate) struct ProgressCell(AtomicU8);

impl ProgressCell {
    pub(crate) fn get(&self) -> u8 {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, pct: u8) {
        self.0.store(pct.min(100), Ordering::SeqCst);
    }

    pub(crate) fn reset(&self) {
        self.set(0);
    }
}
