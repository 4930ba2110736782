//! Shared progress state between the worker and the monitor.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

use super::phase::Phase;

/// Progress state owned by the worker and observed by the monitor.
///
/// Phase and fraction are atomics; only the note needs a lock. The worker
/// is the sole writer, so no update ever contends with another.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    phase: AtomicU8,
    fraction: AtomicU32,
    note: Mutex<String>,
}

/// Point-in-time view of the worker's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    /// Completed fraction of the whole run, `0..=100`.
    pub fraction: u32,
    pub note: String,
}

impl ProgressTracker {
    /// Create a tracker in the `Idle` phase at fraction 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new phase.
    pub fn set_phase(&self, phase: Phase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }

    /// Set the completed fraction (clamped to 100).
    pub fn set_fraction(&self, fraction: u32) {
        self.fraction.store(fraction.min(100), Ordering::SeqCst);
    }

    /// Set the human-readable status note.
    pub fn set_note(&self, note: &str) {
        let mut guard = self.note.lock().unwrap();
        guard.clear();
        guard.push_str(note);
    }

    /// Set fraction and note together (the per-item update path).
    pub fn update(&self, fraction: u32, note: &str) {
        self.set_fraction(fraction);
        self.set_note(note);
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Current fraction.
    pub fn fraction(&self) -> u32 {
        self.fraction.load(Ordering::SeqCst)
    }

    /// Take a consistent-enough snapshot for display.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase(),
            fraction: self.fraction(),
            note: self.note.lock().unwrap().clone(),
        }
    }
}
