//! Terminal progress sink backed by indicatif.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use patchkit::ProgressSink;

/// Progress bar + Ctrl+C flag implementing the UI collaborator contract.
pub struct ConsoleSink {
    bar: ProgressBar,
    cancelled: Arc<AtomicBool>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{bar:40} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);

        Self {
            bar,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag the Ctrl+C handler writes into.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

impl ProgressSink for ConsoleSink {
    fn set_range(&self, _min: u32, max: u32) {
        self.bar.set_length(u64::from(max));
    }

    fn set_value(&self, value: u32) {
        self.bar.set_position(u64::from(value));
    }

    fn set_note(&self, note: &str) {
        self.bar.set_message(note.to_string());
    }

    fn cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.bar.finish_and_clear();
    }
}
