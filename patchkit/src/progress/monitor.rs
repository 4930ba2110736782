//! Progress/cancellation monitor thread.
//!
//! The monitor observes the worker's [`ProgressTracker`] and relays it to
//! the UI collaborator, while polling the collaborator's cancel signal and
//! propagating it into the shared [`CancelToken`]. It is purely
//! observational: it never drives the pipeline.
//!
//! Between polls the thread sleeps on its stop token, so worker completion
//! wakes it immediately and nothing spins.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cancel::CancelToken;

use super::sink::ProgressSink;
use super::tracker::ProgressTracker;

/// Monitor thread handle.
///
/// [`stop`](Monitor::stop) (or drop) signals the thread, waits for it to
/// push a final snapshot, and closes the sink, so the UI resource is
/// released regardless of how the run ended.
pub struct Monitor {
    handle: Option<JoinHandle<()>>,
    stop: CancelToken,
}

impl Monitor {
    /// Start the monitor.
    ///
    /// Polls `sink.cancel_requested()` every `poll_interval`; on the first
    /// `true` it cancels `token`, waking any blocking wait in the worker.
    pub fn start(
        tracker: Arc<ProgressTracker>,
        sink: Arc<dyn ProgressSink>,
        token: CancelToken,
        poll_interval: Duration,
    ) -> Self {
        let stop = CancelToken::new();
        let thread_stop = stop.clone();

        let handle = thread::spawn(move || {
            sink.set_range(0, 100);

            loop {
                publish(&tracker, sink.as_ref());

                if sink.cancel_requested() && !token.is_cancelled() {
                    tracing::info!("cancellation requested by user");
                    token.cancel();
                }

                if thread_stop.wait_timeout(poll_interval) {
                    break;
                }
            }

            // Flush the terminal snapshot before releasing the UI.
            publish(&tracker, sink.as_ref());
            sink.close();
        });

        Self {
            handle: Some(handle),
            stop,
        }
    }

    /// Stop the monitor and wait for it to close the sink.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn publish(tracker: &ProgressTracker, sink: &dyn ProgressSink) {
    let snapshot = tracker.snapshot();
    sink.set_value(snapshot.fraction);
    sink.set_note(&snapshot.note);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Phase;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<u32>>,
        notes: Mutex<Vec<String>>,
        cancel: AtomicBool,
        closed: AtomicBool,
    }

    impl ProgressSink for RecordingSink {
        fn set_range(&self, _min: u32, _max: u32) {}

        fn set_value(&self, value: u32) {
            self.values.lock().unwrap().push(value);
        }

        fn set_note(&self, note: &str) {
            self.notes.lock().unwrap().push(note.to_string());
        }

        fn cancel_requested(&self) -> bool {
            self.cancel.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_monitor_relays_snapshots_and_closes_sink() {
        let tracker = Arc::new(ProgressTracker::new());
        let sink = Arc::new(RecordingSink::default());
        let token = CancelToken::new();

        let monitor = Monitor::start(
            tracker.clone(),
            sink.clone(),
            token.clone(),
            Duration::from_millis(5),
        );

        tracker.set_phase(Phase::Downloading);
        tracker.update(25, "Downloading updates (1/2)...");
        thread::sleep(Duration::from_millis(40));
        monitor.stop();

        assert!(sink.closed.load(Ordering::SeqCst));
        assert!(sink.values.lock().unwrap().contains(&25));
        assert!(sink
            .notes
            .lock()
            .unwrap()
            .iter()
            .any(|n| n == "Downloading updates (1/2)..."));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_monitor_propagates_cancel_request() {
        let tracker = Arc::new(ProgressTracker::new());
        let sink = Arc::new(RecordingSink::default());
        let token = CancelToken::new();

        let monitor = Monitor::start(
            tracker,
            sink.clone(),
            token.clone(),
            Duration::from_millis(5),
        );

        sink.cancel.store(true, Ordering::SeqCst);
        // The worker-side wait observes the cancellation promptly.
        assert!(token.wait_timeout(Duration::from_secs(5)));
        monitor.stop();
    }

    #[test]
    fn test_monitor_flushes_final_state_on_stop() {
        let tracker = Arc::new(ProgressTracker::new());
        let sink = Arc::new(RecordingSink::default());

        let monitor = Monitor::start(
            tracker.clone(),
            sink.clone(),
            CancelToken::new(),
            Duration::from_millis(50),
        );

        tracker.set_phase(Phase::Done);
        tracker.update(100, "Update complete");
        monitor.stop();

        let values = sink.values.lock().unwrap();
        assert_eq!(values.last(), Some(&100));
        assert!(sink.closed.load(Ordering::SeqCst));
    }
}
