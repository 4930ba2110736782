//! Progress reporting and the cancellation monitor.
//!
//! The worker publishes its state through a shared [`ProgressTracker`];
//! a [`Monitor`] thread relays snapshots to the UI collaborator (a
//! [`ProgressSink`]) and feeds the collaborator's cancel signal back into
//! the run's [`crate::CancelToken`].

mod monitor;
mod phase;
mod sink;
mod tracker;

pub use monitor::Monitor;
pub use phase::Phase;
pub use sink::ProgressSink;
pub use tracker::{ProgressSnapshot, ProgressTracker};
