//! Patchkit - manifest-driven client update engine.
//!
//! Given a manifest naming files to delete and files to replace, patchkit
//! fetches the replacement artifacts from an update server over HTTP and
//! swaps them into an install directory, reporting progress to an embedding
//! UI and honoring user cancellation.
//!
//! # Architecture
//!
//! ```text
//! Updater (lifecycle runner)
//!     │
//!     ├── Manifest (wire codec + typed model)
//!     │
//!     ├── DownloadOrchestrator (sequential HTTP fetch → staged temp files)
//!     │
//!     ├── ApplyEngine (delete pass, then install pass)
//!     │
//!     └── Monitor ── ProgressSink (UI collaborator)
//!             │
//!             └── CancelToken (monitor signals, worker waits)
//! ```
//!
//! The worker thread (the caller of [`Updater::run`]) executes the pipeline
//! sequentially; the monitor thread relays progress to the UI and feeds the
//! UI's cancel signal back into the run.

pub mod apply;
pub mod cancel;
pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod progress;
pub mod updater;

pub use cancel::CancelToken;
pub use config::UpdaterConfig;
pub use error::{UpdateError, UpdateResult};
pub use manifest::{Manifest, ServerEndpoint};
pub use progress::{Phase, ProgressSink, ProgressSnapshot, ProgressTracker};
pub use updater::{UpdateReport, Updater};

/// Crate version, as reported by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
