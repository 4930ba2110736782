//! Sequential artifact download over HTTP.
//!
//! - Scoped temporary storage for fetched artifacts (`staging`)
//! - Single artifact fetch with cancellation polling (`http`)
//! - Batch orchestration with fail-fast policy and the 0–50 progress band
//!   (`orchestrator`)

mod http;
mod orchestrator;
mod staging;

pub use http::ArtifactClient;
pub use orchestrator::{DownloadOrchestrator, DownloadedArtifacts};
pub use staging::StagedArtifact;
