//! UI collaborator contract.

/// Progress surface provided by the embedding UI.
///
/// Mirrors the capabilities of a minimal progress dialog: a bounded range,
/// a current value, a status note, a user cancel signal, and disposal. The
/// monitor is the only caller; implementations never see concurrent calls.
pub trait ProgressSink: Send + Sync {
    /// Set the inclusive progress range. Called once, before any value.
    fn set_range(&self, min: u32, max: u32);

    /// Set the current progress value.
    fn set_value(&self, value: u32);

    /// Set the status note shown to the user.
    fn set_note(&self, note: &str);

    /// Whether the user has requested cancellation.
    fn cancel_requested(&self) -> bool;

    /// Release the UI resource. Called exactly once, after the run ends.
    fn close(&self);
}
