//! Patchkit CLI - console updater binary.
//!
//! Reads the wire-encoded update manifest from stdin (the only input
//! channel; no command-line flags are consumed), renders progress on the
//! terminal, and treats Ctrl+C as the cancel signal.

mod console;

use std::io;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use patchkit::{Updater, UpdaterConfig};

use crate::console::ConsoleSink;

fn main() -> ExitCode {
    init_logging();

    println!("Patchkit Updater v{}", patchkit::VERSION);
    println!("Press Ctrl+C to cancel");
    println!();

    let sink = Arc::new(ConsoleSink::new());

    let cancel_flag = sink.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel_flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("failed to install Ctrl+C handler: {e}");
    }

    let updater = Updater::new(UpdaterConfig::default());
    let stdin = io::stdin();

    match updater.run(stdin.lock(), sink) {
        Ok(report) => {
            println!(
                "Files successfully updated ({} removed, {} installed). Please restart the application!",
                report.removed, report.installed
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.is_cancelled() => {
            // Cancellation gets a log entry, not a failure notice.
            ExitCode::SUCCESS
        }
        Err(_) => {
            // Details were logged where the error was detected.
            eprintln!("File update failed. Please report this bug!");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
