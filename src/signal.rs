//! Signal handling for graceful shutdown.
//!
//! Centralized Ctrl+C handling. A shared `AtomicBool` flag is set when a
//! termination signal arrives; the walker and match builder check it
//! between files and stop cleanly.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupematch::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let shutdown_flag = handler.get_flag();
//! // Pass shutdown_flag to MatchBuilder / Walker.
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit code for SIGINT (Ctrl+C) interruption.
/// Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Centralized shutdown handler for graceful termination.
///
/// Wraps an `AtomicBool` flag set when Ctrl+C is received. The flag can be
/// shared with worker threads for coordinated shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new handler with the flag initially unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the shutdown flag for passing to worker threads.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Install a Ctrl+C handler that sets the shutdown flag.
///
/// # Errors
///
/// Returns an error if a handler is already installed for this process.
pub fn install_handler() -> Result<ShutdownHandler, ctrlc::Error> {
    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            // Second Ctrl+C: exit immediately
            eprintln!("Forced exit.");
            std::process::exit(EXIT_CODE_INTERRUPTED);
        }
        eprintln!("Interrupted. Cleaning up...");
    })?;

    Ok(handler)
}
