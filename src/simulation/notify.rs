//! User-facing notifications
//!
//! The model reports recoverable failures (such as a failed save) through a
//! [`Notifier`] instead of returning them.

use log::error;

/// Receives messages meant for the person driving the simulation
pub trait Notifier: Send + Sync {
    fn show_message(&self, text: &str);
}

/// Default notifier, forwards messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_message(&self, text: &str) {
        error!("{}", text);
    }
}
