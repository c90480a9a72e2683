//! Export notifications routed through the `log` facade.

use log::{debug, error, info, warn};

use crate::error::Error;
use crate::export::Notifier;

/// Notifier that logs every message; progress goes to debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn progress(&mut self, message: &str) {
        debug!("{}", message);
    }

    fn info(&mut self, message: &str) {
        info!("{}", message);
    }

    fn warning(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn error(&mut self, error: &Error) {
        error!("{}", error.chain());
    }
}
