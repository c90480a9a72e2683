//! Terminal front end for the export flow
//!
//! - `prompt.rs` - Metadata form on stdin/stdout
//! - `notify.rs` - Notifier backed by the log facade

mod notify;
mod prompt;

pub use notify::LogNotifier;
pub use prompt::{parse_assignment, TerminalForm};
