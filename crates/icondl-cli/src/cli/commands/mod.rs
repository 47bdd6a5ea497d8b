//! CLI command handlers, one file per command.

mod completions;
mod fetch;
mod scan;

pub use completions::run_completions;
pub use fetch::{render_event, resolve_destination, run_fetch};
pub use scan::run_scan;
