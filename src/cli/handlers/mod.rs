//! Shared command handler plumbing

pub mod list;
pub mod progress;

pub use list::{confirm, print_rows, print_written, run_list_command};
pub use progress::with_spinner;
