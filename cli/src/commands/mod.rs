//! Command implementations for the stashbox CLI.

pub mod completions;
pub mod upload;

pub use completions::generate_completions;
pub use upload::run_upload;
