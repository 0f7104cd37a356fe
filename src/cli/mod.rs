//! Command-line interface.
//!
//! Flag parsing and human-readable rendering. Decision logic lives in
//! [`crate::engine`]; this layer only presents it.

pub mod commands;
pub mod output;

pub use commands::{Cli, OutputFormat};
pub use output::{Summarizer, styled_num_moves};
