//! Structured diff model
//!
//! - [`types`] - files, hunks and typed lines
//! - [`parser`] - unified diff text to [`ParsedDiff`]
//! - [`render`] - [`ParsedDiff`] back to unified diff text
//! - [`error`] - parse errors

pub mod error;
pub mod parser;
pub mod render;
pub mod types;

pub use error::DiffParseError;
pub use parser::parse_unified_diff;
pub use render::render_unified;
pub use types::{DiffLine, FileDiff, FileStatus, Hunk, LineType, ParsedDiff};
