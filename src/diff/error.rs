//! Errors raised while reading unified diff text

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffParseError {
	#[error("Invalid hunk header at line {line_number}: {header}")]
	InvalidHunkHeader { line_number: usize, header: String },

	#[error("Hunk body for {path} ended early: expected {expected_old} old and {expected_new} new lines, found {found_old} and {found_new}")]
	TruncatedHunk {
		path: String,
		expected_old: usize,
		expected_new: usize,
		found_old: usize,
		found_new: usize,
	},

	#[error("Hunk at line {line_number} appears before any file header")]
	HunkWithoutFile { line_number: usize },
}

impl DiffParseError {
	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			DiffParseError::InvalidHunkHeader { .. } => "hunk_header",
			DiffParseError::TruncatedHunk { .. } => "truncated_hunk",
			DiffParseError::HunkWithoutFile { .. } => "orphan_hunk",
		}
	}
}
