//! Move detection specific error types

use crate::move_detection::types::Revision;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoveDetectionError {
	#[error("Content unavailable: {path} at {revision} revision")]
	ContentUnavailable { path: String, revision: Revision },

	#[error("Binary content skipped: {path} at {revision} revision")]
	BinaryContent { path: String, revision: Revision },

	#[error("File too large for move detection: {path} at {revision} revision ({size} bytes > {limit})")]
	OversizedContent {
		path: String,
		revision: Revision,
		size: usize,
		limit: usize,
	},

	#[error("Diff references line {line} of {path} at {revision} revision, which has {line_count} lines")]
	LineOutOfRange {
		path: String,
		revision: Revision,
		line: usize,
		line_count: usize,
	},

	#[error("Line {line} of {path} at {revision} revision does not match the diff")]
	ContentMismatch {
		path: String,
		revision: Revision,
		line: usize,
	},

	#[error("Re-diff failed: {algorithm} - {details}")]
	RediffFailed { algorithm: String, details: String },

	#[error("Edit script from {algorithm} does not align the blocks: {details}")]
	InvalidEditScript { algorithm: String, details: String },

	#[error("Invalid move detection configuration: {parameter} - {reason}")]
	InvalidConfiguration { parameter: String, reason: String },
}

impl MoveDetectionError {
	/// The diff and the supplied contents disagree
	pub fn is_malformed_input(&self) -> bool {
		matches!(
			self,
			MoveDetectionError::ContentUnavailable { .. }
				| MoveDetectionError::LineOutOfRange { .. }
				| MoveDetectionError::ContentMismatch { .. }
		)
	}

	/// Content exists but is not something move detection handles
	pub fn is_unsupported_content(&self) -> bool {
		matches!(
			self,
			MoveDetectionError::BinaryContent { .. } | MoveDetectionError::OversizedContent { .. }
		)
	}

	/// Check if this error is due to configuration issues
	pub fn is_configuration_error(&self) -> bool {
		matches!(self, MoveDetectionError::InvalidConfiguration { .. })
	}

	/// Get error category for logging and skip records
	pub fn category(&self) -> &'static str {
		match self {
			MoveDetectionError::ContentUnavailable { .. } => "content_unavailable",
			MoveDetectionError::BinaryContent { .. } => "binary",
			MoveDetectionError::OversizedContent { .. } => "oversized",
			MoveDetectionError::LineOutOfRange { .. } => "line_out_of_range",
			MoveDetectionError::ContentMismatch { .. } => "content_mismatch",
			MoveDetectionError::RediffFailed { .. } => "rediff",
			MoveDetectionError::InvalidEditScript { .. } => "edit_script",
			MoveDetectionError::InvalidConfiguration { .. } => "configuration",
		}
	}

	pub fn content_unavailable(path: &str, revision: Revision) -> Self {
		MoveDetectionError::ContentUnavailable {
			path: path.to_string(),
			revision,
		}
	}

	/// Create a re-diff error; custom edit-script algorithms report failures with this
	pub fn rediff_failed(algorithm: &str, details: &str) -> Self {
		MoveDetectionError::RediffFailed {
			algorithm: algorithm.to_string(),
			details: details.to_string(),
		}
	}

	pub fn invalid_edit_script(algorithm: &str, details: &str) -> Self {
		MoveDetectionError::InvalidEditScript {
			algorithm: algorithm.to_string(),
			details: details.to_string(),
		}
	}

	pub fn invalid_configuration(parameter: &str, reason: &str) -> Self {
		MoveDetectionError::InvalidConfiguration {
			parameter: parameter.to_string(),
			reason: reason.to_string(),
		}
	}
}
