use thiserror::Error;

/// Crate-level error types
///
/// The detection pipeline itself never fails at run time. These errors come from
/// the surfaces around it. Module-specific errors are defined in their modules:
/// - Diff parsing errors: `crate::diff::DiffParseError`
/// - Move detection errors: `crate::move_detection::MoveDetectionError`
#[derive(Error, Debug)]
pub enum EffectiveDiffError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON serialization error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid path: {path}")]
	InvalidPath { path: String },

	#[error("Diff parse error: {0}")]
	DiffParse(#[from] crate::diff::DiffParseError),

	#[error("Move detection error: {0}")]
	MoveDetection(#[from] crate::move_detection::MoveDetectionError),
}

impl EffectiveDiffError {
	/// Check if this error is related to configuration issues
	pub fn is_configuration_error(&self) -> bool {
		match self {
			EffectiveDiffError::InvalidPath { .. } => true,
			EffectiveDiffError::MoveDetection(move_err) => move_err.is_configuration_error(),
			_ => false,
		}
	}

	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			EffectiveDiffError::Io(_) => "io",
			EffectiveDiffError::Json(_) => "serialization",
			EffectiveDiffError::InvalidPath { .. } => "configuration",
			EffectiveDiffError::DiffParse(parse_err) => parse_err.category(),
			EffectiveDiffError::MoveDetection(move_err) => move_err.category(),
		}
	}

	pub fn invalid_path(path: &str) -> Self {
		EffectiveDiffError::InvalidPath {
			path: path.to_string(),
		}
	}
}

pub type Result<T> = std::result::Result<T, EffectiveDiffError>;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::move_detection::MoveDetectionError;
	use std::io;

	#[test]
	fn test_error_variants() {
		let io_error =
			EffectiveDiffError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
		let invalid_path = EffectiveDiffError::invalid_path("/invalid");

		assert!(io_error.to_string().contains("IO error"));
		assert!(invalid_path.to_string().contains("Invalid path"));
	}

	#[test]
	fn test_from_conversions() {
		let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
		let err: EffectiveDiffError = io_err.into();

		match err {
			EffectiveDiffError::Io(_) => (),
			_ => panic!("Expected IO error variant"),
		}
	}

	#[test]
	fn test_error_categorization() {
		let config_error: EffectiveDiffError =
			MoveDetectionError::invalid_configuration("min_block_size", "must be greater than 0").into();
		assert!(config_error.is_configuration_error());
		assert_eq!(config_error.category(), "configuration");

		let parse_error: EffectiveDiffError = crate::diff::parse_unified_diff("@@ nonsense @@\n")
			.unwrap_err()
			.into();
		assert!(!parse_error.is_configuration_error());
	}
}
