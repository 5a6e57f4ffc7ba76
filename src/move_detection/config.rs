use crate::move_detection::error::MoveDetectionError;
use serde::{Deserialize, Serialize};

/// Configuration for the move detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveDetectorConfig {
	/// Run move detection at all; when false every line classifies at face value
	pub enabled: bool,
	/// Minimum trimmed length (in chars) for a line to take part in matching
	pub min_line_length: usize,
	/// Trim leading whitespace too, so re-indented lines still match
	pub ignore_indentation: bool,
	/// Removed-side occurrences above which a line is treated as noise
	pub max_line_occurrences: usize,
	/// Minimum number of matched lines for a block to count as a move
	pub min_block_size: usize,
	/// Unmatched lines a block may bridge while it is being extended
	pub gap_tolerance: usize,
	/// Matched lines needed before the size factor of a score reaches 1.0
	pub full_confidence_lines: usize,
	/// Score threshold for accepting a move (0.0 to 1.0)
	pub confidence_threshold: f64,
	/// Maximum file size (bytes) considered for move detection
	pub max_file_size: usize,
	/// Context lines kept around each change in the effective diff
	pub effective_context_lines: usize,
}

impl Default for MoveDetectorConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			min_line_length: 1,
			ignore_indentation: false,
			max_line_occurrences: 64,
			min_block_size: 3,
			gap_tolerance: 3,
			full_confidence_lines: 5,
			confidence_threshold: 0.0,
			max_file_size: 1024 * 1024, // 1MB
			effective_context_lines: 3,
		}
	}
}

impl MoveDetectorConfig {
	/// Only report long, clean moves
	pub fn strict() -> Self {
		Self {
			min_line_length: 4,
			min_block_size: 5,
			gap_tolerance: 1,
			full_confidence_lines: 10,
			confidence_threshold: 0.5,
			..Default::default()
		}
	}

	/// Report short moves and tolerate re-indentation and wider gaps
	pub fn lenient() -> Self {
		Self {
			ignore_indentation: true,
			min_block_size: 2,
			gap_tolerance: 5,
			full_confidence_lines: 3,
			..Default::default()
		}
	}

	/// Configuration that always takes the no-detection fallback
	pub fn disabled() -> Self {
		Self {
			enabled: false,
			..Default::default()
		}
	}

	pub fn with_min_block_size(mut self, min_block_size: usize) -> Self {
		self.min_block_size = min_block_size;
		self
	}

	pub fn with_gap_tolerance(mut self, gap_tolerance: usize) -> Self {
		self.gap_tolerance = gap_tolerance;
		self
	}

	/// Validate the configuration and return errors if invalid
	pub fn validate(&self) -> Result<(), MoveDetectionError> {
		if !(0.0..=1.0).contains(&self.confidence_threshold) {
			return Err(MoveDetectionError::invalid_configuration(
				"confidence_threshold",
				"must be between 0.0 and 1.0",
			));
		}

		if self.min_block_size == 0 {
			return Err(MoveDetectionError::invalid_configuration(
				"min_block_size",
				"must be greater than 0",
			));
		}

		if self.full_confidence_lines == 0 {
			return Err(MoveDetectionError::invalid_configuration(
				"full_confidence_lines",
				"must be greater than 0",
			));
		}

		if self.max_line_occurrences == 0 {
			return Err(MoveDetectionError::invalid_configuration(
				"max_line_occurrences",
				"must be greater than 0",
			));
		}

		Ok(())
	}
}
