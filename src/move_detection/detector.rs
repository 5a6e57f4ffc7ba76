use crate::diff::types::ParsedDiff;
use crate::move_detection::blocks::BlockAggregator;
use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::content::{ContentGuard, FileContents, SkippedFile};
use crate::move_detection::edit_script::{EditScriptAlgorithm, MyersDiff};
use crate::move_detection::error::MoveDetectionError;
use crate::move_detection::matching::LineMatcher;
use crate::move_detection::monitoring::DetectionStats;
use crate::move_detection::reconstruct::Reconstructor;
use crate::move_detection::rediff::Rediffer;
use crate::move_detection::report::MoveReport;
use crate::move_detection::types::ClassifiedFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything one detection run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
	pub files: Vec<ClassifiedFile>,
	pub effective_diff: ParsedDiff,
	pub move_report: MoveReport,
	/// Files excluded from move detection, with the reason
	pub skipped: Vec<SkippedFile>,
	pub stats: DetectionStats,
}

pub struct MoveDetector {
	/// Configuration for move detection
	config: MoveDetectorConfig,

	/// Line-level diff used to re-diff each candidate
	algorithm: Box<dyn EditScriptAlgorithm>,
}

impl MoveDetector {
	pub fn new(config: MoveDetectorConfig) -> Result<Self, MoveDetectionError> {
		config.validate()?;
		Ok(Self {
			config,
			algorithm: Box::new(MyersDiff),
		})
	}

	/// Replace the default Myers re-diff with a custom algorithm
	pub fn with_algorithm(mut self, algorithm: Box<dyn EditScriptAlgorithm>) -> Self {
		self.algorithm = algorithm;
		self
	}

	pub fn config(&self) -> &MoveDetectorConfig {
		&self.config
	}

	pub fn algorithm_name(&self) -> &'static str {
		self.algorithm.name()
	}

	/// Classify every line of `diff` and build its effective diff
	///
	/// Never fails: files whose content is missing or unusable are excluded from
	/// detection and listed in [`DetectionOutcome::skipped`], and candidates whose
	/// re-diff fails are dropped. Their lines classify at face value.
	pub fn detect(&self, diff: &ParsedDiff, base: &FileContents, head: &FileContents) -> DetectionOutcome {
		if !self.config.enabled {
			debug!("Move detection disabled, classifying at face value");
			return self.classify_without_moves(diff);
		}

		let mut stats = DetectionStats::new();
		stats.files_in_diff = diff.files.len();

		let (index, skipped) = ContentGuard::new(&self.config).build_index(diff, base, head);
		stats.files_eligible = index.len();
		stats.files_skipped = skipped.len();

		let matches = LineMatcher::new(&self.config).find_matches(diff, &index);
		stats.removed_lines = matches.removed.len();
		stats.added_lines = matches.added.len();
		stats.line_pairings = matches.pairs.len();
		stats.noisy_lines = matches.noisy_lines;
		debug!(
			"{} of {} files eligible, pairing density {:.2}",
			stats.files_eligible,
			stats.files_in_diff,
			stats.pairing_density()
		);

		let aggregation = BlockAggregator::new(&self.config).aggregate(&matches);
		stats.chains_considered = aggregation.chains_considered;
		stats.blocks_discarded = aggregation.discarded_blocks;

		debug!(
			"Re-diffing {} candidates with {}",
			aggregation.candidates.len(),
			self.algorithm_name()
		);
		let rediff = Rediffer::new(&self.config, self.algorithm.as_ref())
			.rediff_all(aggregation.candidates, &index);
		stats.candidates_dropped = rediff.dropped.len();

		let (move_report, moves) = MoveReport::finalize(rediff.moves);
		for detail in &move_report.moves {
			stats.record_move_detected(detail.candidate.score);
		}

		let reconstruction = Reconstructor::new(&self.config).reconstruct(diff, &moves);

		debug!(
			"Move detection finished: {} moves, {} lines moved, {} files skipped",
			move_report.moves_detected, move_report.total_lines_moved, stats.files_skipped
		);

		DetectionOutcome {
			files: reconstruction.files,
			effective_diff: reconstruction.effective_diff,
			move_report,
			skipped,
			stats,
		}
	}

	/// Face-value classification: added lines are `new`, removed lines `removed`
	pub fn classify_without_moves(&self, diff: &ParsedDiff) -> DetectionOutcome {
		let reconstruction = Reconstructor::new(&self.config).reconstruct(diff, &[]);

		let mut stats = DetectionStats::new();
		stats.files_in_diff = diff.files.len();
		stats.used_fallback = true;

		DetectionOutcome {
			files: reconstruction.files,
			effective_diff: reconstruction.effective_diff,
			move_report: MoveReport::default(),
			skipped: Vec::new(),
			stats,
		}
	}
}

impl Default for MoveDetector {
	fn default() -> Self {
		Self {
			config: MoveDetectorConfig::default(),
			algorithm: Box::new(MyersDiff),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diff::types::{DiffLine, FileDiff, Hunk};
	use crate::move_detection::types::LineClassification;

	fn moved_function() -> (ParsedDiff, FileContents, FileContents) {
		let body = ["fn helper() {", "    let x = 1;", "    let y = 2;", "    x + y", "}"];
		let diff = ParsedDiff::new(vec![
			FileDiff::new(
				"old.rs",
				vec![Hunk::from_lines(
					body.iter()
						.enumerate()
						.map(|(i, c)| DiffLine::removed("old.rs", i + 1, c))
						.collect(),
				)],
			),
			FileDiff::new(
				"new.rs",
				vec![Hunk::from_lines(
					body.iter()
						.enumerate()
						.map(|(i, c)| DiffLine::added("new.rs", i + 1, c))
						.collect(),
				)],
			),
		]);
		let mut base = FileContents::new();
		base.insert("old.rs".to_string(), body.join("\n"));
		let mut head = FileContents::new();
		head.insert("new.rs".to_string(), body.join("\n"));
		(diff, base, head)
	}

	#[test]
	fn test_invalid_config_rejected() {
		let config = MoveDetectorConfig {
			confidence_threshold: 2.0,
			..Default::default()
		};
		let err = MoveDetector::new(config).err().unwrap();
		assert!(err.is_configuration_error());
	}

	#[test]
	fn test_detects_cross_file_move() {
		let (diff, base, head) = moved_function();
		let detector = MoveDetector::new(MoveDetectorConfig::default()).unwrap();
		let outcome = detector.detect(&diff, &base, &head);

		assert_eq!(outcome.move_report.moves_detected, 1);
		assert_eq!(outcome.move_report.total_lines_moved, 5);
		assert_eq!(outcome.move_report.moves[0].candidate.score, 1.0);
		assert!(outcome.effective_diff.files.is_empty());
		assert!(outcome.skipped.is_empty());
		assert_eq!(outcome.stats.moves_detected, 1);
		assert!(!outcome.stats.used_fallback);
	}

	#[test]
	fn test_disabled_detection_uses_fallback() {
		let (diff, base, head) = moved_function();
		let detector = MoveDetector::new(MoveDetectorConfig::disabled()).unwrap();
		let outcome = detector.detect(&diff, &base, &head);

		assert!(outcome.stats.used_fallback);
		assert!(outcome.move_report.is_empty());
		assert!(outcome.files.iter().flat_map(|f| f.lines()).all(|l| matches!(
			l.classification,
			LineClassification::New | LineClassification::Removed
		)));
		assert_eq!(outcome.effective_diff, diff);
	}

	#[test]
	fn test_default_detector_uses_myers() {
		assert_eq!(MoveDetector::default().algorithm_name(), "myers");
	}

	#[test]
	fn test_detector_is_shareable_across_threads() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<MoveDetector>();
	}
}
