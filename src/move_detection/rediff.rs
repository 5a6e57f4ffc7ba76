//! Re-diffing of move candidates to find the lines that changed inside a move

use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::content::ContentIndex;
use crate::move_detection::edit_script::{validate_edit_script, Edit, EditScriptAlgorithm};
use crate::move_detection::error::MoveDetectionError;
use crate::move_detection::matching::normalize;
use crate::move_detection::types::MoveCandidate;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// A candidate that survived re-diffing, with its changed target lines
#[derive(Debug, Clone, PartialEq)]
pub struct RediffedMove {
	pub candidate: MoveCandidate,
	/// New line numbers inserted by the edit script
	pub changed_lines: BTreeSet<usize>,
	/// Source lines the edit script deleted
	pub removed_in_move: usize,
}

impl RediffedMove {
	pub fn is_changed(&self, new_line: usize) -> bool {
		self.changed_lines.contains(&new_line)
	}
}

/// Result of re-diffing every candidate
#[derive(Debug, Clone, Default)]
pub struct Rediff {
	pub moves: Vec<RediffedMove>,
	/// Candidates dropped because their re-diff failed
	pub dropped: Vec<(MoveCandidate, MoveDetectionError)>,
}

/// Runs the edit-script algorithm over the literal text of each candidate
pub struct Rediffer<'a> {
	config: &'a MoveDetectorConfig,
	algorithm: &'a dyn EditScriptAlgorithm,
}

impl<'a> Rediffer<'a> {
	pub fn new(config: &'a MoveDetectorConfig, algorithm: &'a dyn EditScriptAlgorithm) -> Self {
		Self { config, algorithm }
	}

	pub fn rediff_all(&self, candidates: Vec<MoveCandidate>, index: &ContentIndex) -> Rediff {
		let mut result = Rediff::default();

		for candidate in candidates {
			match self.rediff(&candidate, index) {
				Ok((changed_lines, removed_in_move)) => {
					debug!(
						"{} {}:{} -> {}:{}: {} changed, {} removed inside the move",
						candidate.id,
						candidate.source_file,
						candidate.source_lines,
						candidate.target_file,
						candidate.target_lines,
						changed_lines.len(),
						removed_in_move
					);
					result.moves.push(RediffedMove {
						candidate,
						changed_lines,
						removed_in_move,
					});
				}
				Err(error) => {
					warn!(
						"Dropping move candidate {}:{} -> {}:{}: {}",
						candidate.source_file,
						candidate.source_lines,
						candidate.target_file,
						candidate.target_lines,
						error
					);
					result.dropped.push((candidate, error));
				}
			}
		}

		result
	}

	/// Changed target lines (absolute) and the count of deleted source lines
	fn rediff(
		&self, candidate: &MoveCandidate, index: &ContentIndex,
	) -> Result<(BTreeSet<usize>, usize), MoveDetectionError> {
		let name = self.algorithm.name();

		let old_block = index
			.base(&candidate.source_file)
			.and_then(|text| text.extract(candidate.source_lines))
			.ok_or_else(|| {
				MoveDetectionError::rediff_failed(
					name,
					&format!(
						"cannot extract {}:{} from base content",
						candidate.source_file, candidate.source_lines
					),
				)
			})?;
		let new_block = index
			.head(&candidate.target_file)
			.and_then(|text| text.extract(candidate.target_lines))
			.ok_or_else(|| {
				MoveDetectionError::rediff_failed(
					name,
					&format!(
						"cannot extract {}:{} from head content",
						candidate.target_file, candidate.target_lines
					),
				)
			})?;

		let old: Vec<&str> = old_block
			.iter()
			.map(|l| normalize(l, self.config.ignore_indentation))
			.collect();
		let new: Vec<&str> = new_block
			.iter()
			.map(|l| normalize(l, self.config.ignore_indentation))
			.collect();

		let edits = self.algorithm.edit_script(&old, &new)?;
		validate_edit_script(name, &edits, &old, &new)?;

		let mut changed = BTreeSet::new();
		let mut removed = 0;
		for edit in edits {
			match edit {
				Edit::Insert { new_index } => {
					changed.insert(candidate.target_lines.start + new_index);
				}
				Edit::Delete { .. } => removed += 1,
				Edit::Equal { .. } => {}
			}
		}

		Ok((changed, removed))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diff::types::{DiffLine, FileDiff, Hunk, ParsedDiff};
	use crate::move_detection::content::{ContentGuard, FileContents};
	use crate::move_detection::edit_script::MyersDiff;
	use crate::move_detection::types::{LineRange, MoveId};

	struct Fixture {
		diff: ParsedDiff,
		base: FileContents,
		head: FileContents,
	}

	fn fixture(old: &[&str], new: &[&str]) -> Fixture {
		let diff = ParsedDiff::new(vec![
			FileDiff::new(
				"a.rs",
				vec![Hunk::from_lines(
					old.iter()
						.enumerate()
						.map(|(i, c)| DiffLine::removed("a.rs", i + 1, c))
						.collect(),
				)],
			),
			FileDiff::new(
				"b.rs",
				vec![Hunk::from_lines(
					new.iter()
						.enumerate()
						.map(|(i, c)| DiffLine::added("b.rs", i + 1, c))
						.collect(),
				)],
			),
		]);
		let mut base = FileContents::new();
		base.insert("a.rs".to_string(), old.join("\n"));
		let mut head = FileContents::new();
		head.insert("b.rs".to_string(), new.join("\n"));
		Fixture { diff, base, head }
	}

	fn candidate(old_len: usize, new_len: usize) -> MoveCandidate {
		MoveCandidate {
			id: MoveId(0),
			source_file: "a.rs".to_string(),
			source_lines: LineRange::new(1, old_len),
			target_file: "b.rs".to_string(),
			target_lines: LineRange::new(1, new_len),
			matched_lines: old_len.min(new_len),
			score: 1.0,
		}
	}

	struct FailingAlgorithm;

	impl EditScriptAlgorithm for FailingAlgorithm {
		fn name(&self) -> &'static str {
			"failing"
		}

		fn edit_script(&self, _old: &[&str], _new: &[&str]) -> Result<Vec<Edit>, MoveDetectionError> {
			Err(MoveDetectionError::rediff_failed(self.name(), "refusing to diff"))
		}
	}

	struct EverythingEqual;

	impl EditScriptAlgorithm for EverythingEqual {
		fn name(&self) -> &'static str {
			"everything-equal"
		}

		fn edit_script(&self, old: &[&str], _new: &[&str]) -> Result<Vec<Edit>, MoveDetectionError> {
			Ok((0..old.len())
				.map(|i| Edit::Equal {
					old_index: i,
					new_index: i,
				})
				.collect())
		}
	}

	#[test]
	fn test_edited_line_becomes_changed() {
		let fx = fixture(
			&["fn a() {", "    one();", "    two();", "}"],
			&["fn a() {", "    one();", "    three();", "}"],
		);
		let config = MoveDetectorConfig::default();
		let (index, _) = ContentGuard::new(&config).build_index(&fx.diff, &fx.base, &fx.head);
		let algorithm = MyersDiff;

		let result = Rediffer::new(&config, &algorithm).rediff_all(vec![candidate(4, 4)], &index);
		assert!(result.dropped.is_empty());
		let rediffed = &result.moves[0];
		assert_eq!(rediffed.changed_lines, BTreeSet::from([3]));
		assert_eq!(rediffed.removed_in_move, 1);
		assert!(rediffed.is_changed(3));
		assert!(!rediffed.is_changed(2));
	}

	#[test]
	fn test_trailing_whitespace_is_not_a_change() {
		let fx = fixture(&["alpha  ", "beta", "gamma"], &["alpha", "beta", "gamma"]);
		let config = MoveDetectorConfig::default();
		let (index, _) = ContentGuard::new(&config).build_index(&fx.diff, &fx.base, &fx.head);
		let algorithm = MyersDiff;

		let result = Rediffer::new(&config, &algorithm).rediff_all(vec![candidate(3, 3)], &index);
		assert!(result.moves[0].changed_lines.is_empty());
		assert_eq!(result.moves[0].removed_in_move, 0);
	}

	#[test]
	fn test_algorithm_failure_drops_candidate() {
		let fx = fixture(&["alpha", "beta", "gamma"], &["alpha", "beta", "gamma"]);
		let config = MoveDetectorConfig::default();
		let (index, _) = ContentGuard::new(&config).build_index(&fx.diff, &fx.base, &fx.head);

		let result = Rediffer::new(&config, &FailingAlgorithm).rediff_all(vec![candidate(3, 3)], &index);
		assert!(result.moves.is_empty());
		assert_eq!(result.dropped.len(), 1);
		assert_eq!(result.dropped[0].1.category(), "rediff");
	}

	#[test]
	fn test_invalid_edit_script_drops_candidate() {
		let fx = fixture(&["alpha", "beta", "gamma"], &["alpha", "BETA", "gamma", "delta"]);
		let config = MoveDetectorConfig::default();
		let (index, _) = ContentGuard::new(&config).build_index(&fx.diff, &fx.base, &fx.head);

		let result = Rediffer::new(&config, &EverythingEqual).rediff_all(vec![candidate(3, 4)], &index);
		assert!(result.moves.is_empty());
		assert_eq!(result.dropped[0].1.category(), "edit_script");
	}

	#[test]
	fn test_missing_content_drops_candidate() {
		let fx = fixture(&["alpha", "beta", "gamma"], &["alpha", "beta", "gamma"]);
		let config = MoveDetectorConfig::default();
		let (index, _) = ContentGuard::new(&config).build_index(&fx.diff, &fx.base, &fx.head);
		let algorithm = MyersDiff;

		let result = Rediffer::new(&config, &algorithm).rediff_all(vec![candidate(3, 9)], &index);
		assert!(result.moves.is_empty());
		assert_eq!(result.dropped.len(), 1);
	}
}
