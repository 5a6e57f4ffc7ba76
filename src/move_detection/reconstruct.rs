//! Line classification and effective diff reconstruction

use crate::diff::types::{DiffLine, FileDiff, Hunk, LineType, ParsedDiff};
use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::rediff::RediffedMove;
use crate::move_detection::types::{
	ClassifiedDiffLine, ClassifiedFile, ClassifiedHunk, LineClassification, MoveId,
};
use std::collections::HashMap;

/// Per-file lookup sets built from the finalized moves
#[derive(Default)]
struct MoveLookup<'m> {
	/// Old lines inside a move source
	removals: HashMap<(&'m str, usize), MoveId>,
	/// New lines inside a move target, flagged when changed inside the move
	targets: HashMap<(&'m str, usize), (MoveId, bool)>,
}

impl<'m> MoveLookup<'m> {
	fn new(moves: &'m [RediffedMove]) -> Self {
		let mut lookup = Self::default();
		for m in moves {
			let candidate = &m.candidate;
			for line in candidate.source_lines.lines() {
				lookup.removals.insert((&candidate.source_file, line), candidate.id);
			}
			for line in candidate.target_lines.lines() {
				lookup
					.targets
					.insert((&candidate.target_file, line), (candidate.id, m.is_changed(line)));
			}
		}
		lookup
	}

	fn classify(&self, path: &str, line: &DiffLine) -> (LineClassification, Option<MoveId>) {
		match line.line_type {
			LineType::Removed => {
				match line.old_line_number.and_then(|n| self.removals.get(&(path, n))) {
					Some(&id) => (LineClassification::MovedRemoval, Some(id)),
					None => (LineClassification::Removed, None),
				}
			}
			LineType::Added => {
				match line.new_line_number.and_then(|n| self.targets.get(&(path, n))) {
					Some(&(id, true)) => (LineClassification::ChangedInMove, Some(id)),
					Some(&(id, false)) => (LineClassification::Moved, Some(id)),
					None => (LineClassification::New, None),
				}
			}
			LineType::Context => (LineClassification::Context, None),
		}
	}
}

/// Classified view of a diff plus its effective diff
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
	pub files: Vec<ClassifiedFile>,
	pub effective_diff: ParsedDiff,
}

/// Applies the finalized moves to every diff line and rebuilds the effective diff
pub struct Reconstructor<'c> {
	config: &'c MoveDetectorConfig,
}

impl<'c> Reconstructor<'c> {
	pub fn new(config: &'c MoveDetectorConfig) -> Self {
		Self { config }
	}

	pub fn reconstruct(&self, diff: &ParsedDiff, moves: &[RediffedMove]) -> Reconstruction {
		let files = self.classify(diff, moves);
		let effective_diff = self.effective_diff(diff, &files);
		Reconstruction {
			files,
			effective_diff,
		}
	}

	/// Classify every line, one `ClassifiedFile` per diff file and one
	/// `ClassifiedHunk` per original hunk
	pub fn classify(&self, diff: &ParsedDiff, moves: &[RediffedMove]) -> Vec<ClassifiedFile> {
		let lookup = MoveLookup::new(moves);

		diff.files
			.iter()
			.map(|file| ClassifiedFile {
				path: file.path.clone(),
				hunks: file
					.hunks
					.iter()
					.map(|hunk| ClassifiedHunk {
						file_path: file.path.clone(),
						old_start: hunk.old_start,
						old_lines: hunk.old_lines,
						new_start: hunk.new_start,
						new_lines: hunk.new_lines,
						lines: hunk
							.lines
							.iter()
							.map(|line| {
								let (classification, move_id) = lookup.classify(&file.path, line);
								ClassifiedDiffLine {
									line: line.clone(),
									classification,
									move_id,
								}
							})
							.collect(),
					})
					.collect(),
			})
			.collect()
	}

	/// Drop relocated lines and distant context; files left without changes disappear
	pub fn effective_diff(&self, diff: &ParsedDiff, files: &[ClassifiedFile]) -> ParsedDiff {
		let files = diff
			.files
			.iter()
			.zip(files)
			.filter_map(|(original, classified)| {
				let hunks: Vec<Hunk> = classified
					.hunks
					.iter()
					.flat_map(|hunk| self.effective_hunks(hunk))
					.collect();
				if hunks.is_empty() {
					return None;
				}
				Some(FileDiff {
					path: original.path.clone(),
					old_path: original.old_path.clone(),
					status: original.status,
					hunks,
				})
			})
			.collect();
		ParsedDiff::new(files)
	}

	/// Split one classified hunk into the effective hunks it leaves behind
	///
	/// Only dropped context breaks a hunk; hidden relocations are skipped over.
	/// Zero-length sides anchor at the line before, as unified diffs do.
	fn effective_hunks(&self, hunk: &ClassifiedHunk) -> Vec<Hunk> {
		let radius = self.config.effective_context_lines;
		let visible: Vec<&ClassifiedDiffLine> = hunk
			.lines
			.iter()
			.filter(|l| !l.classification.is_relocation())
			.collect();
		let changes: Vec<usize> = visible
			.iter()
			.enumerate()
			.filter(|(_, l)| l.line.is_changed())
			.map(|(i, _)| i)
			.collect();
		if changes.is_empty() {
			return Vec::new();
		}
		let near_change = |i: usize| {
			let next = changes.partition_point(|&c| c < i);
			let after = changes.get(next).map_or(false, |&c| c - i <= radius);
			let before = next > 0 && i - changes[next - 1] <= radius;
			after || before
		};

		let mut segments = Vec::new();
		let mut current: Vec<DiffLine> = Vec::new();
		let mut anchor = (0, 0);
		let mut last_old = line_before(hunk.old_start, hunk.old_lines);
		let mut last_new = line_before(hunk.new_start, hunk.new_lines);
		let mut visible_index = 0;

		for line in &hunk.lines {
			if !line.classification.is_relocation() {
				if near_change(visible_index) {
					if current.is_empty() {
						anchor = (last_old, last_new);
					}
					current.push(line.line.clone());
				} else if !current.is_empty() {
					segments.push(segment_hunk(anchor, std::mem::take(&mut current)));
				}
				visible_index += 1;
			}

			if let Some(n) = line.line.old_line_number {
				last_old = n;
			}
			if let Some(n) = line.line.new_line_number {
				last_new = n;
			}
		}
		if !current.is_empty() {
			segments.push(segment_hunk(anchor, current));
		}

		segments.retain(|h| h.changed_line_count() > 0);
		segments
	}
}

/// Last line preceding a hunk side; a zero-length side already names it
fn line_before(start: usize, len: usize) -> usize {
	if len == 0 {
		start
	} else {
		start.saturating_sub(1)
	}
}

fn segment_hunk((before_old, before_new): (usize, usize), lines: Vec<DiffLine>) -> Hunk {
	let old_lines = lines.iter().filter(|l| l.old_line_number.is_some()).count();
	let new_lines = lines.iter().filter(|l| l.new_line_number.is_some()).count();
	let old_start = lines
		.iter()
		.find_map(|l| l.old_line_number)
		.unwrap_or(before_old);
	let new_start = lines
		.iter()
		.find_map(|l| l.new_line_number)
		.unwrap_or(before_new);
	Hunk::new(old_start, old_lines, new_start, new_lines, lines)
}
