//! Values produced by the move detection pipeline

use crate::diff::types::{DiffLine, LineType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which revision of a file a piece of content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
	Base,
	Head,
}

impl fmt::Display for Revision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Revision::Base => write!(f, "base"),
			Revision::Head => write!(f, "head"),
		}
	}
}

/// Identifier of a move within one [`MoveReport`](crate::move_detection::report::MoveReport)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub usize);

impl fmt::Display for MoveId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "move#{}", self.0)
	}
}

/// Inclusive, 1-indexed line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineRange {
	pub start: usize,
	pub end: usize,
}

impl LineRange {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	pub fn len(&self) -> usize {
		self.end + 1 - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.end < self.start
	}

	pub fn contains(&self, line: usize) -> bool {
		self.start <= line && line <= self.end
	}

	pub fn overlaps(&self, other: &LineRange) -> bool {
		self.start <= other.end && other.start <= self.end
	}

	pub fn lines(&self) -> impl Iterator<Item = usize> {
		self.start..=self.end
	}
}

impl fmt::Display for LineRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.start, self.end)
	}
}

/// A contiguous block of lines relocated from one place to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCandidate {
	pub id: MoveId,
	pub source_file: String,
	pub source_lines: LineRange,
	pub target_file: String,
	pub target_lines: LineRange,
	pub matched_lines: usize,
	/// Confidence in [0, 1]
	pub score: f64,
}

/// What happened to a single diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineClassification {
	New,
	Moved,
	ChangedInMove,
	Removed,
	MovedRemoval,
	Context,
}

impl LineClassification {
	pub fn as_str(&self) -> &'static str {
		match self {
			LineClassification::New => "new",
			LineClassification::Moved => "moved",
			LineClassification::ChangedInMove => "changedInMove",
			LineClassification::Removed => "removed",
			LineClassification::MovedRemoval => "movedRemoval",
			LineClassification::Context => "context",
		}
	}

	/// Pure relocation; hidden from the effective diff
	pub fn is_relocation(&self) -> bool {
		matches!(self, LineClassification::Moved | LineClassification::MovedRemoval)
	}

	/// Face-value classification used when move detection does not apply
	pub fn fallback_for(line_type: LineType) -> Self {
		match line_type {
			LineType::Added => LineClassification::New,
			LineType::Removed => LineClassification::Removed,
			LineType::Context => LineClassification::Context,
		}
	}
}

/// A diff line with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDiffLine {
	#[serde(flatten)]
	pub line: DiffLine,
	pub classification: LineClassification,
	/// Lookup key into the move report; never owns the candidate
	pub move_id: Option<MoveId>,
}

/// A hunk of classified lines, kept at the original hunk boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedHunk {
	pub file_path: String,
	pub old_start: usize,
	pub old_lines: usize,
	pub new_start: usize,
	pub new_lines: usize,
	pub lines: Vec<ClassifiedDiffLine>,
}

impl ClassifiedHunk {
	fn count(&self, classification: LineClassification) -> usize {
		self.lines
			.iter()
			.filter(|l| l.classification == classification)
			.count()
	}

	/// Every changed line belongs to a move and at least one does
	pub fn is_moved(&self) -> bool {
		let mut changed = self.lines.iter().filter(|l| l.line.is_changed()).peekable();
		changed.peek().is_some()
			&& changed.all(|l| {
				matches!(
					l.classification,
					LineClassification::Moved
						| LineClassification::MovedRemoval
						| LineClassification::ChangedInMove
				)
			})
	}

	pub fn has_new_code(&self) -> bool {
		self.count(LineClassification::New) > 0
	}

	pub fn has_changes_in_move(&self) -> bool {
		self.count(LineClassification::ChangedInMove) > 0
	}
}

/// Classified hunks of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFile {
	pub path: String,
	pub hunks: Vec<ClassifiedHunk>,
}

impl ClassifiedFile {
	pub fn lines(&self) -> impl Iterator<Item = &ClassifiedDiffLine> {
		self.hunks.iter().flat_map(|h| h.lines.iter())
	}
}
