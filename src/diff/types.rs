use serde::{Deserialize, Serialize};

/// Which side of the diff a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
	Added,
	Removed,
	Context,
}

impl LineType {
	pub fn as_str(&self) -> &'static str {
		match self {
			LineType::Added => "added",
			LineType::Removed => "removed",
			LineType::Context => "context",
		}
	}

	/// Prefix character used in unified diff output
	pub fn prefix(&self) -> char {
		match self {
			LineType::Added => '+',
			LineType::Removed => '-',
			LineType::Context => ' ',
		}
	}
}

/// A single line of a unified diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
	pub content: String,
	pub line_type: LineType,
	pub old_line_number: Option<usize>,
	pub new_line_number: Option<usize>,
	pub file_path: String,
}

impl DiffLine {
	pub fn added(file_path: &str, new_line_number: usize, content: &str) -> Self {
		Self {
			content: content.to_string(),
			line_type: LineType::Added,
			old_line_number: None,
			new_line_number: Some(new_line_number),
			file_path: file_path.to_string(),
		}
	}

	pub fn removed(file_path: &str, old_line_number: usize, content: &str) -> Self {
		Self {
			content: content.to_string(),
			line_type: LineType::Removed,
			old_line_number: Some(old_line_number),
			new_line_number: None,
			file_path: file_path.to_string(),
		}
	}

	pub fn context(
		file_path: &str, old_line_number: usize, new_line_number: usize, content: &str,
	) -> Self {
		Self {
			content: content.to_string(),
			line_type: LineType::Context,
			old_line_number: Some(old_line_number),
			new_line_number: Some(new_line_number),
			file_path: file_path.to_string(),
		}
	}

	pub fn is_changed(&self) -> bool {
		self.line_type != LineType::Context
	}
}

/// A contiguous region of changes within one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
	pub old_start: usize,
	pub old_lines: usize,
	pub new_start: usize,
	pub new_lines: usize,
	pub lines: Vec<DiffLine>,
}

impl Hunk {
	pub fn new(
		old_start: usize, old_lines: usize, new_start: usize, new_lines: usize,
		lines: Vec<DiffLine>,
	) -> Self {
		Self {
			old_start,
			old_lines,
			new_start,
			new_lines,
			lines,
		}
	}

	/// Build a hunk whose header is derived from the line numbers it carries.
	///
	/// A side without any numbered line gets a zero-length range anchored at 0,
	/// which matches what git emits for wholesale additions and deletions.
	pub fn from_lines(lines: Vec<DiffLine>) -> Self {
		let old_numbers: Vec<usize> = lines.iter().filter_map(|l| l.old_line_number).collect();
		let new_numbers: Vec<usize> = lines.iter().filter_map(|l| l.new_line_number).collect();

		Self {
			old_start: old_numbers.first().copied().unwrap_or(0),
			old_lines: old_numbers.len(),
			new_start: new_numbers.first().copied().unwrap_or(0),
			new_lines: new_numbers.len(),
			lines,
		}
	}

	pub fn added_lines(&self) -> impl Iterator<Item = &DiffLine> {
		self.lines.iter().filter(|l| l.line_type == LineType::Added)
	}

	pub fn removed_lines(&self) -> impl Iterator<Item = &DiffLine> {
		self.lines.iter().filter(|l| l.line_type == LineType::Removed)
	}

	/// Number of added plus removed lines
	pub fn changed_line_count(&self) -> usize {
		self.lines.iter().filter(|l| l.is_changed()).count()
	}
}

/// Type of change recorded for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
	Added,
	Deleted,
	Modified,
	Renamed,
	Binary,
}

impl FileStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			FileStatus::Added => "added",
			FileStatus::Deleted => "deleted",
			FileStatus::Modified => "modified",
			FileStatus::Renamed => "renamed",
			FileStatus::Binary => "binary",
		}
	}
}

/// All hunks that touch one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
	/// Path at the head revision (or the base revision for deletions)
	pub path: String,
	/// Path at the base revision when the file was renamed
	pub old_path: Option<String>,
	pub status: FileStatus,
	pub hunks: Vec<Hunk>,
}

impl FileDiff {
	pub fn new(path: &str, hunks: Vec<Hunk>) -> Self {
		Self {
			path: path.to_string(),
			old_path: None,
			status: FileStatus::Modified,
			hunks,
		}
	}

	pub fn with_status(mut self, status: FileStatus) -> Self {
		self.status = status;
		self
	}

	pub fn with_old_path(mut self, old_path: &str) -> Self {
		self.old_path = Some(old_path.to_string());
		self
	}

	/// Key used to look the file up in the base revision contents
	pub fn old_content_path(&self) -> &str {
		self.old_path.as_deref().unwrap_or(&self.path)
	}

	pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
		self.hunks.iter().flat_map(|h| h.lines.iter())
	}

	pub fn has_line_type(&self, line_type: LineType) -> bool {
		self.lines().any(|l| l.line_type == line_type)
	}

	pub fn is_empty(&self) -> bool {
		self.hunks.iter().all(|h| h.lines.is_empty())
	}
}

/// A structured diff: files, hunks, typed lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDiff {
	pub files: Vec<FileDiff>,
}

impl ParsedDiff {
	pub fn new(files: Vec<FileDiff>) -> Self {
		Self { files }
	}

	pub fn file(&self, path: &str) -> Option<&FileDiff> {
		self.files.iter().find(|f| f.path == path)
	}

	pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
		self.files.iter().flat_map(|f| f.lines())
	}

	pub fn line_count(&self) -> usize {
		self.lines().count()
	}

	pub fn hunk_count(&self) -> usize {
		self.files.iter().map(|f| f.hunks.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.files.iter().all(|f| f.is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hunk_header_derived_from_lines() {
		let hunk = Hunk::from_lines(vec![
			DiffLine::context("a.rs", 4, 4, "fn main() {"),
			DiffLine::removed("a.rs", 5, "    old();"),
			DiffLine::added("a.rs", 5, "    new();"),
			DiffLine::added("a.rs", 6, "    newer();"),
			DiffLine::context("a.rs", 6, 7, "}"),
		]);

		assert_eq!(hunk.old_start, 4);
		assert_eq!(hunk.old_lines, 3);
		assert_eq!(hunk.new_start, 4);
		assert_eq!(hunk.new_lines, 4);
		assert_eq!(hunk.changed_line_count(), 3);
	}

	#[test]
	fn test_hunk_header_for_pure_addition() {
		let hunk = Hunk::from_lines(vec![
			DiffLine::added("new.rs", 1, "a"),
			DiffLine::added("new.rs", 2, "b"),
		]);

		assert_eq!(hunk.old_start, 0);
		assert_eq!(hunk.old_lines, 0);
		assert_eq!(hunk.new_start, 1);
		assert_eq!(hunk.new_lines, 2);
	}

	#[test]
	fn test_old_content_path_prefers_rename_source() {
		let file = FileDiff::new("src/new_name.rs", vec![])
			.with_status(FileStatus::Renamed)
			.with_old_path("src/old_name.rs");
		assert_eq!(file.old_content_path(), "src/old_name.rs");

		let plain = FileDiff::new("src/lib.rs", vec![]);
		assert_eq!(plain.old_content_path(), "src/lib.rs");
	}

	#[test]
	fn test_line_type_serializes_lowercase() {
		let json = serde_json::to_string(&LineType::Removed).unwrap();
		assert_eq!(json, "\"removed\"");
	}
}
