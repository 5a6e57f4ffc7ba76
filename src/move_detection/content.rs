//! Guards deciding which files move detection may look at

use crate::diff::types::{FileDiff, FileStatus, LineType, ParsedDiff};
use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::error::MoveDetectionError;
use crate::move_detection::types::{LineRange, Revision};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Full file texts at one revision, keyed by path
pub type FileContents = HashMap<String, String>;

/// One revision of a file split into lines
#[derive(Debug, Clone)]
pub struct RevisionText<'a> {
	lines: Vec<&'a str>,
}

impl<'a> RevisionText<'a> {
	pub fn new(content: &'a str) -> Self {
		Self {
			lines: content.lines().collect(),
		}
	}

	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	/// 1-indexed line lookup
	pub fn line(&self, number: usize) -> Option<&'a str> {
		number.checked_sub(1).and_then(|i| self.lines.get(i).copied())
	}

	/// Lines of an inclusive range, or None when it runs past the file
	pub fn extract(&self, range: LineRange) -> Option<&[&'a str]> {
		if range.start == 0 || range.is_empty() {
			return None;
		}
		self.lines.get(range.start - 1..range.end)
	}
}

/// A file that passed the guard, with whichever revisions it needs
#[derive(Debug, Clone)]
pub struct EligibleFile<'a> {
	pub base: Option<RevisionText<'a>>,
	pub head: Option<RevisionText<'a>>,
}

/// Record of a file excluded from move detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
	pub path: String,
	pub category: String,
	pub reason: String,
}

impl SkippedFile {
	fn from_error(path: &str, error: &MoveDetectionError) -> Self {
		Self {
			path: path.to_string(),
			category: error.category().to_string(),
			reason: error.to_string(),
		}
	}
}

/// Eligible files of one diff, keyed by their diff path
#[derive(Debug, Default)]
pub struct ContentIndex<'a> {
	files: HashMap<String, EligibleFile<'a>>,
}

impl<'a> ContentIndex<'a> {
	pub fn is_eligible(&self, path: &str) -> bool {
		self.files.contains_key(path)
	}

	pub fn base(&self, path: &str) -> Option<&RevisionText<'a>> {
		self.files.get(path).and_then(|f| f.base.as_ref())
	}

	pub fn head(&self, path: &str) -> Option<&RevisionText<'a>> {
		self.files.get(path).and_then(|f| f.head.as_ref())
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

/// Checks availability, binary-ness, size and line ranges of file contents
pub struct ContentGuard<'c> {
	config: &'c MoveDetectorConfig,
}

impl<'c> ContentGuard<'c> {
	pub fn new(config: &'c MoveDetectorConfig) -> Self {
		Self { config }
	}

	/// Inspect every file of the diff; files that fail are reported, never fatal
	pub fn build_index<'a>(
		&self, diff: &ParsedDiff, base: &'a FileContents, head: &'a FileContents,
	) -> (ContentIndex<'a>, Vec<SkippedFile>) {
		let mut index = ContentIndex::default();
		let mut skipped = Vec::new();

		for file in &diff.files {
			if file.is_empty() {
				continue;
			}
			match self.inspect(file, base, head) {
				Ok(eligible) => {
					index.files.insert(file.path.clone(), eligible);
				}
				Err(error) => {
					if error.is_unsupported_content() {
						debug!("Skipping {} for move detection: {}", file.path, error);
					} else if error.is_malformed_input() && !is_wholesale_change(file) {
						warn!("Excluding {} from move detection: {}", file.path, error);
					} else {
						debug!("No usable content for {}: {}", file.path, error);
					}
					skipped.push(SkippedFile::from_error(&file.path, &error));
				}
			}
		}

		(index, skipped)
	}

	/// Check one file; a revision is only required when the diff has lines on that side
	pub fn inspect<'a>(
		&self, file: &FileDiff, base: &'a FileContents, head: &'a FileContents,
	) -> Result<EligibleFile<'a>, MoveDetectionError> {
		if file.status == FileStatus::Binary {
			return Err(MoveDetectionError::BinaryContent {
				path: file.path.clone(),
				revision: Revision::Head,
			});
		}

		let has_context = file.has_line_type(LineType::Context);
		let needs_base = has_context || file.has_line_type(LineType::Removed);
		let needs_head = has_context || file.has_line_type(LineType::Added);

		let base_text = if needs_base {
			Some(self.load(file, file.old_content_path(), base, Revision::Base)?)
		} else {
			None
		};
		let head_text = if needs_head {
			Some(self.load(file, &file.path, head, Revision::Head)?)
		} else {
			None
		};

		Ok(EligibleFile {
			base: base_text,
			head: head_text,
		})
	}

	fn load<'a>(
		&self, file: &FileDiff, key: &str, contents: &'a FileContents, revision: Revision,
	) -> Result<RevisionText<'a>, MoveDetectionError> {
		let content = contents
			.get(key)
			.ok_or_else(|| MoveDetectionError::content_unavailable(&file.path, revision))?;

		if content.len() > self.config.max_file_size {
			return Err(MoveDetectionError::OversizedContent {
				path: file.path.clone(),
				revision,
				size: content.len(),
				limit: self.config.max_file_size,
			});
		}

		if content.contains('\0') {
			return Err(MoveDetectionError::BinaryContent {
				path: file.path.clone(),
				revision,
			});
		}

		let text = RevisionText::new(content);
		let referenced = file.lines().filter_map(|line| match revision {
			Revision::Base => line.old_line_number,
			Revision::Head => line.new_line_number,
		});
		if let Some(line) = referenced.filter(|&n| n == 0 || n > text.line_count()).min() {
			return Err(MoveDetectionError::LineOutOfRange {
				path: file.path.clone(),
				revision,
				line,
				line_count: text.line_count(),
			});
		}

		let mismatch = file.lines().find_map(|line| {
			let number = match revision {
				Revision::Base => line.old_line_number,
				Revision::Head => line.new_line_number,
			}?;
			let actual = text.line(number)?;
			(actual.trim_end() != line.content.trim_end()).then_some(number)
		});
		if let Some(line) = mismatch {
			return Err(MoveDetectionError::ContentMismatch {
				path: file.path.clone(),
				revision,
				line,
			});
		}

		Ok(text)
	}
}

/// Wholesale additions and deletions are expected to miss one revision
fn is_wholesale_change(file: &FileDiff) -> bool {
	matches!(file.status, FileStatus::Added | FileStatus::Deleted)
}
