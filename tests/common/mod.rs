//! Common test utilities for the effective-diff library

#![allow(unused_imports, dead_code)]

use effective_diff::{
	DetectionOutcome, DiffLine, FileContents, FileDiff, Hunk, LineClassification, MoveDetector,
	MoveDetectorConfig, ParsedDiff,
};
use std::path::Path;
use tempfile::TempDir;

/// A diff together with the file contents it was produced from
pub struct Scenario {
	pub diff: ParsedDiff,
	pub base: FileContents,
	pub head: FileContents,
}

impl Scenario {
	pub fn new(files: Vec<FileDiff>) -> Self {
		Self {
			diff: ParsedDiff::new(files),
			base: FileContents::new(),
			head: FileContents::new(),
		}
	}

	pub fn with_base(mut self, path: &str, lines: &[&str]) -> Self {
		self.base.insert(path.to_string(), file_text(lines));
		self
	}

	pub fn with_head(mut self, path: &str, lines: &[&str]) -> Self {
		self.head.insert(path.to_string(), file_text(lines));
		self
	}

	pub fn detect(&self) -> DetectionOutcome {
		self.detect_with(MoveDetectorConfig::default())
	}

	pub fn detect_with(&self, config: MoveDetectorConfig) -> DetectionOutcome {
		let detector = MoveDetector::new(config).expect("valid config");
		detector.detect(&self.diff, &self.base, &self.head)
	}
}

/// Join lines into file content with a trailing newline
pub fn file_text(lines: &[&str]) -> String {
	let mut text = lines.join("\n");
	text.push('\n');
	text
}

/// Removed lines numbered from `start`
pub fn removed(path: &str, start: usize, lines: &[&str]) -> Vec<DiffLine> {
	lines
		.iter()
		.enumerate()
		.map(|(i, c)| DiffLine::removed(path, start + i, c))
		.collect()
}

/// Added lines numbered from `start`
pub fn added(path: &str, start: usize, lines: &[&str]) -> Vec<DiffLine> {
	lines
		.iter()
		.enumerate()
		.map(|(i, c)| DiffLine::added(path, start + i, c))
		.collect()
}

/// Classification of every line of `path`, in diff order
pub fn classifications(outcome: &DetectionOutcome, path: &str) -> Vec<LineClassification> {
	outcome
		.files
		.iter()
		.filter(|f| f.path == path)
		.flat_map(|f| f.lines())
		.map(|l| l.classification)
		.collect()
}

/// Classification of the line with the given new (or old) number
pub fn classification_of(
	outcome: &DetectionOutcome, path: &str, old: Option<usize>, new: Option<usize>,
) -> Option<LineClassification> {
	outcome
		.files
		.iter()
		.filter(|f| f.path == path)
		.flat_map(|f| f.lines())
		.find(|l| l.line.old_line_number == old && l.line.new_line_number == new)
		.map(|l| l.classification)
}

/// Every original line appears exactly once, in order, in the classified output
pub fn assert_partition(scenario: &Scenario, outcome: &DetectionOutcome) {
	assert_eq!(scenario.diff.files.len(), outcome.files.len());
	for (original, classified) in scenario.diff.files.iter().zip(&outcome.files) {
		assert_eq!(original.path, classified.path);
		assert_eq!(original.hunks.len(), classified.hunks.len());
		let original_lines: Vec<&DiffLine> = original.lines().collect();
		let classified_lines: Vec<&DiffLine> = classified.lines().map(|l| &l.line).collect();
		assert_eq!(original_lines, classified_lines);
	}
}

/// Create a temporary directory for testing
pub fn setup_temp_dir() -> TempDir {
	TempDir::new().expect("Failed to create temp directory")
}

/// Create a test file with content, creating parent directories
pub fn create_test_file(path: &Path, content: &str) -> std::io::Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A git diff moving `moved()` out of src/a.rs into a new src/b.rs
pub const MOVE_FUNCTION_DIFF: &str = "\
diff --git a/src/a.rs b/src/a.rs
index 1111111..2222222 100644
--- a/src/a.rs
+++ b/src/a.rs
@@ -1,9 +1,3 @@
 use std::fmt;

 fn keep() {}
-
-fn moved(x: i32) -> i32 {
-    let doubled = x * 2;
-    let shifted = doubled + 1;
-    shifted
-}
diff --git a/src/b.rs b/src/b.rs
new file mode 100644
index 0000000..3333333
--- /dev/null
+++ b/src/b.rs
@@ -0,0 +1,5 @@
+fn moved(x: i32) -> i32 {
+    let doubled = x * 2;
+    let shifted = doubled + 1;
+    shifted
+}
";

pub const BASE_A: &[&str] = &[
	"use std::fmt;",
	"",
	"fn keep() {}",
	"",
	"fn moved(x: i32) -> i32 {",
	"    let doubled = x * 2;",
	"    let shifted = doubled + 1;",
	"    shifted",
	"}",
];

pub const HEAD_A: &[&str] = &["use std::fmt;", "", "fn keep() {}"];

pub const HEAD_B: &[&str] = &[
	"fn moved(x: i32) -> i32 {",
	"    let doubled = x * 2;",
	"    let shifted = doubled + 1;",
	"    shifted",
	"}",
];
