//! Unified diff parsing
//!
//! Turns `git diff` output into a [`ParsedDiff`]. Only the parts the move
//! detector consumes are modelled: file paths and status, hunk headers and typed
//! lines with their old/new line numbers.

use crate::diff::error::DiffParseError;
use crate::diff::types::{DiffLine, FileDiff, FileStatus, Hunk, ParsedDiff};
use tracing::debug;

const DEV_NULL: &str = "/dev/null";

/// Parse unified diff text into files, hunks and numbered lines
pub fn parse_unified_diff(text: &str) -> Result<ParsedDiff, DiffParseError> {
	let mut files = Vec::new();
	let mut current: Option<FileBuilder> = None;
	let lines: Vec<&str> = text.lines().collect();
	let mut index = 0;

	while index < lines.len() {
		let line = lines[index];
		let line_number = index + 1;

		if let Some(rest) = line.strip_prefix("diff --git ") {
			if let Some(builder) = current.take() {
				files.push(builder.finish());
			}
			current = Some(FileBuilder::from_git_header(rest));
			index += 1;
			continue;
		}

		if line.starts_with("--- ") && lines.get(index + 1).is_some_and(|l| l.starts_with("+++ ")) {
			let old_path = header_path(&line[4..]);
			let new_path = header_path(&lines[index + 1][4..]);

			// Plain unified diffs have no `diff --git` line, so each ---/+++ pair
			// opens a new file unless the current one has no hunks yet.
			let starts_new_file = current.as_ref().map_or(true, |b| !b.hunks.is_empty());
			if starts_new_file {
				if let Some(builder) = current.take() {
					files.push(builder.finish());
				}
				current = Some(FileBuilder::default());
			}
			if let Some(builder) = current.as_mut() {
				builder.apply_paths(old_path, new_path);
			}
			index += 2;
			continue;
		}

		if line.starts_with("@@") {
			let builder = current
				.as_mut()
				.ok_or(DiffParseError::HunkWithoutFile { line_number })?;
			let header = parse_hunk_header(line).ok_or_else(|| DiffParseError::InvalidHunkHeader {
				line_number,
				header: line.to_string(),
			})?;
			index = builder.read_hunk(header, &lines, index + 1)?;
			continue;
		}

		if let Some(builder) = current.as_mut() {
			builder.apply_metadata(line);
		}
		index += 1;
	}

	if let Some(builder) = current.take() {
		files.push(builder.finish());
	}

	debug!("Parsed diff with {} files", files.len());
	Ok(ParsedDiff::new(files))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
	old_start: usize,
	old_lines: usize,
	new_start: usize,
	new_lines: usize,
}

/// Parse `@@ -a[,b] +c[,d] @@ optional section`
fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
	let body = line.strip_prefix("@@ ")?;
	let (ranges, _) = body.split_once(" @@")?;
	let (old, new) = ranges.split_once(' ')?;
	let (old_start, old_lines) = parse_range(old.strip_prefix('-')?)?;
	let (new_start, new_lines) = parse_range(new.strip_prefix('+')?)?;

	Some(HunkHeader {
		old_start,
		old_lines,
		new_start,
		new_lines,
	})
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
	match range.split_once(',') {
		Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
		None => Some((range.parse().ok()?, 1)),
	}
}

/// Strip the `a/` / `b/` prefixes and trailing timestamps from a ---/+++ path
fn header_path(raw: &str) -> Option<String> {
	let path = raw.split('\t').next().unwrap_or(raw).trim_end();
	if path == DEV_NULL {
		return None;
	}
	let stripped = path
		.strip_prefix("a/")
		.or_else(|| path.strip_prefix("b/"))
		.unwrap_or(path);
	Some(stripped.to_string())
}

#[derive(Debug, Default)]
struct FileBuilder {
	old_path: Option<String>,
	new_path: Option<String>,
	status: Option<FileStatus>,
	hunks: Vec<Hunk>,
}

impl FileBuilder {
	fn from_git_header(rest: &str) -> Self {
		let mut builder = Self::default();
		if let Some((old, new)) = rest.split_once(" b/") {
			builder.old_path = Some(old.strip_prefix("a/").unwrap_or(old).to_string());
			builder.new_path = Some(new.to_string());
		}
		builder
	}

	fn apply_paths(&mut self, old_path: Option<String>, new_path: Option<String>) {
		match (&old_path, &new_path) {
			(None, Some(_)) => self.status = Some(FileStatus::Added),
			(Some(_), None) => self.status = Some(FileStatus::Deleted),
			_ => {}
		}
		if old_path.is_some() || new_path.is_none() {
			self.old_path = old_path;
		}
		if new_path.is_some() {
			self.new_path = new_path;
		}
	}

	fn apply_metadata(&mut self, line: &str) {
		if line.starts_with("new file mode") {
			self.status = Some(FileStatus::Added);
		} else if line.starts_with("deleted file mode") {
			self.status = Some(FileStatus::Deleted);
		} else if let Some(from) = line.strip_prefix("rename from ") {
			self.old_path = Some(from.to_string());
			self.status = Some(FileStatus::Renamed);
		} else if let Some(to) = line.strip_prefix("rename to ") {
			self.new_path = Some(to.to_string());
			self.status = Some(FileStatus::Renamed);
		} else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
			self.status = Some(FileStatus::Binary);
		}
	}

	fn path(&self) -> String {
		let path = match self.status {
			Some(FileStatus::Deleted) => self.old_path.clone().or_else(|| self.new_path.clone()),
			_ => self.new_path.clone().or_else(|| self.old_path.clone()),
		};
		path.unwrap_or_default()
	}

	/// Consume the body of one hunk starting at `start`, returning the index of
	/// the first line after it
	fn read_hunk(
		&mut self, header: HunkHeader, lines: &[&str], start: usize,
	) -> Result<usize, DiffParseError> {
		let path = self.path();
		let mut old_line = header.old_start;
		let mut new_line = header.new_start;
		let mut old_seen = 0;
		let mut new_seen = 0;
		let mut body = Vec::new();
		let mut index = start;

		while index < lines.len() && (old_seen < header.old_lines || new_seen < header.new_lines) {
			let line = lines[index];
			if let Some(content) = line.strip_prefix('+') {
				body.push(DiffLine::added(&path, new_line, content));
				new_line += 1;
				new_seen += 1;
			} else if let Some(content) = line.strip_prefix('-') {
				body.push(DiffLine::removed(&path, old_line, content));
				old_line += 1;
				old_seen += 1;
			} else if line.starts_with('\\') {
				// "\ No newline at end of file"
			} else if line.starts_with("@@") || line.starts_with("diff --git ") {
				break;
			} else {
				// Some tools strip the single space from empty context lines
				let content = line.strip_prefix(' ').unwrap_or(line);
				body.push(DiffLine::context(&path, old_line, new_line, content));
				old_line += 1;
				new_line += 1;
				old_seen += 1;
				new_seen += 1;
			}
			index += 1;
		}

		if old_seen != header.old_lines || new_seen != header.new_lines {
			return Err(DiffParseError::TruncatedHunk {
				path,
				expected_old: header.old_lines,
				expected_new: header.new_lines,
				found_old: old_seen,
				found_new: new_seen,
			});
		}

		// A trailing marker belongs to the hunk just read
		while index < lines.len() && lines[index].starts_with('\\') {
			index += 1;
		}

		self.hunks.push(Hunk::new(
			header.old_start,
			header.old_lines,
			header.new_start,
			header.new_lines,
			body,
		));
		Ok(index)
	}

	fn finish(self) -> FileDiff {
		let path = self.path();
		let status = self.status.unwrap_or(FileStatus::Modified);
		let old_path = match (&self.old_path, status) {
			(Some(old), FileStatus::Renamed) if *old != path => Some(old.clone()),
			_ => None,
		};

		FileDiff {
			path,
			old_path,
			status,
			hunks: self.hunks,
		}
	}
}
