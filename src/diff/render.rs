use crate::diff::types::{FileDiff, FileStatus, Hunk, ParsedDiff};
use std::fmt;

/// Render a diff back to unified `git diff` text
pub fn render_unified(diff: &ParsedDiff) -> String {
	diff.to_string()
}

impl fmt::Display for ParsedDiff {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for file in &self.files {
			render_file(f, file)?;
		}
		Ok(())
	}
}

fn render_file(out: &mut impl fmt::Write, file: &FileDiff) -> fmt::Result {
	let old_path = file.old_content_path();
	writeln!(out, "diff --git a/{} b/{}", old_path, file.path)?;

	let old_label = match file.status {
		FileStatus::Added => "/dev/null".to_string(),
		_ => format!("a/{old_path}"),
	};
	let new_label = match file.status {
		FileStatus::Deleted => "/dev/null".to_string(),
		_ => format!("b/{}", file.path),
	};
	writeln!(out, "--- {old_label}")?;
	writeln!(out, "+++ {new_label}")?;

	for hunk in &file.hunks {
		render_hunk(out, hunk)?;
	}
	Ok(())
}

fn render_hunk(out: &mut impl fmt::Write, hunk: &Hunk) -> fmt::Result {
	writeln!(
		out,
		"@@ -{} +{} @@",
		format_range(hunk.old_start, hunk.old_lines),
		format_range(hunk.new_start, hunk.new_lines)
	)?;
	for line in &hunk.lines {
		writeln!(out, "{}{}", line.line_type.prefix(), line.content)?;
	}
	Ok(())
}

fn format_range(start: usize, len: usize) -> String {
	if len == 1 {
		start.to_string()
	} else {
		format!("{start},{len}")
	}
}
