use crate::diff::types::{LineType, ParsedDiff};
use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::content::ContentIndex;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::debug;
use twox_hash::XxHash64;

/// A removed or added diff line tagged with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine<'d> {
	pub path: &'d str,
	pub line_number: usize,
	pub hunk_index: usize,
	/// Run of consecutive changed lines the line belongs to, numbered across the diff
	pub change_run: usize,
	/// Position among the lines of the same side within its change run
	pub run_offset: usize,
	pub content: &'d str,
	pub normalized: &'d str,
	pub significant: bool,
	/// Its counterpart at the same position of the change run reads the same,
	/// so the line was edited in place (if at all) and never moved
	pub in_place: bool,
}

/// Candidate pairing of a removed line with an added line of equal content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinePair {
	/// Index into [`LineMatches::removed`]
	pub removed: usize,
	/// Index into [`LineMatches::added`]
	pub added: usize,
}

/// Output of line matching: every tagged line plus the many-to-many pairings
#[derive(Debug, Clone, Default)]
pub struct LineMatches<'d> {
	pub removed: Vec<TaggedLine<'d>>,
	pub added: Vec<TaggedLine<'d>>,
	pub pairs: Vec<LinePair>,
	/// Added lines whose content was too common on the removed side to pair
	pub noisy_lines: usize,
}

impl<'d> LineMatches<'d> {
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}
}

/// Normalize a line for comparison
pub fn normalize(content: &str, ignore_indentation: bool) -> &str {
	if ignore_indentation {
		content.trim()
	} else {
		content.trim_end()
	}
}

/// Blank, very short and punctuation-only lines (a lone brace) never pair
pub fn is_significant(normalized: &str, min_line_length: usize) -> bool {
	let trimmed = normalized.trim();
	!trimmed.is_empty()
		&& trimmed.chars().count() >= min_line_length
		&& !trimmed
			.chars()
			.all(|c| c.is_ascii_punctuation() || c.is_whitespace())
}

fn content_hash(normalized: &str) -> u64 {
	let mut hasher = XxHash64::default();
	normalized.hash(&mut hasher);
	hasher.finish()
}

/// Flag removed and added lines that read the same at the same position of one change run
fn mark_in_place(removed: &mut [TaggedLine], added: &mut [TaggedLine]) {
	let slots: HashMap<(usize, usize), usize> = removed
		.iter()
		.enumerate()
		.map(|(i, l)| ((l.change_run, l.run_offset), i))
		.collect();
	for line in added.iter_mut() {
		let Some(&i) = slots.get(&(line.change_run, line.run_offset)) else {
			continue;
		};
		if removed[i].normalized == line.normalized {
			removed[i].in_place = true;
			line.in_place = true;
		}
	}
}

/// Removed lines sharing one normalized content
struct ContentGroup<'d> {
	normalized: &'d str,
	members: Vec<usize>,
}

/// Finds equal-content pairings between removed and added lines across the whole diff
pub struct LineMatcher<'c> {
	config: &'c MoveDetectorConfig,
}

impl<'c> LineMatcher<'c> {
	pub fn new(config: &'c MoveDetectorConfig) -> Self {
		Self { config }
	}

	/// Tag the removed and added lines of every eligible file, in diff order
	pub fn collect_lines<'d>(
		&self, diff: &'d ParsedDiff, index: &ContentIndex,
	) -> (Vec<TaggedLine<'d>>, Vec<TaggedLine<'d>>) {
		let mut removed = Vec::new();
		let mut added = Vec::new();
		let mut hunk_index = 0;
		let mut change_run = 0;

		for file in &diff.files {
			let eligible = index.is_eligible(&file.path);
			for hunk in &file.hunks {
				if eligible {
					let (mut removed_offset, mut added_offset) = (0, 0);
					for line in &hunk.lines {
						let (number, offset) = match line.line_type {
							LineType::Removed => (line.old_line_number, &mut removed_offset),
							LineType::Added => (line.new_line_number, &mut added_offset),
							LineType::Context => {
								if removed_offset + added_offset > 0 {
									change_run += 1;
									(removed_offset, added_offset) = (0, 0);
								}
								continue;
							}
						};
						let Some(line_number) = number else {
							continue;
						};
						let normalized = normalize(&line.content, self.config.ignore_indentation);
						let tagged = TaggedLine {
							path: &file.path,
							line_number,
							hunk_index,
							change_run,
							run_offset: *offset,
							content: &line.content,
							normalized,
							significant: is_significant(normalized, self.config.min_line_length),
							in_place: false,
						};
						*offset += 1;
						if line.line_type == LineType::Removed {
							removed.push(tagged);
						} else {
							added.push(tagged);
						}
					}
				}
				hunk_index += 1;
				change_run += 1;
			}
		}

		(removed, added)
	}

	/// Pair every significant added line with every removed line of equal content
	pub fn find_matches<'d>(&self, diff: &'d ParsedDiff, index: &ContentIndex) -> LineMatches<'d> {
		let (mut removed, mut added) = self.collect_lines(diff, index);
		mark_in_place(&mut removed, &mut added);

		let mut groups: HashMap<u64, Vec<ContentGroup<'d>>> = HashMap::new();
		for (i, line) in removed.iter().enumerate().filter(|(_, l)| l.significant && !l.in_place) {
			let bucket = groups.entry(content_hash(line.normalized)).or_default();
			match bucket.iter_mut().find(|g| g.normalized == line.normalized) {
				Some(group) => group.members.push(i),
				None => bucket.push(ContentGroup {
					normalized: line.normalized,
					members: vec![i],
				}),
			}
		}

		let mut pairs = Vec::new();
		let mut noisy_lines = 0;
		for (j, line) in added.iter().enumerate().filter(|(_, l)| l.significant && !l.in_place) {
			let group = groups
				.get(&content_hash(line.normalized))
				.and_then(|bucket| bucket.iter().find(|g| g.normalized == line.normalized));
			let Some(group) = group else {
				continue;
			};
			if group.members.len() > self.config.max_line_occurrences {
				noisy_lines += 1;
				continue;
			}
			pairs.extend(group.members.iter().map(|&i| LinePair { removed: i, added: j }));
		}
		pairs.sort();

		debug!(
			"Line matching: {} removed, {} added, {} pairings ({} noisy lines skipped)",
			removed.len(),
			added.len(),
			pairs.len(),
			noisy_lines
		);

		LineMatches {
			removed,
			added,
			pairs,
			noisy_lines,
		}
	}
}
