//! Block aggregation: contiguous runs of line pairings become scored move candidates

use crate::move_detection::config::MoveDetectorConfig;
use crate::move_detection::matching::{LineMatches, TaggedLine};
use crate::move_detection::types::{LineRange, MoveCandidate, MoveId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// (file, line)
type LineKey<'d> = (&'d str, usize);
/// (source file, old line, target file, new line)
type PairKey<'d> = (&'d str, usize, &'d str, usize);

/// One step of a chain
///
/// Anchored links are real pairings; the others join identical lines that
/// were too trivial (or too frequent) to pair, and never start a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link<'d> {
	key: PairKey<'d>,
	anchored: bool,
}

/// Lookups over the pairings of one diff
struct PairLookup<'d> {
	pairs: Vec<PairKey<'d>>,
	by_position: HashMap<PairKey<'d>, usize>,
	removed_lines: HashMap<LineKey<'d>, TaggedLine<'d>>,
	added_lines: HashMap<LineKey<'d>, TaggedLine<'d>>,
}

impl<'d> PairLookup<'d> {
	fn new(matches: &LineMatches<'d>) -> Self {
		let pairs: Vec<PairKey<'d>> = matches
			.pairs
			.iter()
			.map(|pair| {
				let removed = &matches.removed[pair.removed];
				let added = &matches.added[pair.added];
				(removed.path, removed.line_number, added.path, added.line_number)
			})
			.collect();
		let by_position = pairs.iter().enumerate().map(|(i, &key)| (key, i)).collect();

		Self {
			pairs,
			by_position,
			removed_lines: matches
				.removed
				.iter()
				.map(|l| ((l.path, l.line_number), l.clone()))
				.collect(),
			added_lines: matches
				.added
				.iter()
				.map(|l| ((l.path, l.line_number), l.clone()))
				.collect(),
		}
	}

	/// A chain starts wherever the diagonal predecessor is not itself a pairing
	fn is_chain_head(&self, index: usize) -> bool {
		let (source, old, target, new) = self.pairs[index];
		if old <= 1 || new <= 1 {
			return true;
		}
		!self.by_position.contains_key(&(source, old - 1, target, new - 1))
	}

	/// Identical removed and added lines at these positions, unless they are an in-place edit
	fn same_content(&self, (source, old, target, new): PairKey<'d>) -> bool {
		match (self.removed_lines.get(&(source, old)), self.added_lines.get(&(target, new))) {
			(Some(removed), Some(added)) => {
				removed.normalized == added.normalized && !removed.in_place && !added.in_place
			}
			_ => false,
		}
	}

	fn link_at(&self, key: PairKey<'d>, diagonal: bool) -> Option<Link<'d>> {
		if self.by_position.contains_key(&key) {
			Some(Link { key, anchored: true })
		} else if diagonal && self.same_content(key) {
			Some(Link { key, anchored: false })
		} else {
			None
		}
	}

	/// Nearest next link reachable by skipping at most `gap_tolerance` lines
	///
	/// Skipped old lines must be removed lines of the source file and skipped
	/// new lines added lines of the target file.
	fn next_link(&self, link: Link<'d>, gap_tolerance: usize) -> Option<Link<'d>> {
		let (source, old, target, new) = link.key;

		for step in 2..=gap_tolerance + 2 {
			for old_step in 1..step {
				let new_step = step - old_step;
				let bridged = (1..old_step).all(|k| self.removed_lines.contains_key(&(source, old + k)))
					&& (1..new_step).all(|k| self.added_lines.contains_key(&(target, new + k)));
				if !bridged {
					continue;
				}
				let key = (source, old + old_step, target, new + new_step);
				if let Some(next) = self.link_at(key, step == 2) {
					return Some(next);
				}
			}
		}
		None
	}

	/// Identical unpaired line directly before a chain head
	fn previous_link(&self, link: Link<'d>) -> Option<Link<'d>> {
		let (source, old, target, new) = link.key;
		if old <= 1 || new <= 1 {
			return None;
		}
		let key = (source, old - 1, target, new - 1);
		(!self.by_position.contains_key(&key) && self.same_content(key))
			.then_some(Link { key, anchored: false })
	}
}

/// A run of links with its ranges and score
#[derive(Debug, Clone)]
struct Block<'d> {
	links: Vec<Link<'d>>,
	source_file: &'d str,
	target_file: &'d str,
	source: LineRange,
	target: LineRange,
	score: f64,
}

impl<'d> Block<'d> {
	fn new(links: Vec<Link<'d>>, config: &MoveDetectorConfig) -> Self {
		let (source_file, first_old, target_file, first_new) = links[0].key;
		let (_, last_old, _, last_new) = links[links.len() - 1].key;
		let source = LineRange::new(first_old, last_old);
		let target = LineRange::new(first_new, last_new);
		let score = score_block(links.len(), source.len().max(target.len()), config);

		Self {
			links,
			source_file,
			target_file,
			source,
			target,
			score,
		}
	}

	fn matched(&self) -> usize {
		self.links.len()
	}

	fn anchored(&self) -> usize {
		self.links.iter().filter(|l| l.anchored).count()
	}

	/// Deterministic priority: earliest source position, then longest, then
	/// highest score, then earliest target position
	fn priority(&self, other: &Self) -> Ordering {
		(self.source_file, self.source.start)
			.cmp(&(other.source_file, other.source.start))
			.then_with(|| other.matched().cmp(&self.matched()))
			.then_with(|| other.score.partial_cmp(&self.score).unwrap_or(Ordering::Equal))
			.then_with(|| (self.target_file, self.target.start).cmp(&(other.target_file, other.target.start)))
	}
}

/// Score a block from its matched-line count and span, normalized to [0, 1]
///
/// `match_ratio * size_factor`, where the ratio is matched lines over the longer
/// side of the block and the size factor ramps up to 1.0 at
/// `full_confidence_lines` matched lines.
pub fn score_block(matched: usize, span: usize, config: &MoveDetectorConfig) -> f64 {
	if matched == 0 || span == 0 {
		return 0.0;
	}
	let match_ratio = matched as f64 / span as f64;
	let size_factor = (matched as f64 / config.full_confidence_lines as f64).min(1.0);
	(match_ratio * size_factor).clamp(0.0, 1.0)
}

/// Lines already owned by an accepted block
#[derive(Default)]
struct Claims<'d> {
	old: HashSet<LineKey<'d>>,
	new: HashSet<LineKey<'d>>,
}

impl<'d> Claims<'d> {
	fn claim(&mut self, block: &Block<'d>) {
		self.old.extend(block.source.lines().map(|l| (block.source_file, l)));
		self.new.extend(block.target.lines().map(|l| (block.target_file, l)));
	}

	fn is_free(&self, (source, old, target, new): PairKey<'d>) -> bool {
		!self.old.contains(&(source, old)) && !self.new.contains(&(target, new))
	}

	/// Split a chain into the maximal runs that touch no claimed line
	fn unclaimed_runs(&self, chain: &[Link<'d>]) -> Vec<Vec<Link<'d>>> {
		let mut runs = Vec::new();
		let mut current: Vec<Link<'d>> = Vec::new();

		for &link in chain {
			if !self.is_free(link.key) {
				if !current.is_empty() {
					runs.push(std::mem::take(&mut current));
				}
				continue;
			}
			if let Some(previous) = current.last() {
				let (source, prev_old, target, prev_new) = previous.key;
				let gap_free = (prev_old + 1..link.key.1).all(|l| !self.old.contains(&(source, l)))
					&& (prev_new + 1..link.key.3).all(|l| !self.new.contains(&(target, l)));
				if !gap_free {
					runs.push(std::mem::take(&mut current));
				}
			}
			current.push(link);
		}
		if !current.is_empty() {
			runs.push(current);
		}
		runs
	}
}

/// Result of block aggregation
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
	/// Disjoint candidates sorted by source file then source line
	pub candidates: Vec<MoveCandidate>,
	/// Chains examined, including ones later cut or dropped
	pub chains_considered: usize,
	/// Runs dropped for being too short or scoring too low
	pub discarded_blocks: usize,
}

/// Merges adjacent line pairings into disjoint, scored move candidates
pub struct BlockAggregator<'c> {
	config: &'c MoveDetectorConfig,
}

impl<'c> BlockAggregator<'c> {
	pub fn new(config: &'c MoveDetectorConfig) -> Self {
		Self { config }
	}

	pub fn aggregate(&self, matches: &LineMatches) -> Aggregation {
		if matches.is_empty() {
			return Aggregation::default();
		}
		let lookup = PairLookup::new(matches);

		let mut chains: Vec<Block> = (0..lookup.pairs.len())
			.filter(|&index| lookup.is_chain_head(index))
			.map(|head| Block::new(self.build_chain(head, &lookup), self.config))
			.collect();
		chains.sort_by(|a, b| a.priority(b));
		let chains_considered = chains.len();

		let mut claims = Claims::default();
		let mut accepted: Vec<Block> = Vec::new();
		let mut discarded_blocks = 0;

		for chain in &chains {
			for run in claims.unclaimed_runs(&chain.links) {
				let block = Block::new(run, self.config);
				// Only real pairings count toward the minimum size
				if block.anchored() < self.config.min_block_size {
					discarded_blocks += 1;
					continue;
				}
				if block.score < self.config.confidence_threshold {
					debug!(
						"Dropping block {}:{} -> {}:{} (score {:.2} below threshold {:.2})",
						block.source_file,
						block.source,
						block.target_file,
						block.target,
						block.score,
						self.config.confidence_threshold
					);
					discarded_blocks += 1;
					continue;
				}
				claims.claim(&block);
				accepted.push(block);
			}
		}

		accepted.sort_by(|a, b| {
			(a.source_file, a.source.start).cmp(&(b.source_file, b.source.start))
		});

		let candidates: Vec<MoveCandidate> = accepted
			.into_iter()
			.enumerate()
			.map(|(i, block)| MoveCandidate {
				id: MoveId(i),
				source_file: block.source_file.to_string(),
				source_lines: block.source,
				target_file: block.target_file.to_string(),
				target_lines: block.target,
				matched_lines: block.matched(),
				score: block.score,
			})
			.collect();

		debug!(
			"Block aggregation: {} chains, {} candidates, {} discarded",
			chains_considered,
			candidates.len(),
			discarded_blocks
		);

		Aggregation {
			candidates,
			chains_considered,
			discarded_blocks,
		}
	}

	/// Walk back over identical trivial lines, then extend forward
	fn build_chain<'d>(&self, head: usize, lookup: &PairLookup<'d>) -> Vec<Link<'d>> {
		let mut chain = vec![Link {
			key: lookup.pairs[head],
			anchored: true,
		}];
		while let Some(previous) = lookup.previous_link(chain[chain.len() - 1]) {
			chain.push(previous);
		}
		chain.reverse();

		let mut current = chain[chain.len() - 1];
		while let Some(next) = lookup.next_link(current, self.config.gap_tolerance) {
			chain.push(next);
			current = next;
		}
		chain
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::diff::types::{DiffLine, FileDiff, Hunk, ParsedDiff};
	use crate::move_detection::content::{ContentGuard, FileContents};
	use crate::move_detection::matching::LineMatcher;

	/// Diff removing `old` at `old_start` of a.rs and adding `new` at `new_start` of b.rs
	fn aggregate_move(
		config: &MoveDetectorConfig, old: &[&str], old_start: usize, new: &[&str],
		new_start: usize,
	) -> Aggregation {
		let removed: Vec<DiffLine> = old
			.iter()
			.enumerate()
			.map(|(i, c)| DiffLine::removed("a.rs", old_start + i, c))
			.collect();
		let added: Vec<DiffLine> = new
			.iter()
			.enumerate()
			.map(|(i, c)| DiffLine::added("b.rs", new_start + i, c))
			.collect();
		let diff = ParsedDiff::new(vec![
			FileDiff::new("a.rs", vec![Hunk::from_lines(removed)]),
			FileDiff::new("b.rs", vec![Hunk::from_lines(added)]),
		]);

		let mut base = FileContents::new();
		base.insert("a.rs".to_string(), padded(old, old_start));
		let mut head = FileContents::new();
		head.insert("b.rs".to_string(), padded(new, new_start));

		let (index, _) = ContentGuard::new(config).build_index(&diff, &base, &head);
		let matches = LineMatcher::new(config).find_matches(&diff, &index);
		BlockAggregator::new(config).aggregate(&matches)
	}

	fn padded(lines: &[&str], start: usize) -> String {
		let mut text = "filler\n".repeat(start - 1);
		for line in lines {
			text.push_str(line);
			text.push('\n');
		}
		text
	}

	#[test]
	fn test_contiguous_matches_form_single_block() {
		let config = MoveDetectorConfig::default();
		let lines = ["alpha", "beta", "gamma", "delta", "epsilon"];
		let result = aggregate_move(&config, &lines, 10, &lines, 30);

		assert_eq!(result.candidates.len(), 1);
		let candidate = &result.candidates[0];
		assert_eq!(candidate.id, MoveId(0));
		assert_eq!(candidate.source_lines, LineRange::new(10, 14));
		assert_eq!(candidate.target_lines, LineRange::new(30, 34));
		assert_eq!(candidate.matched_lines, 5);
		assert_eq!(candidate.score, 1.0);
	}

	#[test]
	fn test_replaced_interior_line_is_bridged() {
		let config = MoveDetectorConfig::default();
		let result = aggregate_move(
			&config,
			&["alpha", "beta", "gamma", "delta", "epsilon"],
			10,
			&["alpha", "beta", "GAMMA", "delta", "epsilon"],
			30,
		);

		assert_eq!(result.candidates.len(), 1);
		let candidate = &result.candidates[0];
		assert_eq!(candidate.source_lines, LineRange::new(10, 14));
		assert_eq!(candidate.target_lines, LineRange::new(30, 34));
		assert_eq!(candidate.matched_lines, 4);
		assert!(candidate.score < 1.0);
	}

	#[test]
	fn test_inserted_line_is_bridged() {
		let config = MoveDetectorConfig::default();
		let result = aggregate_move(
			&config,
			&["alpha", "beta", "gamma", "delta"],
			1,
			&["alpha", "beta", "inserted", "gamma", "delta"],
			1,
		);

		assert_eq!(result.candidates.len(), 1);
		assert_eq!(result.candidates[0].source_lines, LineRange::new(1, 4));
		assert_eq!(result.candidates[0].target_lines, LineRange::new(1, 5));
	}

	#[test]
	fn test_gap_exceeding_tolerance_splits_block() {
		let config = MoveDetectorConfig::default().with_gap_tolerance(1);
		let result = aggregate_move(
			&config,
			&["a1", "a2", "a3", "x1", "x2", "b1", "b2", "b3"],
			1,
			&["a1", "a2", "a3", "y1", "y2", "b1", "b2", "b3"],
			1,
		);

		assert_eq!(result.candidates.len(), 2);
		assert_eq!(result.candidates[0].source_lines, LineRange::new(1, 3));
		assert_eq!(result.candidates[1].source_lines, LineRange::new(6, 8));
	}

	#[test]
	fn test_small_block_discarded() {
		let config = MoveDetectorConfig::default();
		let result = aggregate_move(&config, &["alpha", "beta"], 1, &["alpha", "beta"], 1);

		assert!(result.candidates.is_empty());
		assert_eq!(result.discarded_blocks, 1);
	}

	#[test]
	fn test_duplicate_target_keeps_one_candidate() {
		let config = MoveDetectorConfig::default();
		let result = aggregate_move(
			&config,
			&["one", "two", "three"],
			1,
			&["one", "two", "three", "between", "one", "two", "three"],
			1,
		);

		assert_eq!(result.candidates.len(), 1);
		assert_eq!(result.candidates[0].target_lines, LineRange::new(1, 3));
	}

	#[test]
	fn test_threshold_discards_low_scores() {
		let config = MoveDetectorConfig {
			confidence_threshold: 0.9,
			..Default::default()
		};
		let result = aggregate_move(&config, &["one", "two", "three"], 1, &["one", "two", "three"], 1);

		// 3 of 5 full-confidence lines
		assert!(result.candidates.is_empty());
		assert_eq!(result.discarded_blocks, 1);
	}

	#[test]
	fn test_score_block() {
		let config = MoveDetectorConfig::default();
		assert_eq!(score_block(5, 5, &config), 1.0);
		assert_eq!(score_block(10, 10, &config), 1.0);
		assert!((score_block(4, 5, &config) - 0.64).abs() < 1e-9);
		assert!((score_block(3, 3, &config) - 0.6).abs() < 1e-9);
		assert_eq!(score_block(0, 0, &config), 0.0);
	}

	#[test]
	fn test_aggregation_is_deterministic() {
		let config = MoveDetectorConfig::default();
		let old = ["one", "two", "three", "four", "one", "two", "three"];
		let new = ["one", "two", "three", "x", "one", "two", "three", "four"];
		let first = aggregate_move(&config, &old, 1, &new, 1);
		let second = aggregate_move(&config, &old, 1, &new, 1);

		assert_eq!(first.candidates, second.candidates);
	}
}
