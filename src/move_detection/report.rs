use crate::move_detection::rediff::RediffedMove;
use crate::move_detection::types::{MoveCandidate, MoveId};
use serde::{Deserialize, Serialize};

/// One finalized move with the edits found inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDetail {
	#[serde(flatten)]
	pub candidate: MoveCandidate,
	/// Target lines classified `changedInMove`
	pub changed_in_move: usize,
	/// Source lines the re-diff found no counterpart for
	pub removed_in_move: usize,
}

impl MoveDetail {
	/// Lines inside the move that still need review
	pub fn effective_diff_lines(&self) -> usize {
		self.changed_in_move + self.removed_in_move
	}
}

/// All accepted moves, sorted by source file then source line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
	pub moves_detected: usize,
	/// Matched lines summed over every move
	pub total_lines_moved: usize,
	/// Changed and dropped lines summed over every move
	pub total_lines_effectively_changed: usize,
	pub moves: Vec<MoveDetail>,
}

impl MoveReport {
	/// Finalize surviving moves, assigning sequential identifiers in report order
	pub fn finalize(mut rediffed: Vec<RediffedMove>) -> (Self, Vec<RediffedMove>) {
		rediffed.sort_by(|a, b| {
			(&a.candidate.source_file, a.candidate.source_lines.start)
				.cmp(&(&b.candidate.source_file, b.candidate.source_lines.start))
		});
		for (i, m) in rediffed.iter_mut().enumerate() {
			m.candidate.id = MoveId(i);
		}

		let moves: Vec<MoveDetail> = rediffed
			.iter()
			.map(|m| MoveDetail {
				candidate: m.candidate.clone(),
				changed_in_move: m.changed_lines.len(),
				removed_in_move: m.removed_in_move,
			})
			.collect();

		let report = Self {
			moves_detected: moves.len(),
			total_lines_moved: moves.iter().map(|m| m.candidate.matched_lines).sum(),
			total_lines_effectively_changed: moves.iter().map(MoveDetail::effective_diff_lines).sum(),
			moves,
		};
		(report, rediffed)
	}

	pub fn get(&self, id: MoveId) -> Option<&MoveDetail> {
		self.moves.get(id.0).filter(|m| m.candidate.id == id)
	}

	pub fn is_empty(&self) -> bool {
		self.moves.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::move_detection::types::LineRange;
	use std::collections::BTreeSet;

	fn rediffed(source_file: &str, start: usize, changed: &[usize], removed: usize) -> RediffedMove {
		RediffedMove {
			candidate: MoveCandidate {
				id: MoveId(7),
				source_file: source_file.to_string(),
				source_lines: LineRange::new(start, start + 4),
				target_file: "target.rs".to_string(),
				target_lines: LineRange::new(1, 5),
				matched_lines: 5 - changed.len(),
				score: 0.8,
			},
			changed_lines: changed.iter().copied().collect::<BTreeSet<_>>(),
			removed_in_move: removed,
		}
	}

	#[test]
	fn test_finalize_sorts_and_renumbers() {
		let (report, moves) = MoveReport::finalize(vec![
			rediffed("b.rs", 1, &[], 0),
			rediffed("a.rs", 20, &[3], 1),
			rediffed("a.rs", 2, &[], 0),
		]);

		assert_eq!(report.moves_detected, 3);
		let order: Vec<(&str, usize)> = report
			.moves
			.iter()
			.map(|m| (m.candidate.source_file.as_str(), m.candidate.source_lines.start))
			.collect();
		assert_eq!(order, vec![("a.rs", 2), ("a.rs", 20), ("b.rs", 1)]);
		assert_eq!(report.moves[1].candidate.id, MoveId(1));
		assert_eq!(moves[1].candidate.id, MoveId(1));
		assert_eq!(report.total_lines_moved, 14);
		assert_eq!(report.total_lines_effectively_changed, 2);
	}

	#[test]
	fn test_get_by_id() {
		let (report, _) = MoveReport::finalize(vec![rediffed("a.rs", 1, &[], 0)]);
		assert!(report.get(MoveId(0)).is_some());
		assert!(report.get(MoveId(1)).is_none());
	}

	#[test]
	fn test_report_serializes_flat() {
		let (report, _) = MoveReport::finalize(vec![rediffed("a.rs", 1, &[2], 0)]);
		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json["moves"][0]["source_file"], "a.rs");
		assert_eq!(json["moves"][0]["changed_in_move"], 1);
		assert_eq!(json["moves"][0]["id"], 0);
	}
}
