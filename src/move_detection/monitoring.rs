use serde::{Deserialize, Serialize};

/// Statistics about one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
	pub files_in_diff: usize,
	pub files_eligible: usize,
	pub files_skipped: usize,
	pub removed_lines: usize,
	pub added_lines: usize,
	pub line_pairings: usize,
	pub noisy_lines: usize,
	pub chains_considered: usize,
	pub blocks_discarded: usize,
	pub candidates_dropped: usize,
	pub moves_detected: usize,
	pub score_sum: f64,
	pub average_score: f32,
	/// Whether the run fell back to face-value classification
	pub used_fallback: bool,
}

impl DetectionStats {
	pub fn new() -> Self {
		Self {
			files_in_diff: 0,
			files_eligible: 0,
			files_skipped: 0,
			removed_lines: 0,
			added_lines: 0,
			line_pairings: 0,
			noisy_lines: 0,
			chains_considered: 0,
			blocks_discarded: 0,
			candidates_dropped: 0,
			moves_detected: 0,
			score_sum: 0.0,
			average_score: 0.0,
			used_fallback: false,
		}
	}

	/// Record an accepted move with its score
	pub fn record_move_detected(&mut self, score: f64) {
		self.moves_detected += 1;
		self.score_sum += score;
		self.average_score = (self.score_sum / self.moves_detected as f64) as f32;
	}

	/// Pairings per removed or added line of the eligible files
	pub fn pairing_density(&self) -> f32 {
		let lines = self.removed_lines + self.added_lines;
		if lines == 0 {
			return 0.0;
		}
		self.line_pairings as f32 / lines as f32
	}
}

impl Default for DetectionStats {
	fn default() -> Self {
		Self::new()
	}
}
