//! Pluggable edit-script algorithms used to re-diff move candidates

use crate::move_detection::error::MoveDetectionError;

/// One step of an edit script, indexing into the old and new line slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
	Equal { old_index: usize, new_index: usize },
	Delete { old_index: usize },
	Insert { new_index: usize },
}

/// Computes a minimal edit script between two line sequences
///
/// Implementations must be deterministic. A returned script is checked with
/// [`validate_edit_script`] before use; errors and invalid scripts only drop the
/// candidate being re-diffed.
pub trait EditScriptAlgorithm: Send + Sync {
	fn name(&self) -> &'static str;

	fn edit_script(&self, old: &[&str], new: &[&str]) -> Result<Vec<Edit>, MoveDetectionError>;
}

/// Myers' O(ND) shortest edit script
#[derive(Debug, Clone, Copy, Default)]
pub struct MyersDiff;

impl MyersDiff {
	/// Furthest-reaching x per diagonal, recorded before each edit distance d
	fn shortest_edit_trace(old: &[&str], new: &[&str]) -> Vec<Vec<isize>> {
		let (n, m) = (old.len() as isize, new.len() as isize);
		let offset = (n + m) as usize;
		let mut v = vec![0isize; 2 * offset + 2];
		let mut trace = Vec::new();

		for d in 0..=(n + m) {
			trace.push(v.clone());

			for k in (-d..=d).step_by(2) {
				let idx = (offset as isize + k) as usize;
				let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
					v[idx + 1]
				} else {
					v[idx - 1] + 1
				};
				let mut y = x - k;
				while x < n && y < m && old[x as usize] == new[y as usize] {
					x += 1;
					y += 1;
				}
				v[idx] = x;

				if x >= n && y >= m {
					return trace;
				}
			}
		}

		trace
	}

	fn backtrack(old: &[&str], new: &[&str]) -> Vec<Edit> {
		let (mut x, mut y) = (old.len() as isize, new.len() as isize);
		let offset = x + y;
		let trace = Self::shortest_edit_trace(old, new);
		let mut edits = Vec::with_capacity(old.len() + new.len());

		for (d, v) in trace.iter().enumerate().rev() {
			let d = d as isize;
			let k = x - y;
			let prev_k = if k == -d || (k != d && v[(offset + k - 1) as usize] < v[(offset + k + 1) as usize]) {
				k + 1
			} else {
				k - 1
			};
			let prev_x = v[(offset + prev_k) as usize];
			let prev_y = prev_x - prev_k;

			while x > prev_x && y > prev_y {
				x -= 1;
				y -= 1;
				edits.push(Edit::Equal {
					old_index: x as usize,
					new_index: y as usize,
				});
			}

			if d > 0 {
				if x == prev_x {
					edits.push(Edit::Insert {
						new_index: prev_y as usize,
					});
				} else {
					edits.push(Edit::Delete {
						old_index: prev_x as usize,
					});
				}
			}

			x = prev_x;
			y = prev_y;
		}

		edits.reverse();
		edits
	}
}

impl EditScriptAlgorithm for MyersDiff {
	fn name(&self) -> &'static str {
		"myers"
	}

	fn edit_script(&self, old: &[&str], new: &[&str]) -> Result<Vec<Edit>, MoveDetectionError> {
		if old.is_empty() && new.is_empty() {
			return Ok(Vec::new());
		}
		Ok(Self::backtrack(old, new))
	}
}

/// Check that a script walks both sequences exactly once, in order, and only
/// marks equal lines as `Equal`
pub fn validate_edit_script(
	algorithm: &str, edits: &[Edit], old: &[&str], new: &[&str],
) -> Result<(), MoveDetectionError> {
	let (mut old_cursor, mut new_cursor) = (0, 0);

	for (position, edit) in edits.iter().enumerate() {
		let (expected_old, expected_new) = match *edit {
			Edit::Equal { old_index, new_index } => (Some(old_index), Some(new_index)),
			Edit::Delete { old_index } => (Some(old_index), None),
			Edit::Insert { new_index } => (None, Some(new_index)),
		};

		if let Some(index) = expected_old {
			if index != old_cursor || index >= old.len() {
				return Err(MoveDetectionError::invalid_edit_script(
					algorithm,
					&format!("edit {} touches old line {} out of order", position, index),
				));
			}
			old_cursor += 1;
		}
		if let Some(index) = expected_new {
			if index != new_cursor || index >= new.len() {
				return Err(MoveDetectionError::invalid_edit_script(
					algorithm,
					&format!("edit {} touches new line {} out of order", position, index),
				));
			}
			new_cursor += 1;
		}
		if let Edit::Equal { old_index, new_index } = *edit {
			if old[old_index] != new[new_index] {
				return Err(MoveDetectionError::invalid_edit_script(
					algorithm,
					&format!("edit {} marks differing lines as equal", position),
				));
			}
		}
	}

	if old_cursor != old.len() || new_cursor != new.len() {
		return Err(MoveDetectionError::invalid_edit_script(
			algorithm,
			&format!(
				"script covers {}/{} old and {}/{} new lines",
				old_cursor,
				old.len(),
				new_cursor,
				new.len()
			),
		));
	}

	Ok(())
}
