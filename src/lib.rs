pub mod diff;
mod error;
pub mod input;
pub mod move_detection;

pub use diff::{parse_unified_diff, render_unified, DiffLine, FileDiff, Hunk, LineType, ParsedDiff};
pub use error::{EffectiveDiffError, Result};
pub use input::{load_checkout, read_config, read_diff};
pub use move_detection::{
	ClassifiedDiffLine, ClassifiedFile, ClassifiedHunk, DetectionOutcome, Edit, EditScriptAlgorithm,
	FileContents, LineClassification, LineRange, MoveCandidate, MoveDetectionError, MoveDetector,
	MoveDetectorConfig, MoveId, MoveReport, MyersDiff,
};
