//! Move detection over a parsed diff
//!
//! Detects blocks of code that were removed in one place and added in another,
//! classifies every diff line accordingly and rebuilds an effective diff that
//! hides pure relocations.
//!
//! # Module Organization
//!
//! - [`config`] - Configuration structures and validation
//! - [`content`] - Content guards over the base and head revisions
//! - [`matching`] - Line normalization and hashed line matching
//! - [`blocks`] - Block aggregation and scoring
//! - [`edit_script`] - Pluggable edit-script algorithms (Myers by default)
//! - [`rediff`] - Re-diffing of move candidates
//! - [`reconstruct`] - Line classification and effective diff reconstruction
//! - [`report`] - Finalized move report
//! - [`monitoring`] - Run statistics
//! - [`detector`] - Main MoveDetector implementation
//! - [`error`] - Move detection specific error types
//! - [`types`] - Values shared by the stages

pub mod blocks;
pub mod config;
pub mod content;
pub mod detector;
pub mod edit_script;
pub mod error;
pub mod matching;
pub mod monitoring;
pub mod reconstruct;
pub mod rediff;
pub mod report;
pub mod types;

// Re-export main types for convenience
pub use config::MoveDetectorConfig;
pub use content::{FileContents, SkippedFile};
pub use detector::{DetectionOutcome, MoveDetector};
pub use edit_script::{Edit, EditScriptAlgorithm, MyersDiff};
pub use error::MoveDetectionError;
pub use monitoring::DetectionStats;
pub use report::{MoveDetail, MoveReport};
pub use types::{
	ClassifiedDiffLine, ClassifiedFile, ClassifiedHunk, LineClassification, LineRange,
	MoveCandidate, MoveId, Revision,
};
