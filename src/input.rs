//! Reading diffs, configuration and revision checkouts from disk

use crate::diff::{parse_unified_diff, ParsedDiff};
use crate::error::{EffectiveDiffError, Result};
use crate::move_detection::{FileContents, MoveDetectorConfig};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read and parse a unified diff file
pub fn read_diff(path: &Path) -> Result<ParsedDiff> {
	let text = fs::read_to_string(path)?;
	Ok(parse_unified_diff(&text)?)
}

/// Read a JSON move detection configuration; absent fields take their defaults
pub fn read_config(path: &Path) -> Result<MoveDetectorConfig> {
	let text = fs::read_to_string(path)?;
	let config: MoveDetectorConfig = serde_json::from_str(&text)?;
	config.validate()?;
	Ok(config)
}

/// Read every listed file of a checkout
///
/// Files missing from the checkout are left out, as are files that are not
/// valid UTF-8. The content guard later reports them as unavailable.
pub fn load_checkout<I>(root: &Path, paths: I) -> Result<FileContents>
where
	I: IntoIterator<Item = String>,
{
	if !root.is_dir() {
		return Err(EffectiveDiffError::invalid_path(&root.display().to_string()));
	}

	let mut contents = FileContents::new();
	for path in paths {
		let full_path = root.join(&path);
		if !full_path.is_file() {
			debug!("No file at {:?}", full_path);
			continue;
		}
		match String::from_utf8(fs::read(&full_path)?) {
			Ok(text) => {
				contents.insert(path, text);
			}
			Err(_) => warn!("Leaving out {:?}: not valid UTF-8", full_path),
		}
	}
	Ok(contents)
}

/// Paths whose base revision a diff needs, under their pre-rename names
pub fn base_paths(diff: &ParsedDiff) -> impl Iterator<Item = String> + '_ {
	diff.files.iter().map(|f| f.old_content_path().to_string())
}

/// Paths whose head revision a diff needs
pub fn head_paths(diff: &ParsedDiff) -> impl Iterator<Item = String> + '_ {
	diff.files.iter().map(|f| f.path.clone())
}
