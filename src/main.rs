use anyhow::Context;
use clap::{Parser, ValueEnum};
use effective_diff::input::{base_paths, head_paths};
use effective_diff::{load_checkout, read_config, read_diff, render_unified, MoveDetector, MoveDetectorConfig};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
	Text,
	Json,
}

#[derive(Parser)]
#[command(name = "effective-diff")]
#[command(about = "Detects moved code in a unified diff and prints the effective diff")]
struct Cli {
	/// Unified diff to analyze
	#[arg(short, long)]
	diff: PathBuf,

	/// Checkout of the base revision
	#[arg(long)]
	old: PathBuf,

	/// Checkout of the head revision
	#[arg(long)]
	new: PathBuf,

	/// Output format
	#[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
	format: OutputFormat,

	/// Move detection configuration (JSON)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Minimum matched lines for a move
	#[arg(long)]
	min_block_size: Option<usize>,

	/// Unmatched lines a move may bridge
	#[arg(long)]
	gap_tolerance: Option<usize>,

	/// Minimum move score (0.0 to 1.0)
	#[arg(long)]
	threshold: Option<f64>,

	/// Match lines regardless of indentation
	#[arg(long)]
	ignore_indentation: bool,

	/// Skip move detection and classify at face value
	#[arg(long)]
	no_moves: bool,

	/// Enable verbose logging
	#[arg(short, long)]
	verbose: bool,
}

impl Cli {
	fn detector_config(&self) -> anyhow::Result<MoveDetectorConfig> {
		let mut config = match &self.config {
			Some(path) => read_config(path).with_context(|| format!("reading config {}", path.display()))?,
			None => MoveDetectorConfig::default(),
		};

		if let Some(min_block_size) = self.min_block_size {
			config.min_block_size = min_block_size;
		}
		if let Some(gap_tolerance) = self.gap_tolerance {
			config.gap_tolerance = gap_tolerance;
		}
		if let Some(threshold) = self.threshold {
			config.confidence_threshold = threshold;
		}
		if self.ignore_indentation {
			config.ignore_indentation = true;
		}
		if self.no_moves {
			config.enabled = false;
		}
		Ok(config)
	}
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	// Initialize tracing
	let level = if cli.verbose {
		Level::DEBUG
	} else {
		Level::INFO
	};
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.init();

	let config = cli.detector_config()?;
	let detector = MoveDetector::new(config)?;

	let diff = read_diff(&cli.diff).with_context(|| format!("reading diff {}", cli.diff.display()))?;
	info!(
		"Analyzing {} files, {} hunks from {:?}",
		diff.files.len(),
		diff.hunk_count(),
		cli.diff
	);

	let base = load_checkout(&cli.old, base_paths(&diff))
		.with_context(|| format!("reading base checkout {}", cli.old.display()))?;
	let head = load_checkout(&cli.new, head_paths(&diff))
		.with_context(|| format!("reading head checkout {}", cli.new.display()))?;

	let outcome = detector.detect(&diff, &base, &head);
	info!(
		"Detected {} moves covering {} lines ({} files skipped)",
		outcome.move_report.moves_detected,
		outcome.move_report.total_lines_moved,
		outcome.skipped.len()
	);

	match cli.format {
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&outcome)?);
		}
		OutputFormat::Text => {
			for detail in &outcome.move_report.moves {
				let candidate = &detail.candidate;
				println!(
					"# {}: {}:{} -> {}:{} (score {:.2}, {} changed in move)",
					candidate.id,
					candidate.source_file,
					candidate.source_lines,
					candidate.target_file,
					candidate.target_lines,
					candidate.score,
					detail.changed_in_move
				);
			}
			for skipped in &outcome.skipped {
				println!("# skipped {}: {}", skipped.path, skipped.reason);
			}
			print!("{}", render_unified(&outcome.effective_diff));
		}
	}

	Ok(())
}
