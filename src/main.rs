use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lyric_align::config::{ANCHOR_LINES, DEAD_ZONE_MS, FUZZY_LOOKAHEAD};
use lyric_align::metadata::strip_metadata;
use lyric_align::progress::{format_duration, Progress};
use lyric_align::safety::{validate_output_dir, validate_output_path};
use lyric_align::{align_lyrics, AlignConfig, AlignOutcome, BatchStats, MetadataKeywords};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Transcript extensions picked up by batch mode
const TRANSCRIPT_EXTENSIONS: &[&str] = &["lrc", "yrc", "qrc", "txt"];

#[derive(Parser)]
#[command(name = "lyric-align")]
#[command(about = "Re-time candidate lyric transcripts against a trusted reference")]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Align one candidate transcript against a reference
    Align(AlignArgs),

    /// Print a transcript with its metadata header and footer removed
    Strip(StripArgs),

    /// Align every candidate in a directory against the same-named reference
    Batch(BatchArgs),
}

#[derive(Parser, Debug, Clone)]
struct TuningArgs {
    /// JSON array of metadata keywords (default: built-in list)
    #[arg(long)]
    keywords: Option<PathBuf>,

    /// Offsets below this many milliseconds are ignored
    #[arg(long, default_value_t = DEAD_ZONE_MS)]
    dead_zone_ms: i64,

    /// Leading reference lines that must match to confirm an anchor
    #[arg(long, default_value_t = ANCHOR_LINES)]
    anchor_lines: usize,

    /// Candidate lines the fuzzy matcher may join into one reference line
    #[arg(long, default_value_t = FUZZY_LOOKAHEAD)]
    lookahead: usize,
}

impl TuningArgs {
    fn to_config(&self) -> Result<AlignConfig> {
        let keywords = match &self.keywords {
            Some(path) => MetadataKeywords::from_json_file(path)?,
            None => MetadataKeywords::default(),
        };
        debug!(keywords = keywords.len(), "Loaded metadata keywords");

        Ok(AlignConfig::default()
            .with_keywords(keywords)
            .with_dead_zone_ms(self.dead_zone_ms)
            .with_anchor_lines(self.anchor_lines)
            .with_fuzzy_lookahead(self.lookahead))
    }
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Candidate transcript to re-time
    candidate: PathBuf,

    /// Trusted reference transcript
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the alignment report as JSON to stderr
    #[arg(long)]
    report: bool,

    /// Fail instead of passing an unmatched candidate through
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Parser, Debug)]
struct StripArgs {
    input: PathBuf,

    /// JSON array of metadata keywords (default: built-in list)
    #[arg(long)]
    keywords: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    candidates: PathBuf,

    references: PathBuf,

    output: PathBuf,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Hide the progress bar and log progress lines instead
    #[arg(long)]
    log_only: bool,

    /// Write aggregate stats as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    #[command(flatten)]
    tuning: TuningArgs,
}

fn read_transcript(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript {}", path.display()))
}

fn cmd_align(args: AlignArgs) -> Result<()> {
    let config = args.tuning.to_config()?;
    let candidate = read_transcript(&args.candidate)?;
    let reference = args.reference.as_deref().map(read_transcript).transpose()?;

    if let Some(output) = &args.output {
        let mut sources = vec![args.candidate.as_path()];
        if let Some(reference) = &args.reference {
            sources.push(reference.as_path());
        }
        validate_output_path(output, &sources)?;
    }

    let outcome = align_lyrics(&candidate, reference.as_deref(), &config);
    match &outcome {
        AlignOutcome::Rejected => {
            bail!("Candidate transcript {} is empty", args.candidate.display())
        }
        AlignOutcome::Passthrough(reason) => {
            info!(?reason, "Nothing to align against, keeping candidate as-is");
        }
        AlignOutcome::Unmatched if args.strict => {
            bail!("Candidate does not match the reference content")
        }
        AlignOutcome::Unmatched => {
            warn!("Candidate does not match the reference content, keeping it unverified");
        }
        AlignOutcome::Aligned { report, .. } => {
            info!(
                offset_ms = report.applied_offset_ms,
                mode = ?report.match_mode,
                dropped = report.dropped_lines,
                "Aligned candidate"
            );
            if args.report {
                eprintln!("{}", serde_json::to_string_pretty(report)?);
            }
        }
    }

    let text = match outcome {
        AlignOutcome::Aligned { text, .. } => text,
        _ => candidate,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_strip(args: StripArgs) -> Result<()> {
    let keywords = match &args.keywords {
        Some(path) => MetadataKeywords::from_json_file(path)?,
        None => MetadataKeywords::default(),
    };
    let text = read_transcript(&args.input)?;
    println!("{}", strip_metadata(&text, &keywords));
    Ok(())
}

fn is_transcript(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TRANSCRIPT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

fn list_transcripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if is_transcript(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}

/// Align one candidate file and write its output; returns the outcome for stats.
fn process_pair(
    candidate_path: &Path,
    reference_path: Option<&PathBuf>,
    output_dir: &Path,
    config: &AlignConfig,
) -> Result<AlignOutcome> {
    let candidate = read_transcript(candidate_path)?;
    let reference = reference_path.map(|p| read_transcript(p)).transpose()?;
    let outcome = align_lyrics(&candidate, reference.as_deref(), config);

    let text = match &outcome {
        AlignOutcome::Rejected => return Ok(outcome),
        AlignOutcome::Aligned { text, .. } => text.as_str(),
        AlignOutcome::Passthrough(_) | AlignOutcome::Unmatched => candidate.as_str(),
    };

    let Some(name) = candidate_path.file_name() else {
        bail!("Candidate path {} has no file name", candidate_path.display());
    };
    let output = output_dir.join(name);
    fs::write(&output, text).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(outcome)
}

fn cmd_batch(args: BatchArgs) -> Result<()> {
    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    validate_output_dir(&args.output, &[&args.candidates, &args.references])?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    let config = args.tuning.to_config()?;
    let start = Instant::now();

    let candidates = list_transcripts(&args.candidates)?;
    let references: FxHashMap<String, PathBuf> = list_transcripts(&args.references)?
        .into_iter()
        .filter_map(|p| file_stem(&p).map(|stem| (stem, p)))
        .collect();
    println!(
        "Found {} candidates, {} references",
        candidates.len(),
        references.len()
    );

    let progress = Progress::new("Aligning", candidates.len() as u64, args.log_only);
    let results: Vec<Result<AlignOutcome>> = candidates
        .par_iter()
        .map(|candidate| {
            let reference = file_stem(candidate).and_then(|stem| references.get(&stem));
            let result = process_pair(candidate, reference, &args.output, &config);
            if let Err(e) = &result {
                warn!("{}: {:#}", candidate.display(), e);
            }
            progress.inc();
            result
        })
        .collect();
    progress.finish("Aligned");

    let mut stats = BatchStats::default();
    for result in &results {
        match result {
            Ok(outcome) => stats.record(outcome),
            Err(_) => stats.record_io_error(),
        }
    }
    stats.elapsed_seconds = start.elapsed().as_secs_f64();

    if args.log_only {
        stats.log_phase("batch");
    }
    if let Some(path) = &args.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    println!("\n{:=<60}", "");
    println!("Alignment complete!");
    println!("  Pairs: {}", stats.total_pairs);
    println!("  Shifted: {}", stats.shifted);
    println!("  Already aligned: {}", stats.already_aligned);
    println!("  Unmatched: {}", stats.unmatched);
    println!("  Passthrough: {}", stats.passthrough);
    println!("  Errors: {}", stats.io_errors);
    println!("  Match rate: {:.1}%", stats.match_rate());
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Align(args) => cmd_align(args),
        Command::Strip(args) => cmd_strip(args),
        Command::Batch(args) => cmd_batch(args),
    }
}
