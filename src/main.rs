//! Tailmark - invisible tail watermarks and numbered batch copies.
//!
//! Marks media files with an obfuscated text frame at their end and builds
//! numbered, individually marked copies of a folder.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tailmark::batch::{
    directory_stats, inspect_directory, stamp_directory, strip_directory, BatchEvent,
    BatchOrchestrator, BatchRequest, LogLevel, NullSink,
};
use tailmark::codec;
use tailmark::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tailmark")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Invisible tail watermarks for media files",
    long_about = "Embeds, detects and removes obfuscated text frames at the end of media files, and builds numbered, individually watermarked copies of a folder."
)]
struct Cli {
    /// JSON pipeline configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create numbered, watermarked copies of a folder
    Batch {
        /// Folder to copy
        source: PathBuf,

        /// Number of copies
        #[arg(long, short = 'n')]
        copies: usize,

        /// Watermark text; a trailing number sets the first order number
        #[arg(long)]
        base_text: String,

        /// Swap photo N with photo N+10 in each copy
        #[arg(long)]
        swap: bool,

        /// Draw visible text on one photo in each copy
        #[arg(long)]
        visible: bool,

        /// Replace each copy with an uncompressed zip
        #[arg(long)]
        zip: bool,

        /// Visible text (default: the order number)
        #[arg(long, requires = "visible")]
        watermark_text: Option<String>,

        /// Photo to draw on (default: the order number)
        #[arg(long, requires = "visible")]
        photo_number: Option<u32>,
    },

    /// Embed a watermark into every supported file of a folder
    Stamp {
        /// Folder to mark
        dir: PathBuf,

        /// Text to embed
        #[arg(long)]
        text: String,
    },

    /// Print the watermark of every supported file of a folder
    Inspect {
        /// Folder to scan
        dir: PathBuf,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove watermarks from every image and video of a folder
    Strip {
        /// Folder to clean
        dir: PathBuf,
    },

    /// Count supported files in a folder
    Stats {
        /// Folder to scan
        dir: PathBuf,

        /// Print stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Obfuscate text with the watermark codec
    Encode {
        text: String,
    },

    /// Reverse the watermark codec
    Decode {
        text: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Batch {
            source,
            copies,
            base_text,
            swap,
            visible,
            zip,
            watermark_text,
            photo_number,
        } => {
            let mut request = BatchRequest::new(resolve_source(&source)?, copies, base_text);
            request.add_swap = swap;
            request.add_watermark = visible;
            request.create_zip = zip;
            request.watermark_text = watermark_text;
            request.photo_number = photo_number;
            cmd_batch(config, &request)
        }

        Commands::Stamp { dir, text } => cmd_stamp(&dir, &text),

        Commands::Inspect { dir, json } => cmd_inspect(&dir, json),

        Commands::Strip { dir } => cmd_strip(&dir),

        Commands::Stats { dir, json } => cmd_stats(&dir, json),

        Commands::Encode { text } => {
            println!("{}", codec::encode(&text));
            Ok(())
        }

        Commands::Decode { text } => {
            println!("{}", codec::decode(&text));
            Ok(())
        }
    }
}

/// Absolute form of a source folder, so `.` and `..` get a real name.
fn resolve_source(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("resolving source folder {}", path.display()))
}

/// Print log lines to stdout and progress to stderr.
fn console_sink(event: BatchEvent) {
    match event {
        BatchEvent::Log(line) => match line.level {
            LogLevel::Info => println!("{}", line.message),
            LogLevel::Warn => println!("warning: {}", line.message),
            LogLevel::Error => println!("error: {}", line.message),
        },
        BatchEvent::Progress(report) => {
            eprint!("\r{:>5.1}%", report.fraction * 100.0);
            if report.is_complete() {
                eprintln!();
            }
            let _ = std::io::stderr().flush();
        }
    }
}

fn cmd_batch(config: PipelineConfig, request: &BatchRequest) -> Result<()> {
    let orchestrator = BatchOrchestrator::new(config)?;
    let report = orchestrator
        .run(request, &console_sink)
        .with_context(|| format!("batch over {}", request.source_folder.display()))?;

    println!();
    println!("Batch Summary");
    println!("=============");
    println!("Copies folder:    {}", report.copies_root.display());
    for copy in &report.copies {
        println!(
            "  {}  marked {:>4}  dup {:>4}  failed {:>4}  {}",
            copy.order_number,
            copy.marks.added,
            copy.marks.duplicates,
            copy.marks.failed,
            copy.output.display()
        );
    }

    Ok(())
}

fn cmd_stamp(dir: &Path, text: &str) -> Result<()> {
    let stats = stamp_directory(dir, text, &console_sink)
        .with_context(|| format!("stamping {}", dir.display()))?;
    println!(
        "Added {}, already marked {}, failed {}",
        stats.added, stats.duplicates, stats.failed
    );
    Ok(())
}

fn cmd_inspect(dir: &Path, json: bool) -> Result<()> {
    if json {
        let findings = inspect_directory(dir, &NullSink)?;
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        inspect_directory(dir, &console_sink)
            .with_context(|| format!("inspecting {}", dir.display()))?;
    }
    Ok(())
}

fn cmd_strip(dir: &Path) -> Result<()> {
    let stats = strip_directory(dir, &console_sink)
        .with_context(|| format!("stripping {}", dir.display()))?;
    println!(
        "Removed {}, without watermark {}, failed {}",
        stats.removed, stats.absent, stats.failed
    );
    Ok(())
}

fn cmd_stats(dir: &Path, json: bool) -> Result<()> {
    let stats = directory_stats(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Folder Statistics");
    println!("=================");
    println!("Supported files:  {}", stats.total_files);
    println!("  Images:         {}", stats.images);
    println!("  Videos:         {}", stats.videos);
    println!("  Text:           {}", stats.texts);
    println!("Total size:       {}", stats.total_size_display());

    Ok(())
}
