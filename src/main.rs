use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use score_features::{ArtifactFormat, CorpusPipeline, InstrumentDecoder, PipelineConfig};

#[derive(Parser)]
#[command(name = "score-features")]
#[command(about = "Turn a directory of MIDI files into per-instrument feature arrays", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (-q warnings, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, encode and persist features for every instrument in a corpus
    Encode(EncodeArgs),
    /// Map normalized values back to tokens using a previous run's artifacts
    Decode(DecodeArgs),
}

#[derive(Args)]
struct EncodeArgs {
    /// Directory containing the MIDI files
    input_dir: Option<PathBuf>,

    /// JSON config file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write artifacts (default: the input directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Artifact format
    #[arg(short, long, value_enum)]
    format: Option<ArtifactFormat>,

    /// Recognized file extension (repeatable, default: mid and midi)
    #[arg(short, long = "extension")]
    extensions: Vec<String>,

    /// Lower bound of the feature range
    #[arg(long, allow_hyphen_values = true)]
    range_min: Option<f64>,

    /// Upper bound of the feature range
    #[arg(long, allow_hyphen_values = true)]
    range_max: Option<f64>,

    /// Quantization grid in divisions per quarter note (0 disables)
    #[arg(long)]
    quantize: Option<u32>,

    /// Extract files in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct DecodeArgs {
    /// Directory holding the artifacts and manifest.json
    artifact_dir: PathBuf,

    /// Instrument whose mapping to use
    #[arg(short, long)]
    instrument: String,

    /// Normalized values to decode
    #[arg(required = true, allow_hyphen_values = true)]
    values: Vec<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = args.input_dir {
        config.input_dir = dir;
    } else if args.config.is_none() {
        anyhow::bail!("No input directory given (pass INPUT_DIR or --config)");
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions;
    }
    if let Some(min) = args.range_min {
        config.range_min = min;
    }
    if let Some(max) = args.range_max {
        config.range_max = max;
    }
    if let Some(divisions) = args.quantize {
        config.quantize_divisions = divisions;
    }
    if args.parallel {
        config.parallel = true;
    }

    if !config.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", config.input_dir.display());
    }

    let pipeline = CorpusPipeline::new(config)?;
    let manifest = pipeline.run().context("Corpus pipeline failed")?;

    eprintln!(
        "Encoded {} instruments from {} files ({} failed, {} elements skipped) into {}",
        manifest.instruments.len(),
        manifest.files_found,
        manifest.failed_files.len(),
        manifest.skipped_elements,
        pipeline.config().output_dir().display()
    );

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let decoder = InstrumentDecoder::load(&args.artifact_dir, &args.instrument)
        .with_context(|| format!("Failed to load artifacts for {}", args.instrument))?;

    let tokens = decoder.decode_values(&args.values)?;
    for token in tokens {
        println!("{}", token);
    }

    Ok(())
}
