//! CLI tool for generating PowerPoint decks from JSON slide descriptions.

use anyhow::{Context, Result};
use clap::Parser;
use slidegen_chart::PlottersChart;
use slidegen_core::{ChartFormat, DeckInterpreter, DeckOptions, Error};
use slidegen_pptx::PptxDeck;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Generate a PowerPoint deck from a JSON slide description.
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration with a top-level "presentation" array
    config: PathBuf,

    /// Output deck (.pptx)
    #[arg(short, long, default_value = "presentation.pptx")]
    output: PathBuf,

    /// Template deck (.pptx or .potx) providing layouts and styling
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Keep generated plot images in this directory
    #[arg(long)]
    chart_dir: Option<PathBuf>,

    /// Image format for generated plots (svg or png)
    #[arg(long, default_value_t = ChartFormat::Svg)]
    chart_format: ChartFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    check_output(&args.output)?;

    let mut deck = match &args.template {
        Some(path) => PptxDeck::open_template(path)
            .with_context(|| format!("Failed to load template {}", path.display()))?,
        None => PptxDeck::builtin()?,
    };

    let mut options = DeckOptions::new(&args.output).with_chart_format(args.chart_format);
    if let Some(dir) = &args.chart_dir {
        options = options.with_chart_dir(dir);
    }

    let interpreter = DeckInterpreter::new(PlottersChart::new(), options);
    interpreter
        .generate(&args.config, &mut deck)
        .with_context(|| format!("Failed to generate deck from {}", args.config.display()))?;

    if args.verbose {
        eprintln!(
            "Written {} slides to {}",
            deck.slide_count(),
            args.output.display()
        );
    }

    Ok(())
}

/// Reject output paths that would not produce a .pptx file.
fn check_output(output: &Path) -> Result<(), Error> {
    let is_pptx = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));
    if is_pptx {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "output must be a .pptx file: {}",
            output.display()
        )))
    }
}

/// Process exit code for a failure, keyed on the first deck error in the chain.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
        Some(Error::NotFound { .. }) => 2,
        Some(Error::DataFormat { .. }) => 3,
        Some(Error::Validation { .. }) | Some(Error::UnknownKind(_)) => 4,
        Some(Error::InvalidArgument(_)) => 5,
        Some(Error::ArtifactWrite { .. }) => 6,
        Some(Error::Render { .. }) => 7,
        Some(Error::Backend(_)) | None => 1,
    }
}
