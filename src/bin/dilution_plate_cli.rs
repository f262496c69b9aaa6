//! CLI for dilution-plate - reads a sample sheet, writes the Mantis dispense
//! file and the plate layout.
//!
//! Usage:
//!   dilution_plate_cli build samples.csv                     # dispense file to stdout
//!   dilution_plate_cli build samples.csv -o mantis.txt --plate plate.tsv
//!   dilution_plate_cli build samples.tsv --well-column well --json
//!   dilution_plate_cli init-config dilution.toml             # write default config

#![allow(clippy::exit)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use dilution_plate::export::write_plate_tsv;
use dilution_plate::review::review_plate;
use dilution_plate::sample_sheet::{ColumnMapping, ColumnRef, SampleSheetReader};
use dilution_plate::{
    DispensePipeline, DuplicateWellPolicy, PipelineConfig, WellCoordinate,
    DEFAULT_INSTRUCTION_FILE_NAME,
};

#[derive(Parser)]
#[command(
    name = "dilution_plate_cli",
    about = "DNA dilution plates and Mantis dispense files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DILUTION_PLATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the plate layout and dispense file from a sample sheet
    Build(BuildArgs),

    /// Write the default configuration
    InitConfig {
        /// Destination (stdout if omitted)
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Sample sheet (CSV or TSV)
    sheet: PathBuf,

    /// The sheet has no header row
    #[arg(long)]
    no_headers: bool,

    /// Well column (header name or zero-based position)
    #[arg(long, default_value = "0")]
    well_column: ColumnRef,

    /// Sample id column
    #[arg(long, default_value = "1")]
    sample_column: ColumnRef,

    /// Concentration (ng/µL) column
    #[arg(long, default_value = "2")]
    concentration_column: ColumnRef,

    /// Per-sample stock input volume (µL) column
    #[arg(long)]
    input_volume_column: Option<ColumnRef>,

    /// Explicit diluent volume (µL) column
    #[arg(long)]
    diluent_column: Option<ColumnRef>,

    /// Stock DNA input volume (µL)
    #[arg(long)]
    input_volume: Option<f64>,

    /// Target concentration (ng/µL)
    #[arg(long)]
    target_concentration: Option<f64>,

    /// High-volume chip capacity per track (µL)
    #[arg(long)]
    capacity_threshold: Option<f64>,

    /// Fail on wells listed more than once instead of keeping the last entry
    #[arg(long)]
    strict_wells: bool,

    /// Dispense file destination (stdout if omitted, default name if given without a value)
    #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_INSTRUCTION_FILE_NAME)]
    output: Option<PathBuf>,

    /// Write the plate layout as TSV
    #[arg(long)]
    plate: Option<PathBuf>,

    /// Print the plate layout and run summary as JSON
    #[arg(long)]
    json: bool,
}

impl BuildArgs {
    fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(v) = self.input_volume {
            config.input_volume = v;
        }
        if let Some(v) = self.target_concentration {
            config.target_concentration = v;
        }
        if let Some(v) = self.capacity_threshold {
            config.capacity_threshold = v;
        }
        if self.strict_wells {
            config.duplicate_wells = DuplicateWellPolicy::Reject;
        }
    }

    fn mapping(&self) -> ColumnMapping {
        ColumnMapping {
            well: self.well_column.clone(),
            sample_id: self.sample_column.clone(),
            concentration: Some(self.concentration_column.clone()),
            input_volume: self.input_volume_column.clone(),
            diluent_volume: self.diluent_column.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::InitConfig { path } => {
            let text = PipelineConfig::default_toml();
            match path {
                Some(path) => {
                    fs::write(&path, text)?;
                    eprintln!("Written: {}", path.display());
                }
                None => io::stdout().write_all(text.as_bytes())?,
            }
            Ok(())
        }
        Commands::Build(args) => build(cli.config.as_deref(), &args),
    }
}

fn build(config_path: Option<&Path>, args: &BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::load_from(path)?,
        None => PipelineConfig::default(),
    };
    args.apply_overrides(&mut config);

    let records = SampleSheetReader::new(args.mapping())
        .has_headers(!args.no_headers)
        .read_path(&args.sheet)?;

    let pipeline = DispensePipeline::new(config)?;
    let output = pipeline.run(&records)?;

    let occupied: Vec<WellCoordinate> = output.samples.iter().map(|s| s.well).collect();
    for flagged in review_plate(&output.grid, &occupied, pipeline.config()) {
        tracing::warn!(
            well = %flagged.well,
            diluent = flagged.diluent_volume,
            flag = ?flagged.flag,
            "well needs review"
        );
    }

    if let Some(path) = &args.plate {
        fs::write(path, write_plate_tsv(&output.grid))?;
        eprintln!("Written: {}", path.display());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output.document.as_str())?;
            eprintln!("Written: {}", path.display());
        }
        None if !args.json => io::stdout().write_all(output.document.as_str().as_bytes())?,
        None => {}
    }

    if args.json {
        let json = serde_json::json!({
            "grid": output.grid,
            "summary": output.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        let summary = output.summary();
        eprintln!(
            "{} samples, {} wells, {} coarse tracks, {} masked",
            summary.samples, summary.non_zero_wells, summary.coarse_tracks, summary.masked_wells
        );
    }

    Ok(())
}
