//! hypno CLI - Command-line interface for hypnoflux
//!
//! Commands:
//! - shape: Shape one night of rows into a chart payload
//! - validate: Report rows that fail to normalize
//! - summary: Print the stage proportion table
//! - taxonomy: Print the stage taxonomy and palette

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hypnoflux::encoder::ChartEncoder;
use hypnoflux::normalizer::{MalformedRowPolicy, Normalizer};
use hypnoflux::segmenter::PortionBase;
use hypnoflux::types::{ChartPayload, NormalizationReport, QualityFlag, SkippedRow};
use hypnoflux::{InputFormat, RawRowReader, ShapeError, ShapePipeline, ShaperConfig};
use hypnoflux::{HYPNOFLUX_VERSION, PRODUCER_NAME};

/// hypno - Shape sleep-stage hypnograms into chart-ready aggregates
#[derive(Parser)]
#[command(name = "hypno")]
#[command(version = HYPNOFLUX_VERSION)]
#[command(about = "Shape hypnogram CSV exports into chart data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape one night of rows into a chart payload
    Shape {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        format: CliInputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Load configuration (taxonomy, palette, policies) from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drop malformed rows instead of failing
        #[arg(long)]
        skip_malformed: bool,

        /// Denominator for run portions
        #[arg(long)]
        portion_base: Option<CliPortionBase>,
    },

    /// Report rows that fail to normalize
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        format: CliInputFormat,

        /// Load configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stage proportion table for one night
    Summary {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "csv")]
        format: CliInputFormat,

        /// Load configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the stage taxonomy and palette
    Taxonomy {
        /// Load configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliInputFormat {
    /// Comma-separated with a header row
    Csv,
    /// JSON array of rows
    Json,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

impl From<CliInputFormat> for InputFormat {
    fn from(format: CliInputFormat) -> Self {
        match format {
            CliInputFormat::Csv => InputFormat::Csv,
            CliInputFormat::Json => InputFormat::Json,
            CliInputFormat::Ndjson => InputFormat::Ndjson,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliPortionBase {
    /// samples - 1
    Intervals,
    /// samples
    Samples,
}

impl From<CliPortionBase> for PortionBase {
    fn from(base: CliPortionBase) -> Self {
        match base {
            CliPortionBase::Intervals => PortionBase::Intervals,
            CliPortionBase::Samples => PortionBase::Samples,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HypnoCliError> {
    match cli.command {
        Commands::Shape {
            input,
            output,
            format,
            output_format,
            config,
            skip_malformed,
            portion_base,
        } => {
            let mut config = load_config(config.as_deref())?;
            if skip_malformed {
                config = config.with_malformed_rows(MalformedRowPolicy::Skip);
            }
            if let Some(base) = portion_base {
                config = config.with_portion_base(base.into());
            }
            cmd_shape(&input, &output, format.into(), output_format, config)
        }

        Commands::Validate {
            input,
            format,
            config,
            json,
        } => cmd_validate(&input, format.into(), load_config(config.as_deref())?, json),

        Commands::Summary {
            input,
            format,
            config,
        } => cmd_summary(&input, format.into(), load_config(config.as_deref())?),

        Commands::Taxonomy { config, json } => cmd_taxonomy(load_config(config.as_deref())?, json),
    }
}

fn cmd_shape(
    input: &Path,
    output: &Path,
    format: InputFormat,
    output_format: OutputFormat,
    config: ShaperConfig,
) -> Result<(), HypnoCliError> {
    let input_data = read_input(input)?;
    let pipeline = ShapePipeline::new(config);

    let chart = pipeline.shape(&input_data, format)?;
    if !chart.report.skipped.is_empty() {
        info!(skipped = chart.report.skipped.len(), "dropped malformed rows");
    }

    let payload = ChartEncoder::new().encode(chart);
    let output_data = format_output(&payload, output_format)?;

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
        debug!(path = %output.display(), "wrote chart payload");
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    format: InputFormat,
    config: ShaperConfig,
    json: bool,
) -> Result<(), HypnoCliError> {
    let input_data = read_input(input)?;
    let rows = RawRowReader::parse(&input_data, format)?;

    // Skip policy so every bad row gets reported, not just the first
    let series = Normalizer::normalize(&rows, &config.taxonomy, MalformedRowPolicy::Skip)?;

    let report = ValidationReport::from_report(&series.report);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);

        if !report.flags.is_empty() {
            let flags: Vec<&str> = report.flags.iter().map(QualityFlag::as_str).collect();
            println!("Flags:        {}", flags.join(", "));
        }

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Row {}: {}", err.row, err.reason);
            }
        }
    }

    if report.invalid_rows > 0 {
        Err(HypnoCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_summary(
    input: &Path,
    format: InputFormat,
    config: ShaperConfig,
) -> Result<(), HypnoCliError> {
    let input_data = read_input(input)?;
    let chart = ShapePipeline::new(config).shape(&input_data, format)?;

    println!("Stage Summary");
    println!("=============");
    println!("Samples: {}", chart.report.rows_kept);
    println!("Runs:    {}", chart.runs.len());
    println!();

    let first = chart.first_occurrences.to_sentinel_indices();
    for (slot, (label, fraction)) in chart
        .proportions
        .labels
        .iter()
        .zip(&chart.proportions.fractions)
        .enumerate()
    {
        let first_run = match first.get(slot) {
            Some(&i) if i >= 0 => format!("first run #{i}"),
            _ => "absent".to_string(),
        };
        println!("  {:<8} {:>6.1}%  {}", label, fraction * 100.0, first_run);
    }

    Ok(())
}

fn cmd_taxonomy(config: ShaperConfig, json: bool) -> Result<(), HypnoCliError> {
    if json {
        let value = serde_json::json!({
            "taxonomy": config.taxonomy,
            "palette": config.palette,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Stage Taxonomy ({} {})", PRODUCER_NAME, HYPNOFLUX_VERSION);
    println!();
    println!("  id  label     color     display slot");
    for (id, label) in config.taxonomy.labels().iter().enumerate() {
        let color = config.palette.get(id).map(String::as_str).unwrap_or("-");
        let slot = config
            .taxonomy
            .display_index(id)
            .map(|s| s.to_string())
            .unwrap_or_default();
        println!("  {:<3} {:<9} {:<9} {}", id, label, color, slot);
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, HypnoCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<ShaperConfig, HypnoCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(ShaperConfig::from_json(&json)?)
        }
        None => Ok(ShaperConfig::default()),
    }
}

fn format_output(payload: &ChartPayload, format: OutputFormat) -> Result<String, HypnoCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(payload)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payload)?),
    }
}

// Error types

#[derive(Debug)]
enum HypnoCliError {
    Io(io::Error),
    Shape(ShapeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for HypnoCliError {
    fn from(e: io::Error) -> Self {
        HypnoCliError::Io(e)
    }
}

impl From<ShapeError> for HypnoCliError {
    fn from(e: ShapeError) -> Self {
        HypnoCliError::Shape(e)
    }
}

impl From<serde_json::Error> for HypnoCliError {
    fn from(e: serde_json::Error) -> Self {
        HypnoCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HypnoCliError> for CliError {
    fn from(e: HypnoCliError) -> Self {
        match e {
            HypnoCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HypnoCliError::Shape(e) => {
                let (code, hint) = match &e {
                    ShapeError::MalformedRow { .. } | ShapeError::UnknownStage { .. } => (
                        "MALFORMED_ROW",
                        "Run 'hypno validate' or pass --skip-malformed",
                    ),
                    ShapeError::EmptySeries(_) => {
                        ("EMPTY_SERIES", "Ensure the input has at least one usable row")
                    }
                    ShapeError::InvalidTaxonomy(_) | ShapeError::PaletteTooShort { .. } => {
                        ("CONFIG_ERROR", "Check the taxonomy and palette in the config file")
                    }
                    ShapeError::Csv(_) => (
                        "CSV_ERROR",
                        "Input needs a header with timestamp and sleep_stage columns",
                    ),
                    ShapeError::JsonError(_) | ShapeError::ParseError(_) => {
                        ("PARSE_ERROR", "Check the input format flag and syntax")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            HypnoCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            HypnoCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix the listed rows and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    errors: Vec<SkippedRow>,
    flags: Vec<QualityFlag>,
}

impl ValidationReport {
    fn from_report(report: &NormalizationReport) -> Self {
        Self {
            total_rows: report.rows_read,
            valid_rows: report.rows_kept,
            invalid_rows: report.skipped.len(),
            errors: report.skipped.clone(),
            flags: report.flags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_flags_use_payload_names() {
        let rows = RawRowReader::parse("timestamp,sleep_stage\n60,0\n30,1\n", InputFormat::Csv)
            .unwrap();
        let series =
            Normalizer::normalize(&rows, &ShaperConfig::default().taxonomy, MalformedRowPolicy::Skip)
                .unwrap();
        let report = ValidationReport::from_report(&series.report);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["flags"], serde_json::json!(["out_of_order"]));

        let chart = ShapePipeline::default()
            .shape_csv("timestamp,sleep_stage\n60,0\n30,1\n")
            .unwrap();
        let chart_value = serde_json::to_value(&chart.report).unwrap();
        assert_eq!(chart_value["flags"], value["flags"]);
    }
}
