use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use curricula::config::{load_job_requirements, ExtractionSettings, ModelSettings, Workspace};
use curricula::pipeline::{ConsoleProgress, Pipeline, StageReport};
use curricula::{CurriculaError, MessagesClient, TesseractOcr};

#[derive(Parser)]
#[command(name = "curricula")]
#[command(about = "Extract, standardize and analyze résumés against a job profile")]
#[command(version)]
struct Cli {
    /// Directory holding input/, extracted/, processed/, analysis/, report/ and log/
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Job requirements file (defaults to <base-dir>/config/job-requirements.json)
    #[arg(long, global = true)]
    job_requirements: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from the PDF and DOCX files in the input directory
    #[command(alias = "cv:extract")]
    Extract {
        /// Re-extract files that already have output
        #[arg(short, long)]
        force: bool,
    },
    /// Standardize extracted text into the canonical sections
    #[command(alias = "cv:process")]
    Process {
        /// A single file in the extracted directory
        file: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
    },
    /// Analyze standardized résumés and append them to the daily report
    #[command(alias = "cv:analyze")]
    Analyze {
        /// A single file in the processed directory
        file: Option<PathBuf>,
        #[arg(short, long)]
        force: bool,
    },
    /// Run extraction, standardization and analysis in sequence
    #[command(visible_alias = "run-all", alias = "cv:run-all")]
    All {
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("curricula=info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr)),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };
    if let Err(e) = installed {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    // Route `log` records (directory scanning) into tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}

fn build_pipeline(cli: &Cli) -> Result<Pipeline, CurriculaError> {
    let defaults = Workspace::with_defaults(&cli.base_dir);
    let requirements_path = cli
        .job_requirements
        .clone()
        .unwrap_or_else(|| defaults.default_requirements_path());

    let requirements = load_job_requirements(&requirements_path)?;
    if cli.job_requirements.is_some() {
        println!(
            "Using custom job requirements file: {}",
            requirements_path.display()
        );
    }

    let workspace = Workspace::new(
        &cli.base_dir,
        requirements.directories.clone().unwrap_or_default(),
    );
    workspace.ensure_all()?;

    let settings = ModelSettings::from_env()?;
    let model = MessagesClient::new(&settings)?;
    info!(model = model.model_id(), "Model client ready");

    let extraction = ExtractionSettings::default();
    let ocr = TesseractOcr::new(extraction.ocr_dpi, workspace.temp_dir());

    Ok(Pipeline::from_settings(
        workspace,
        Arc::new(requirements),
        Arc::new(model),
        Arc::new(ocr),
        extraction,
    ))
}

fn report_count(report: &StageReport, verb: &str) -> bool {
    if report.produced_nothing() {
        println!(
            "No files were {}. Check the {} input directory or use --force to reprocess existing files.",
            verb,
            report.stage.label().to_lowercase()
        );
        return false;
    }
    println!(
        "Successfully {} {} files ({} skipped, {} failed)",
        verb,
        report.done_count(),
        report.skipped_count(),
        report.failed_count()
    );
    true
}

fn run(cli: &Cli) -> Result<bool, CurriculaError> {
    let mut pipeline = build_pipeline(cli)?;
    let progress = ConsoleProgress;

    let succeeded = match &cli.command {
        Commands::Extract { force } => {
            announce("Extracting text from CVs...", *force);
            let report = pipeline.extract(*force, &progress)?;
            report_count(&report, "extracted")
        }
        Commands::Process { file, force } => {
            announce("Standardizing CV data...", *force);
            let report = pipeline.standardize(file.as_deref(), *force, &progress)?;
            report_count(&report, "processed")
        }
        Commands::Analyze { file, force } => {
            announce("Analyzing CV data...", *force);
            let run = pipeline.analyze(file.as_deref(), *force, &progress)?;
            if !report_count(&run.report, "analyzed") {
                return Ok(false);
            }
            if run.consolidated.is_none() {
                println!(
                    "Nothing new to report. Today's report: {}",
                    pipeline.consolidated_report_path().display()
                );
            }
            true
        }
        Commands::All { force } => {
            announce("Running all CV processing steps...", *force);
            let run = pipeline.run_all(*force, &progress)?;
            println!("\nProcessing completed successfully!");
            if run.analysis.consolidated.is_none() {
                println!(
                    "No new rows. Today's report: {}",
                    pipeline.consolidated_report_path().display()
                );
            }
            true
        }
    };

    Ok(succeeded)
}

fn announce(message: &str, force: bool) {
    println!("{}", message);
    if force {
        println!("Force mode enabled: existing outputs will be overwritten");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env is the normal case
    let _ = dotenvy::from_path(cli.base_dir.join(".env"));
    init_tracing(cli.log_format);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
