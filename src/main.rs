mod analytics;
mod config;
mod error;
mod export;
mod heuristics;
mod intake;
mod pdf_text;
mod record;
mod report;
mod store;

use clap::{Parser, Subcommand};
use export::ExportFormat;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ratecon", author, version, about = "Track freight rate confirmations")]
struct Args {
    /// Path to the tracker config.
    #[arg(short, long, default_value = ".config/ratecon.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read rate confirmation PDFs and add the new loads to the log.
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Show what would be added without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the stored loads.
    Log,
    /// Print KPIs and load distributions.
    Metrics,
    /// Write a snapshot of the log.
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show what the extractor sees in one PDF.
    Inspect { file: PathBuf },
    /// Point the config at a spreadsheet.
    Link { spreadsheet_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    let args = Args::parse();

    match args.command {
        Command::Inspect { file } => {
            let bytes = tokio::fs::read(&file).await?;
            pdf_text::inspect_pdf(&intake::file_name(&file), &bytes)?;
        }
        Command::Link { spreadsheet_id } => {
            config::Config::update_spreadsheet_id(&args.config, &spreadsheet_id)?;
            info!(config = %args.config.display(), spreadsheet = %spreadsheet_id, "Config updated");
        }
        Command::Process { files, dry_run } => {
            let cfg = config::Config::load(&args.config)?;
            let log = store::open(&cfg).await?;
            let existing = log.load_all().await?;

            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(intake::read_upload(path, cfg.tracker.max_file_size).await?);
            }

            let report = intake::process_uploads(
                &uploads,
                &existing,
                &cfg.tracker,
                &intake::today(),
                pdf_text::extract_fields,
            );
            print!("{}", report::render_intake(&report, &cfg.tracker));

            if dry_run {
                info!(pending = report.accepted.len(), "Dry run — nothing written");
            } else if !report.accepted.is_empty() {
                log.append(&report.accepted).await?;
                println!("Added {} new records to the log.", report.accepted.len());
            }
        }
        Command::Log => {
            let cfg = config::Config::load(&args.config)?;
            let records = store::open(&cfg).await?.load_all().await?;
            if records.is_empty() {
                println!("The log is empty.");
            } else {
                print!("{}", report::render_table(&records, &cfg.tracker));
            }
        }
        Command::Metrics => {
            let cfg = config::Config::load(&args.config)?;
            let records = store::open(&cfg).await?.load_all().await?;
            let metrics = analytics::metrics(&records, &cfg.tracker);
            print!("{}", report::render_metrics(&metrics));
            print!("{}", report::render_charts(&records, &cfg.tracker));
        }
        Command::Export { format, out } => {
            let cfg = config::Config::load(&args.config)?;
            let records = store::open(&cfg).await?.load_all().await?;
            let bytes = match format {
                ExportFormat::Csv => export::to_csv(&records),
                ExportFormat::Xlsx => export::to_xlsx(&records)?,
            };
            let out = out.unwrap_or_else(|| {
                PathBuf::from(format!("ratecon_export.{}", format.extension()))
            });
            tokio::fs::write(&out, bytes).await?;
            info!(path = %out.display(), rows = records.len(), "Export written");
        }
    }

    Ok(())
}

