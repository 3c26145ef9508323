//! Batch command for extracting many receipt transcripts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use tally_core::{DocumentExtractor, ExtractionResult, SchemaGuidedExtractor};

use super::{OutputFormat, build_provider, format_result, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching .txt transcripts
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document type (default: taken from config)
    #[arg(short = 't', long)]
    document_type: Option<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Replay a recorded provider answer instead of calling the service
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// API key (default: read from the configured environment variable)
    #[arg(long)]
    api_key: Option<String>,
}

/// Outcome for one file; `Err` means the file never reached the extractor.
struct FileOutcome {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
}

impl FileOutcome {
    fn is_success(&self) -> bool {
        matches!(&self.result, Ok(r) if r.is_success())
    }

    fn error(&self) -> Option<String> {
        match &self.result {
            Ok(result) => result.error_message(),
            Err(e) => Some(e.clone()),
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let document_type = args
        .document_type
        .as_deref()
        .unwrap_or(&config.extraction.document_type);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let provider = build_provider(&config, args.fixture.as_deref(), args.api_key.as_deref())?;
    let extractor = SchemaGuidedExtractor::from_config(provider, &config.provider);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Sequential; each file is one provider call.
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        let result = fs::read_to_string(&path)
            .map(|text| extractor.extract_document(&text, document_type))
            .map_err(|e| format!("failed to read file: {}", e));

        let outcome = FileOutcome { path, result };

        if let Some(error_msg) = outcome.error() {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!(
                    "Processing failed for {}: {}",
                    outcome.path.display(),
                    error_msg
                );
            }
        }

        outcomes.push(outcome);
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            let Ok(result) = &outcome.result else {
                continue;
            };
            let Some(content) = format_result(result, args.format)? else {
                continue;
            };

            let output_name = outcome
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_success()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error().as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "merchant_name",
        "transaction_date",
        "total_amount",
        "currency",
        "confidence",
        "fields_extracted",
        "tokens_used",
        "processing_time_ms",
        "error_kind",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let record = match &outcome.result {
            Ok(result) => summary_row(filename, result),
            Err(e) => {
                let mut row = vec![String::new(); 12];
                row[0] = filename.to_string();
                row[1] = "error".to_string();
                row[10] = "io".to_string();
                row[11] = e.clone();
                row
            }
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn summary_row(filename: &str, result: &ExtractionResult) -> Vec<String> {
    let tokens = result.tokens_used().map(|t| t.to_string()).unwrap_or_default();
    let time = result.processing_time_ms().to_string();

    match result.document() {
        Some(receipt) => vec![
            filename.to_string(),
            "success".to_string(),
            receipt.merchant_name().to_string(),
            receipt.transaction_date().to_string(),
            receipt.total_amount().to_string(),
            receipt.currency().to_string(),
            format!("{:.2}", result.confidence_score()),
            result.fields_extracted().to_string(),
            tokens,
            time,
            String::new(),
            String::new(),
        ],
        None => vec![
            filename.to_string(),
            "error".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            tokens,
            time,
            result.error_kind().map(|k| k.to_string()).unwrap_or_default(),
            result.error_message().unwrap_or_default(),
        ],
    }
}
