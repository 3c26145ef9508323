//! Extract command - turn one receipt transcript into a validated receipt.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tally_core::{DocumentExtractor, ExtractionResult, SchemaGuidedExtractor};

use super::{OutputFormat, build_provider, format_result, load_config};

/// Line that ends interactive input.
const END_MARKER: &str = "END";

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file ("-" or omitted: read stdin until EOF or a line reading END)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document type (default: taken from config)
    #[arg(short = 't', long)]
    document_type: Option<String>,

    /// Replay a recorded provider answer instead of calling the service
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// API key (default: read from the configured environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Show confidence, token usage and timing
    #[arg(long)]
    show_confidence: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let text = read_input(args.input.as_ref())?;
    let document_type = args
        .document_type
        .as_deref()
        .unwrap_or(&config.extraction.document_type);

    let provider = build_provider(&config, args.fixture.as_deref(), args.api_key.as_deref())?;
    let extractor = SchemaGuidedExtractor::from_config(provider, &config.provider);

    info!(
        "Extracting {} from {} characters of text",
        document_type,
        text.len()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Extracting {}...", document_type));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = extractor.extract_document(&text, document_type);

    pb.finish_and_clear();

    if let Some(output) = format_result(&result, args.format)? {
        if let Some(output_path) = &args.output {
            fs::write(output_path, &output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                output_path.display()
            );
        } else {
            println!("{}", output);
        }
    }

    if args.show_confidence {
        print_stats(&result);
    }

    debug!("Total time: {:?}", start.elapsed());

    if let Some(error) = result.error() {
        report_failure(&result);
        anyhow::bail!("Extraction failed ({})", error.kind());
    }

    Ok(())
}

/// Read the transcript from a file, or from stdin when no path (or "-") is given.
fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Ok(fs::read_to_string(path)?)
        }
        _ => read_until_end(io::stdin().lock()),
    }
}

fn read_until_end(reader: impl BufRead) -> anyhow::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim() == END_MARKER {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn print_stats(result: &ExtractionResult) {
    eprintln!();
    eprintln!(
        "{} Extraction confidence: {:.1}%",
        style("ℹ").blue(),
        result.confidence_score() * 100.0
    );
    eprintln!(
        "{} Fields extracted: {}",
        style("ℹ").blue(),
        result.fields_extracted()
    );
    if let Some(tokens) = result.tokens_used() {
        eprintln!("{} Tokens used: {}", style("ℹ").blue(), tokens);
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms()
    );
}

fn report_failure(result: &ExtractionResult) {
    if let Some(message) = result.error_message() {
        eprintln!("{} {}", style("✗").red(), message);
    }

    let issues = result.validation_errors();
    if !issues.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_end_marker() {
        let input = "Store X\napples $3.00\nEND\nignored\n";
        assert_eq!(read_until_end(input.as_bytes()).unwrap(), "Store X\napples $3.00");
    }

    #[test]
    fn test_read_until_eof() {
        let input = "Store X\ntotal $6.24\n";
        assert_eq!(read_until_end(input.as_bytes()).unwrap(), "Store X\ntotal $6.24");
    }
}
