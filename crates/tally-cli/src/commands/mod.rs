//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod schema;

use std::path::{Path, PathBuf};

use tracing::debug;

use tally_core::extract::rules::format_amount;
use tally_core::models::config::TallyConfig;
use tally_core::{CompletionProvider, ExtractionResult, FixtureBackend, OpenAiBackend, Receipt};

/// Output format for extracted receipts.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (the full extraction result, failures included)
    Json,
    /// CSV output (one row per line item)
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    TallyConfig::default_path(dirs::config_dir())
}

/// Load the config from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TallyConfig> {
    if let Some(path) = config_path {
        return Ok(TallyConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(TallyConfig::from_file(&path)?)
    } else {
        Ok(TallyConfig::default())
    }
}

/// Pick the backend: a fixture file if given, otherwise the HTTP provider.
pub fn build_provider(
    config: &TallyConfig,
    fixture: Option<&Path>,
    api_key: Option<&str>,
) -> anyhow::Result<Box<dyn CompletionProvider>> {
    if let Some(path) = fixture {
        debug!("Replaying provider answer from {}", path.display());
        return Ok(Box::new(FixtureBackend::from_file(path)?));
    }

    let provider = &config.provider;
    let api_key = api_key
        .map(str::to_string)
        .or_else(|| provider.api_key_from_env())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key found. Set {} or pass --api-key.",
                provider.api_key_env
            )
        })?;

    let backend = OpenAiBackend::new(api_key, &provider.model, provider.timeout())?
        .with_base_url(&provider.base_url);
    Ok(Box::new(backend))
}

/// Render a result; CSV and text have nothing to show for a failure.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<Option<String>> {
    match (format, result.document()) {
        (OutputFormat::Json, _) => Ok(Some(serde_json::to_string_pretty(result)?)),
        (OutputFormat::Csv, Some(receipt)) => Ok(Some(format_csv(receipt)?)),
        (OutputFormat::Text, Some(receipt)) => Ok(Some(format_text(receipt))),
        (_, None) => Ok(None),
    }
}

fn format_csv(receipt: &Receipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "receipt_number",
        "transaction_date",
        "merchant_name",
        "description",
        "quantity",
        "unit_price",
        "total_price",
        "currency",
    ])?;

    let receipt_number = receipt.receipt_number().unwrap_or_default();
    let date = receipt.transaction_date().to_string();

    for item in receipt.line_items() {
        wtr.write_record([
            receipt_number,
            date.as_str(),
            receipt.merchant_name(),
            item.description(),
            item.quantity().to_string().as_str(),
            item.unit_price().to_string().as_str(),
            item.total_price().to_string().as_str(),
            receipt.currency(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &Receipt) -> String {
    let currency = receipt.currency();
    let mut output = String::new();

    output.push_str(&format!("Merchant: {}\n", receipt.merchant_name()));
    if let Some(location) = receipt.merchant_location() {
        output.push_str(&format!("  {}\n", location));
    }
    output.push_str(&format!("Date: {}", receipt.transaction_date()));
    if let Some(time) = receipt.transaction_time() {
        output.push_str(&format!(" {}", time));
    }
    output.push('\n');
    if let Some(number) = receipt.receipt_number() {
        output.push_str(&format!("Receipt: {}\n", number));
    }
    output.push('\n');

    output.push_str(&format!("Items ({}):\n", receipt.line_items().len()));
    for item in receipt.line_items() {
        output.push_str(&format!(
            "  {} x {} @ {} = {}\n",
            item.quantity(),
            item.description(),
            format_amount(item.unit_price(), currency),
            format_amount(item.total_price(), currency)
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal: {}\n", format_amount(receipt.subtotal(), currency)));
    output.push_str(&format!("  Tax:      {}\n", format_amount(receipt.tax_amount(), currency)));
    output.push_str(&format!("  Total:    {}\n", format_amount(receipt.total_amount(), currency)));

    if let Some(method) = receipt.payment_method() {
        output.push_str(&format!("\nPaid by {}", method.as_str()));
        if let Some(digits) = receipt.card_last_four() {
            output.push_str(&format!(" ending {}", digits));
        }
        output.push('\n');
    }

    if !receipt.expense_categories().is_empty() {
        output.push_str(&format!(
            "\nCategories ({}):\n",
            receipt.expense_categories().len()
        ));
        for category in receipt.expense_categories() {
            output.push_str(&format!(
                "  • {}: {}\n",
                category.category(),
                format_amount(category.total_amount(), currency)
            ));
            for item in category.items() {
                output.push_str(&format!("    - {}\n", item));
            }
        }
    }

    output
}
