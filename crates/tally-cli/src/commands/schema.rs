//! Schema command - print the JSON Schema the provider is held to.

use tally_core::models::draft::receipt_schema;

pub fn run() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&receipt_schema())?);
    Ok(())
}
