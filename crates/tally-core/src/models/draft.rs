//! Unvalidated receipt shapes, as requested from and returned by the provider.
//!
//! These types describe the JSON Schema handed to the completion provider and
//! are what its answer is first deserialized into. They carry no invariants;
//! numeric fields are signed so that out-of-range answers reach validation
//! instead of failing to parse.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::receipt::{CategoryLabel, PaymentMethod};

/// A purchased entry as proposed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineItemDraft {
    pub description: String,

    /// Number of units purchased.
    #[schemars(description = "Quantity must be positive")]
    pub quantity: i64,

    #[schemars(with = "f64", description = "Price must be non-negative")]
    pub unit_price: Decimal,

    #[schemars(with = "f64", description = "Total must equal quantity × unit_price")]
    pub total_price: Decimal,
}

/// Purchases grouped under one expense label.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseCategoryDraft {
    #[schemars(description = "Category name for business expense reporting")]
    pub category: CategoryLabel,

    #[schemars(with = "f64", description = "Total amount for this category")]
    pub total_amount: Decimal,

    #[schemars(description = "Number of items in this category")]
    pub item_count: i64,

    #[schemars(description = "List of item descriptions in this category")]
    pub items: Vec<String>,
}

/// Receipt document structure.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReceiptDraft {
    pub receipt_number: Option<String>,

    #[schemars(with = "String", description = "Transaction date, YYYY-MM-DD")]
    pub transaction_date: NaiveDate,

    pub transaction_time: Option<String>,

    pub merchant_name: String,

    pub merchant_location: Option<String>,

    pub line_items: Vec<LineItemDraft>,

    #[schemars(with = "f64")]
    pub subtotal: Decimal,

    #[schemars(with = "Option<f64>")]
    pub tax_rate: Option<Decimal>,

    #[schemars(with = "f64")]
    pub tax_amount: Decimal,

    #[schemars(with = "f64", description = "Must equal subtotal + tax_amount")]
    pub total_amount: Decimal,

    #[serde(default = "default_currency")]
    pub currency: String,

    pub payment_method: Option<PaymentMethod>,

    #[schemars(description = "Last 4 digits of card")]
    pub card_last_four: Option<String>,

    #[serde(default)]
    #[schemars(description = "Purchases grouped by expense category")]
    pub expense_categories: Vec<ExpenseCategoryDraft>,

    #[serde(default)]
    #[schemars(description = "Confidence in the extraction, 0.0 to 1.0")]
    pub extraction_confidence: f32,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

/// Name the receipt schema is registered under with the provider.
pub const RECEIPT_SCHEMA_NAME: &str = "receipt";

/// JSON Schema describing [`ReceiptDraft`].
pub fn receipt_schema() -> Value {
    schemars::schema_for!(ReceiptDraft).to_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_lists_fields_and_categories() {
        let schema = receipt_schema();
        let properties = schema["properties"].as_object().unwrap();

        for field in [
            "transaction_date",
            "merchant_name",
            "line_items",
            "subtotal",
            "tax_amount",
            "total_amount",
            "card_last_four",
            "expense_categories",
            "extraction_confidence",
        ] {
            assert!(properties.contains_key(field), "missing {field}");
        }

        let text = schema.to_string();
        assert!(text.contains("Food & Beverage"));
        assert!(text.contains("Leisure & Entertainment"));
    }

    #[test]
    fn test_draft_defaults() {
        let draft: ReceiptDraft = serde_json::from_value(json!({
            "transaction_date": "2024-03-01",
            "merchant_name": "Store X",
            "line_items": [],
            "subtotal": "6.00",
            "tax_amount": "0.24",
            "total_amount": "6.24"
        }))
        .unwrap();

        assert_eq!(draft.currency, "USD");
        assert!(draft.receipt_number.is_none());
        assert!(draft.expense_categories.is_empty());
        assert_eq!(draft.extraction_confidence, 0.0);
    }

    #[test]
    fn test_draft_rejects_unknown_category() {
        let result: Result<ExpenseCategoryDraft, _> = serde_json::from_value(json!({
            "category": "Office Supplies",
            "total_amount": 3.0,
            "item_count": 1,
            "items": ["pens"]
        }));
        assert!(result.is_err());
    }
}
