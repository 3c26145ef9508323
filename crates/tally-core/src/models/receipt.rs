//! Validated receipt data model.
//!
//! Every type here is built from its draft counterpart through `TryFrom`,
//! which is also the `Deserialize` path. Construction checks all field and
//! cross-field invariants and rejects the whole value if any fails; there is
//! no way to hold a `Receipt` whose totals disagree.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationErrors, ValidationIssue};
use crate::extract::rules::{amounts_match, is_card_last_four};

use super::draft::{ExpenseCategoryDraft, LineItemDraft, ReceiptDraft};

/// Business expense grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CategoryLabel {
    #[serde(rename = "Food & Beverage")]
    FoodAndBeverage,
    #[serde(rename = "Health & Wellness")]
    HealthAndWellness,
    #[serde(rename = "Household & Utilities")]
    HouseholdAndUtilities,
    #[serde(rename = "Leisure & Entertainment")]
    LeisureAndEntertainment,
}

impl CategoryLabel {
    /// All labels, in prompt order.
    pub const ALL: [CategoryLabel; 4] = [
        CategoryLabel::FoodAndBeverage,
        CategoryLabel::HealthAndWellness,
        CategoryLabel::HouseholdAndUtilities,
        CategoryLabel::LeisureAndEntertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryLabel::FoodAndBeverage => "Food & Beverage",
            CategoryLabel::HealthAndWellness => "Health & Wellness",
            CategoryLabel::HouseholdAndUtilities => "Household & Utilities",
            CategoryLabel::LeisureAndEntertainment => "Leisure & Entertainment",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Wallets, transfers, QR payments.
    Digital,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Digital => "digital",
            PaymentMethod::Other => "other",
        }
    }
}

/// A single purchased entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemDraft")]
pub struct LineItem {
    description: String,
    quantity: u32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl LineItem {
    /// Build a line item, checking `total_price == quantity × unit_price`.
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        total_price: Decimal,
    ) -> Result<Self, ValidationErrors> {
        Self::try_from(LineItemDraft {
            description: description.into(),
            quantity: i64::from(quantity),
            unit_price,
            total_price,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }
}

impl TryFrom<LineItemDraft> for LineItem {
    type Error = ValidationErrors;

    fn try_from(draft: LineItemDraft) -> Result<Self, Self::Error> {
        let mut issues = Vec::new();

        let quantity = match u32::try_from(draft.quantity) {
            Ok(q) if q >= 1 => Some(q),
            _ => {
                issues.push(ValidationIssue::new(
                    "quantity",
                    format!("quantity {} must be a positive integer", draft.quantity),
                ));
                None
            }
        };

        let unit_price_ok = check_non_negative(&mut issues, "unit_price", draft.unit_price);
        check_non_negative(&mut issues, "total_price", draft.total_price);

        // Only meaningful when both factors passed their own checks.
        if let (Some(q), true) = (quantity, unit_price_ok) {
            match Decimal::from(q).checked_mul(draft.unit_price) {
                Some(expected) if !amounts_match(draft.total_price, expected) => {
                    issues.push(ValidationIssue::new(
                        "total_price",
                        format!(
                            "total price {} doesn't match quantity × unit price ({})",
                            draft.total_price, expected
                        ),
                    ));
                }
                Some(_) => {}
                None => issues.push(ValidationIssue::new(
                    "total_price",
                    format!(
                        "quantity × unit price overflows ({} × {})",
                        q, draft.unit_price
                    ),
                )),
            }
        }

        match quantity {
            Some(quantity) if issues.is_empty() => Ok(Self {
                description: draft.description,
                quantity,
                unit_price: draft.unit_price,
                total_price: draft.total_price,
            }),
            _ => Err(ValidationErrors::new(issues)),
        }
    }
}

/// Purchases grouped under one expense label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExpenseCategoryDraft")]
pub struct ExpenseCategory {
    category: CategoryLabel,
    total_amount: Decimal,
    item_count: u32,
    items: Vec<String>,
}

impl ExpenseCategory {
    /// Build a category; `item_count` is taken from `items`.
    pub fn new(
        category: CategoryLabel,
        total_amount: Decimal,
        items: Vec<String>,
    ) -> Result<Self, ValidationErrors> {
        Self::try_from(ExpenseCategoryDraft {
            category,
            total_amount,
            item_count: items.len() as i64,
            items,
        })
    }

    pub fn category(&self) -> CategoryLabel {
        self.category
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Item descriptions, in receipt order; duplicates allowed.
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl TryFrom<ExpenseCategoryDraft> for ExpenseCategory {
    type Error = ValidationErrors;

    fn try_from(draft: ExpenseCategoryDraft) -> Result<Self, Self::Error> {
        let mut issues = Vec::new();

        check_non_negative(&mut issues, "total_amount", draft.total_amount);

        let item_count = match u32::try_from(draft.item_count) {
            Ok(n) if n >= 1 => Some(n),
            _ => {
                issues.push(ValidationIssue::new(
                    "item_count",
                    format!("item count {} must be at least 1", draft.item_count),
                ));
                None
            }
        };

        if let Some(n) = item_count {
            if n as usize != draft.items.len() {
                issues.push(ValidationIssue::new(
                    "item_count",
                    format!(
                        "item count {} doesn't match {} listed items",
                        n,
                        draft.items.len()
                    ),
                ));
            }
        }

        match item_count {
            Some(item_count) if issues.is_empty() => Ok(Self {
                category: draft.category,
                total_amount: draft.total_amount,
                item_count,
                items: draft.items,
            }),
            _ => Err(ValidationErrors::new(issues)),
        }
    }
}

/// A fully validated receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReceiptDraft")]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt_number: Option<String>,

    transaction_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_time: Option<String>,

    merchant_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_location: Option<String>,

    line_items: Vec<LineItem>,

    subtotal: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    tax_rate: Option<Decimal>,

    tax_amount: Decimal,

    total_amount: Decimal,

    currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    card_last_four: Option<String>,

    expense_categories: Vec<ExpenseCategory>,

    extraction_confidence: f32,
}

/// Top-level fields that are always present on a receipt.
const REQUIRED_FIELD_COUNT: usize = 9;

impl Receipt {
    pub fn receipt_number(&self) -> Option<&str> {
        self.receipt_number.as_deref()
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn transaction_time(&self) -> Option<&str> {
        self.transaction_time.as_deref()
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn merchant_location(&self) -> Option<&str> {
        self.merchant_location.as_deref()
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn tax_rate(&self) -> Option<Decimal> {
        self.tax_rate
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn card_last_four(&self) -> Option<&str> {
        self.card_last_four.as_deref()
    }

    pub fn expense_categories(&self) -> &[ExpenseCategory] {
        &self.expense_categories
    }

    pub fn extraction_confidence(&self) -> f32 {
        self.extraction_confidence
    }

    /// Number of top-level fields holding a value.
    pub fn populated_field_count(&self) -> usize {
        let optional = [
            self.receipt_number.is_some(),
            self.transaction_time.is_some(),
            self.merchant_location.is_some(),
            self.tax_rate.is_some(),
            self.payment_method.is_some(),
            self.card_last_four.is_some(),
        ];
        REQUIRED_FIELD_COUNT + optional.iter().filter(|present| **present).count()
    }

    /// Sum of line item totals, `None` if it exceeds [`Decimal::MAX`].
    pub fn line_items_total(&self) -> Option<Decimal> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total_price))
    }
}

impl TryFrom<ReceiptDraft> for Receipt {
    type Error = ValidationErrors;

    fn try_from(draft: ReceiptDraft) -> Result<Self, Self::Error> {
        let mut issues = Vec::new();

        if draft.merchant_name.trim().is_empty() {
            issues.push(ValidationIssue::new("merchant_name", "merchant name is required"));
        }

        let mut line_items = Vec::with_capacity(draft.line_items.len());
        for (i, item) in draft.line_items.into_iter().enumerate() {
            match LineItem::try_from(item) {
                Ok(item) => line_items.push(item),
                Err(errors) => {
                    let parent = format!("line_items[{}]", i);
                    issues.extend(errors.issues().iter().cloned().map(|e| e.nested(&parent)));
                }
            }
        }

        let subtotal_ok = check_non_negative(&mut issues, "subtotal", draft.subtotal);
        let tax_ok = check_non_negative(&mut issues, "tax_amount", draft.tax_amount);
        check_non_negative(&mut issues, "total_amount", draft.total_amount);

        if subtotal_ok && tax_ok {
            match draft.subtotal.checked_add(draft.tax_amount) {
                Some(expected) if !amounts_match(draft.total_amount, expected) => {
                    issues.push(ValidationIssue::new(
                        "total_amount",
                        format!(
                            "total {} doesn't match subtotal + tax ({})",
                            draft.total_amount, expected
                        ),
                    ));
                }
                Some(_) => {}
                None => issues.push(ValidationIssue::new(
                    "total_amount",
                    format!(
                        "subtotal + tax overflows ({} + {})",
                        draft.subtotal, draft.tax_amount
                    ),
                )),
            }
        }

        if let Some(digits) = &draft.card_last_four {
            if !is_card_last_four(digits) {
                issues.push(ValidationIssue::new(
                    "card_last_four",
                    format!("'{}' is not exactly 4 digits", digits),
                ));
            }
        }

        let mut expense_categories = Vec::with_capacity(draft.expense_categories.len());
        for (i, category) in draft.expense_categories.into_iter().enumerate() {
            match ExpenseCategory::try_from(category) {
                Ok(category) => expense_categories.push(category),
                Err(errors) => {
                    let parent = format!("expense_categories[{}]", i);
                    issues.extend(errors.issues().iter().cloned().map(|e| e.nested(&parent)));
                }
            }
        }

        if !(0.0..=1.0).contains(&draft.extraction_confidence) {
            issues.push(ValidationIssue::new(
                "extraction_confidence",
                format!(
                    "confidence {} is outside 0.0 to 1.0",
                    draft.extraction_confidence
                ),
            ));
        }

        if !issues.is_empty() {
            return Err(ValidationErrors::new(issues));
        }

        Ok(Self {
            receipt_number: draft.receipt_number,
            transaction_date: draft.transaction_date,
            transaction_time: draft.transaction_time,
            merchant_name: draft.merchant_name,
            merchant_location: draft.merchant_location,
            line_items,
            subtotal: draft.subtotal,
            tax_rate: draft.tax_rate,
            tax_amount: draft.tax_amount,
            total_amount: draft.total_amount,
            currency: draft.currency,
            payment_method: draft.payment_method,
            card_last_four: draft.card_last_four,
            expense_categories,
            extraction_confidence: draft.extraction_confidence,
        })
    }
}

/// Record an issue unless `value >= 0`; returns whether the value passed.
fn check_non_negative(issues: &mut Vec<ValidationIssue>, field: &str, value: Decimal) -> bool {
    if value.is_sign_negative() && !value.is_zero() {
        issues.push(ValidationIssue::new(
            field,
            format!("{} must be non-negative, got {}", field, value),
        ));
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn draft() -> ReceiptDraft {
        ReceiptDraft {
            receipt_number: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            transaction_time: None,
            merchant_name: "Store X".to_string(),
            merchant_location: None,
            line_items: vec![LineItemDraft {
                description: "apples".to_string(),
                quantity: 2,
                unit_price: d("1.50"),
                total_price: d("3.00"),
            }],
            subtotal: d("6.00"),
            tax_rate: None,
            tax_amount: d("0.24"),
            total_amount: d("6.24"),
            currency: "USD".to_string(),
            payment_method: None,
            card_last_four: None,
            expense_categories: Vec::new(),
            extraction_confidence: 0.0,
        }
    }

    #[test]
    fn test_line_item_total_within_tolerance() {
        assert!(LineItem::new("apples", 2, d("1.50"), d("3.00")).is_ok());
        assert!(LineItem::new("apples", 2, d("1.50"), d("3.01")).is_ok());
        assert!(LineItem::new("apples", 2, d("1.50"), d("2.99")).is_ok());
        assert!(LineItem::new("apples", 3, d("0.333"), d("1.00")).is_ok());
    }

    #[test]
    fn test_line_item_total_mismatch() {
        let err = LineItem::new("apples", 2, d("1.50"), d("3.02")).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.issues()[0].field, "total_price");
        assert!(err.to_string().contains("doesn't match quantity × unit price"));
    }

    #[test]
    fn test_line_item_bad_quantity_skips_total_check() {
        let err = LineItem::try_from(LineItemDraft {
            description: "apples".to_string(),
            quantity: 0,
            unit_price: d("1.50"),
            total_price: d("99.00"),
        })
        .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["quantity"]);

        let err = LineItem::try_from(LineItemDraft {
            description: "apples".to_string(),
            quantity: -3,
            unit_price: d("-1.00"),
            total_price: d("3.00"),
        })
        .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["quantity", "unit_price"]);
    }

    #[test]
    fn test_expense_category_item_count_cross_check() {
        let ok = ExpenseCategory::new(
            CategoryLabel::FoodAndBeverage,
            d("4.50"),
            vec!["apples".to_string(), "apples".to_string()],
        )
        .unwrap();
        assert_eq!(ok.item_count(), 2);

        let err = ExpenseCategory::try_from(ExpenseCategoryDraft {
            category: CategoryLabel::HealthAndWellness,
            total_amount: d("12.00"),
            item_count: 3,
            items: vec!["vitamins".to_string()],
        })
        .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["item_count"]);
    }

    #[test]
    fn test_expense_category_empty() {
        let err = ExpenseCategory::new(CategoryLabel::LeisureAndEntertainment, d("0"), Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("must be at least 1"));
    }

    #[test]
    fn test_receipt_total_matches() {
        let receipt = Receipt::try_from(draft()).unwrap();
        assert_eq!(receipt.total_amount(), d("6.24"));
        assert_eq!(receipt.merchant_name(), "Store X");
        assert_eq!(receipt.line_items_total(), Some(d("3.00")));
    }

    #[test]
    fn test_receipt_total_boundary() {
        let mut at_boundary = draft();
        at_boundary.total_amount = d("6.25");
        assert!(Receipt::try_from(at_boundary).is_ok());

        let mut past_boundary = draft();
        past_boundary.total_amount = d("6.2501");
        let err = Receipt::try_from(past_boundary).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["total_amount"]);
    }

    #[test]
    fn test_receipt_collects_all_issues() {
        let mut bad = draft();
        bad.total_amount = d("7.00");
        bad.card_last_four = Some("12345".to_string());
        bad.extraction_confidence = 1.5;
        bad.line_items[0].total_price = d("4.00");

        let err = Receipt::try_from(bad).unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec![
                "line_items[0].total_price",
                "total_amount",
                "card_last_four",
                "extraction_confidence",
            ]
        );
    }

    #[test]
    fn test_line_item_product_overflow() {
        let err = LineItem::new("yacht", 2, d("50000000000000000000000000000"), d("1.00"))
            .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["total_price"]);
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_line_item_negative_total_far_from_product() {
        let err = LineItem::new("yacht", 1, Decimal::MAX, Decimal::MIN).unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["total_price", "total_price"]
        );
    }

    #[test]
    fn test_receipt_sum_overflow() {
        let mut bad = draft();
        bad.subtotal = d("50000000000000000000000000000");
        bad.tax_amount = d("50000000000000000000000000000");
        let err = Receipt::try_from(bad).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["total_amount"]);
        assert!(err.to_string().contains("subtotal + tax overflows"));
    }

    #[test]
    fn test_line_items_total_overflow() {
        let big = d("50000000000000000000000000000");
        let mut huge = draft();
        huge.line_items = vec![
            LineItemDraft {
                description: "yacht".to_string(),
                quantity: 1,
                unit_price: big,
                total_price: big,
            },
            LineItemDraft {
                description: "jet".to_string(),
                quantity: 1,
                unit_price: big,
                total_price: big,
            },
        ];
        let receipt = Receipt::try_from(huge).unwrap();
        assert_eq!(receipt.line_items_total(), None);
    }

    #[test]
    fn test_receipt_negative_amounts() {
        let mut bad = draft();
        bad.tax_amount = d("-0.24");
        bad.total_amount = d("5.76");
        let err = Receipt::try_from(bad).unwrap_err();
        // total check is skipped once a summand is invalid
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["tax_amount"]);
    }

    #[test]
    fn test_receipt_blank_merchant() {
        let mut bad = draft();
        bad.merchant_name = "   ".to_string();
        assert!(Receipt::try_from(bad).is_err());
    }

    #[test]
    fn test_populated_field_count() {
        let sparse = Receipt::try_from(draft()).unwrap();
        assert_eq!(sparse.populated_field_count(), 9);

        let mut full = draft();
        full.receipt_number = Some("R-1001".to_string());
        full.transaction_time = Some("14:32".to_string());
        full.merchant_location = Some("Main St 1".to_string());
        full.tax_rate = Some(d("0.04"));
        full.payment_method = Some(PaymentMethod::Card);
        full.card_last_four = Some("4242".to_string());
        let full = Receipt::try_from(full).unwrap();
        assert_eq!(full.populated_field_count(), 15);
    }

    #[test]
    fn test_populated_field_count_matches_serialized_keys() {
        let mut partial = draft();
        partial.payment_method = Some(PaymentMethod::Cash);
        partial.merchant_location = Some("Main St 1".to_string());
        let receipt = Receipt::try_from(partial).unwrap();

        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(value.as_object().unwrap().len(), receipt.populated_field_count());
    }

    #[test]
    fn test_deserialize_validates() {
        let value = json!({
            "transaction_date": "2024-03-01",
            "merchant_name": "Store X",
            "line_items": [],
            "subtotal": "6.00",
            "tax_amount": "0.24",
            "total_amount": "7.00"
        });
        let err = serde_json::from_value::<Receipt>(value).unwrap_err();
        assert!(err.to_string().contains("doesn't match subtotal + tax"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let receipt = Receipt::try_from(draft()).unwrap();
        let json = serde_json::to_string(&receipt).unwrap();
        let back: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn test_category_label_serde() {
        assert_eq!(
            serde_json::to_value(CategoryLabel::HouseholdAndUtilities).unwrap(),
            json!("Household & Utilities")
        );
        for label in CategoryLabel::ALL {
            let back: CategoryLabel = serde_json::from_value(json!(label.as_str())).unwrap();
            assert_eq!(back, label);
        }
    }
}
