//! System instructions sent with each completion request.

use crate::models::receipt::CategoryLabel;

use super::DocumentType;

/// Instructions for the given document type.
pub fn system_prompt(document_type: DocumentType) -> String {
    match document_type {
        DocumentType::Receipt => receipt_prompt(),
    }
}

fn receipt_prompt() -> String {
    let mut prompt = String::from(
        "Extract receipt information including items, payment details and merchant info.\n\
         \n\
         Rules:\n\
         - Each line item's total_price must equal quantity × unit_price.\n\
         - total_amount must equal subtotal + tax_amount.\n\
         - card_last_four is exactly 4 digits, or null when no card is shown.\n\
         - Dates use YYYY-MM-DD. Use null for anything not present on the receipt.\n\
         - Set extraction_confidence between 0.0 and 1.0.\n\
         \n\
         IMPORTANT: Categorize all purchases into these specific expense categories:\n",
    );

    for label in CategoryLabel::ALL {
        prompt.push_str("- ");
        prompt.push_str(label.as_str());
        prompt.push('\n');
    }

    prompt.push_str(
        "\nFor each category, item_count must equal the number of entries in items.\n",
    );
    prompt
}
