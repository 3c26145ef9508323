//! Regex patterns for receipt field checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Last four digits of a payment card, nothing else
    pub static ref CARD_LAST_FOUR: Regex = Regex::new(r"^\d{4}$").unwrap();
}

/// Check a card suffix against [`CARD_LAST_FOUR`].
pub fn is_card_last_four(s: &str) -> bool {
    CARD_LAST_FOUR.is_match(s)
}
