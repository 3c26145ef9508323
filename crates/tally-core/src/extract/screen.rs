//! Local pre-check gating provider calls.

use std::fmt;

/// Shortest accepted input, counted in characters after trimming.
pub const MIN_INPUT_CHARS: usize = 10;

/// Substrings that make an input suspicious (matched case-insensitively).
pub const SUSPICIOUS_PATTERNS: &[&str] = &["hack", "password", "login", "admin", "root"];

/// Why the screener refused an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenRejection {
    /// Nothing but whitespace.
    Empty,
    /// Fewer than [`MIN_INPUT_CHARS`] characters after trimming.
    TooShort { length: usize },
    /// Contains one of [`SUSPICIOUS_PATTERNS`].
    Suspicious { pattern: &'static str },
}

impl fmt::Display for ScreenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenRejection::Empty => write!(f, "input is empty"),
            ScreenRejection::TooShort { length } => write!(
                f,
                "input is too short ({} characters, minimum {})",
                length, MIN_INPUT_CHARS
            ),
            ScreenRejection::Suspicious { pattern } => {
                write!(f, "input contains suspicious pattern '{}'", pattern)
            }
        }
    }
}

/// Cheap gate in front of the provider.
///
/// Stops empty or near-empty input and text containing a small denylist of
/// words before any quota is spent. The denylist is a crude heuristic, not
/// input sanitization: it both misses hostile text and rejects innocent
/// receipts (a "Root Beer" line item is refused).
#[derive(Debug, Clone, Copy, Default)]
pub struct InputScreener;

impl InputScreener {
    pub fn new() -> Self {
        Self
    }

    /// Check `text`; pure and stateless.
    pub fn screen(&self, text: &str) -> Result<(), ScreenRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ScreenRejection::Empty);
        }

        let length = trimmed.chars().count();
        if length < MIN_INPUT_CHARS {
            return Err(ScreenRejection::TooShort { length });
        }

        let lowered = text.to_lowercase();
        if let Some(pattern) = SUSPICIOUS_PATTERNS.iter().find(|p| lowered.contains(*p)) {
            return Err(ScreenRejection::Suspicious { pattern: *pattern });
        }

        Ok(())
    }

    pub fn is_valid(&self, text: &str) -> bool {
        self.screen(text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short() {
        let screener = InputScreener::new();
        assert_eq!(screener.screen(""), Err(ScreenRejection::Empty));
        assert_eq!(screener.screen(" \n\t "), Err(ScreenRejection::Empty));
        assert_eq!(
            screener.screen("   milk 2   "),
            Err(ScreenRejection::TooShort { length: 6 })
        );
        assert_eq!(
            screener.screen("123456789"),
            Err(ScreenRejection::TooShort { length: 9 })
        );
        assert!(screener.is_valid("1234567890"));
    }

    #[test]
    fn test_length_counts_characters() {
        // 9 characters, more than 10 bytes
        assert_eq!(
            InputScreener::new().screen("ééééééééé"),
            Err(ScreenRejection::TooShort { length: 9 })
        );
    }

    #[test]
    fn test_suspicious_patterns() {
        let screener = InputScreener::new();
        assert_eq!(
            screener.screen("Please reset my PASSWORD for the store account"),
            Err(ScreenRejection::Suspicious { pattern: "password" })
        );
        assert_eq!(
            screener.screen("Root Beer 2x $1.50 total $3.00"),
            Err(ScreenRejection::Suspicious { pattern: "root" })
        );
        assert!(screener.is_valid("Store X, apples $3.00, tax $0.24, total $3.24"));
    }

    #[test]
    fn test_screen_is_idempotent() {
        let screener = InputScreener::new();
        for text in ["", "short", "admin console login", "Store X, apples $3.00 total"] {
            assert_eq!(screener.screen(text), screener.screen(text));
        }
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            ScreenRejection::TooShort { length: 4 }.to_string(),
            "input is too short (4 characters, minimum 10)"
        );
        assert_eq!(
            ScreenRejection::Suspicious { pattern: "hack" }.to_string(),
            "input contains suspicious pattern 'hack'"
        );
    }
}
