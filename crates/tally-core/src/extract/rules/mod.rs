//! Field rules shared by the receipt model.

pub mod amounts;
pub mod patterns;

pub use amounts::{TOLERANCE, amounts_match, format_amount};
pub use patterns::*;
