//! Digit-count bookkeeping for numeric columns

use serde::{Deserialize, Serialize};

/// Digits before and after the decimal separator seen so far
///
/// `SizeInfo` is a plain value: deciders grow a copy while probing a
/// candidate and the inferrer only keeps it once the candidate is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    /// Digits in the integral part
    pub digits_before_decimal: u32,
    /// Digits in the fractional part
    pub digits_after_decimal: u32,
}

impl SizeInfo {
    pub fn new(digits_before_decimal: u32, digits_after_decimal: u32) -> Self {
        Self {
            digits_before_decimal,
            digits_after_decimal,
        }
    }

    /// Total number of significant digits
    pub fn precision(&self) -> u32 {
        self.digits_before_decimal + self.digits_after_decimal
    }

    /// Digits after the decimal separator
    pub fn scale(&self) -> u32 {
        self.digits_after_decimal
    }

    pub fn is_empty(&self) -> bool {
        self.precision() == 0
    }

    /// Component-wise maximum of two sizes
    pub fn combine(self, other: SizeInfo) -> SizeInfo {
        SizeInfo {
            digits_before_decimal: self.digits_before_decimal.max(other.digits_before_decimal),
            digits_after_decimal: self.digits_after_decimal.max(other.digits_after_decimal),
        }
    }

    /// Grow the integral digit count in place
    pub fn increase_before(&mut self, digits: u32) {
        self.digits_before_decimal = self.digits_before_decimal.max(digits);
    }

    /// Grow the fractional digit count in place
    pub fn increase_after(&mut self, digits: u32) {
        self.digits_after_decimal = self.digits_after_decimal.max(digits);
    }

    /// Characters needed to print a value of this size (no sign)
    pub fn string_length(&self) -> usize {
        let separator = usize::from(self.digits_after_decimal > 0);
        (self.precision() as usize) + separator
    }

    /// True if `self` is at least as large as `other` in both components
    pub fn dominates(&self, other: &SizeInfo) -> bool {
        self.digits_before_decimal >= other.digits_before_decimal
            && self.digits_after_decimal >= other.digits_after_decimal
    }
}

/// Number of decimal digits in `n`, with zero counted as one digit
pub fn digit_count(n: u128) -> u32 {
    if n == 0 { 1 } else { n.ilog10() + 1 }
}
