use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::culture::Culture;
use crate::error::InferenceError;
use crate::size::{SizeInfo, digit_count};
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

use super::TypeDecider;

/// Zero-padded codes ("01", "-007") must stay text
fn has_leading_zero(integral_digits: &str) -> bool {
    integral_digits.len() > 1 && integral_digits.starts_with('0')
}

/// Digits before and after the separator, read from the value's mantissa and scale
pub fn decimal_size(value: &Decimal) -> SizeInfo {
    let scale = value.scale();
    let digits = digit_count(value.mantissa().unsigned_abs());
    SizeInfo::new(digits.saturating_sub(scale), scale)
}

/// Whole numbers that fit in 32 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDecider;

impl IntegerDecider {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn parse_i32(&self, candidate: &str) -> Option<i32> {
        let text = candidate.trim();
        let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
        if has_leading_zero(unsigned) {
            return None;
        }
        text.parse().ok()
    }
}

impl TypeDecider for IntegerDecider {
    fn name(&self) -> &'static str {
        "IntegerDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::Integer
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        CompatibilityGroup::Numerical
    }

    fn accept(&self, candidate: &str, size: &mut SizeInfo) -> bool {
        match self.parse_i32(candidate) {
            Some(value) => {
                size.increase_before(digit_count(u128::from(value.unsigned_abs())));
                true
            }
            None => false,
        }
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        self.parse_i32(candidate)
            .map(TypedValue::Integer)
            .ok_or_else(|| InferenceError::format(self.name(), candidate))
    }
}

/// Culture-formatted decimal numbers
#[derive(Debug, Clone)]
pub struct DecimalDecider {
    culture: Arc<Culture>,
}

impl DecimalDecider {
    pub fn new(culture: Arc<Culture>) -> Self {
        Self { culture }
    }

    /// Rewrite culture-formatted text into `[-]digits[.digits][e[-]digits]`
    ///
    /// Returns the canonical text and whether it uses an exponent.
    fn canonicalize(&self, text: &str) -> Option<(String, bool)> {
        let decimal_sep = self.culture.decimal_separator;
        let group_sep = self.culture.group_separator;

        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        if let Some(&sign) = chars.peek() {
            if sign == '-' || sign == '+' {
                if sign == '-' {
                    out.push('-');
                }
                chars.next();
            }
        }

        let mut integral = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                integral.push(c);
                chars.next();
            } else if c == group_sep && !integral.is_empty() {
                chars.next();
                // a group separator must sit between digits
                if !chars.peek().is_some_and(|n| n.is_ascii_digit()) {
                    return None;
                }
            } else {
                break;
            }
        }
        if has_leading_zero(&integral) {
            return None;
        }

        let mut fraction = String::new();
        if chars.peek() == Some(&decimal_sep) {
            chars.next();
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                fraction.push(c);
                chars.next();
            }
        }
        if integral.is_empty() && fraction.is_empty() {
            return None;
        }

        out.push_str(if integral.is_empty() { "0" } else { &integral });
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(&fraction);
        }

        let mut scientific = false;
        if matches!(chars.peek(), Some(&'e') | Some(&'E')) {
            chars.next();
            out.push('e');
            if let Some(&sign) = chars.peek() {
                if sign == '-' || sign == '+' {
                    out.push(sign);
                    chars.next();
                }
            }
            let mut exponent_digits = 0;
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                out.push(c);
                exponent_digits += 1;
                chars.next();
            }
            if exponent_digits == 0 {
                return None;
            }
            scientific = true;
        }

        if chars.next().is_some() {
            return None;
        }
        Some((out, scientific))
    }

    /// Parse culture-formatted text; fractional zeros are trimmed unless scientific
    pub(crate) fn parse_decimal(&self, candidate: &str) -> Option<Decimal> {
        let (canonical, scientific) = self.canonicalize(candidate.trim())?;
        if scientific {
            Decimal::from_scientific(&canonical).ok()
        } else {
            Decimal::from_str(&canonical).ok().map(|d| d.normalize())
        }
    }
}

impl TypeDecider for DecimalDecider {
    fn name(&self) -> &'static str {
        "DecimalDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::Decimal
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        CompatibilityGroup::Numerical
    }

    fn accept(&self, candidate: &str, size: &mut SizeInfo) -> bool {
        match self.parse_decimal(candidate) {
            Some(value) => {
                *size = size.combine(decimal_size(&value));
                true
            }
            None => false,
        }
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        self.parse_decimal(candidate)
            .map(TypedValue::Decimal)
            .ok_or_else(|| InferenceError::format(self.name(), candidate))
    }
}
