//! Combining results from independent passes over the same column

use std::borrow::Cow;

use crate::error::InferenceError;
use crate::inferrer::InferredColumnType;
use crate::types::PreferenceOrder;

impl PreferenceOrder {
    /// The larger of two results for the same logical column
    ///
    /// When the types differ, the type earlier in this order wins with its
    /// own width, size and counts. When they match, each dimension takes the
    /// maximum, and an unset width counts as zero. A result that already
    /// dominates is returned as is.
    pub fn max<'a>(
        &self,
        first: &'a InferredColumnType,
        second: &'a InferredColumnType,
    ) -> Result<Cow<'a, InferredColumnType>, InferenceError> {
        let (winner, other) = match (
            self.position(first.candidate_type),
            self.position(second.candidate_type),
        ) {
            (None, None) => {
                return Err(InferenceError::UnsupportedCombination {
                    first: first.candidate_type.to_string(),
                    second: second.candidate_type.to_string(),
                });
            }
            (Some(a), Some(b)) if a > b => (second, first),
            (None, Some(_)) => (second, first),
            _ => (first, second),
        };

        if winner.candidate_type != other.candidate_type {
            if winner.unicode || !other.unicode {
                return Ok(Cow::Borrowed(winner));
            }
            return Ok(Cow::Owned(InferredColumnType {
                unicode: true,
                ..winner.clone()
            }));
        }

        // Two unset widths merge to zero, so neither side can stand in
        let width_known = first.width.is_some() || second.width.is_some();
        if width_known && first.dominates(second) {
            return Ok(Cow::Borrowed(first));
        }
        if width_known && second.dominates(first) {
            return Ok(Cow::Borrowed(second));
        }
        Ok(Cow::Owned(InferredColumnType {
            candidate_type: first.candidate_type,
            width: Some(first.width.unwrap_or(0).max(second.width.unwrap_or(0))),
            size: first.size.combine(second.size),
            unicode: first.unicode || second.unicode,
            value_count: first.value_count.max(second.value_count),
            null_count: first.null_count.max(second.null_count),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SizeInfo;
    use crate::types::CandidateType;

    fn result(ty: CandidateType, width: Option<usize>, size: SizeInfo) -> InferredColumnType {
        InferredColumnType {
            candidate_type: ty,
            width,
            size,
            unicode: false,
            value_count: 1,
            null_count: 0,
        }
    }

    #[test]
    fn test_earlier_type_wins() {
        let order = PreferenceOrder::default();
        let integer = result(CandidateType::Integer, Some(3), SizeInfo::new(3, 0));
        let mut string = result(CandidateType::String, Some(20), SizeInfo::default());
        string.unicode = true;

        let combined = order.max(&string, &integer).unwrap();
        assert_eq!(combined.candidate_type, CandidateType::Integer);
        assert_eq!(combined.width, Some(3));
        assert!(combined.unicode);
        assert!(matches!(combined, Cow::Owned(_)));
    }

    #[test]
    fn test_same_type_takes_maximum() {
        let order = PreferenceOrder::default();
        let a = result(CandidateType::Decimal, Some(5), SizeInfo::new(4, 0));
        let b = result(CandidateType::Decimal, None, SizeInfo::new(0, 3));
        let combined = order.max(&a, &b).unwrap();
        assert_eq!(combined.size, SizeInfo::new(4, 3));
        assert_eq!(combined.width, Some(5));
    }

    #[test]
    fn test_same_type_with_unset_widths_gives_zero() {
        let order = PreferenceOrder::default();
        let a = result(CandidateType::Decimal, None, SizeInfo::new(2, 3));
        let b = result(CandidateType::Decimal, None, SizeInfo::new(4, 1));
        let combined = order.max(&a, &b).unwrap();
        assert_eq!(combined.width, Some(0));
        assert_eq!(combined.size, SizeInfo::new(4, 3));

        let c = result(CandidateType::Decimal, None, SizeInfo::new(1, 1));
        assert_eq!(order.max(&b, &c).unwrap().width, Some(0));
    }

    #[test]
    fn test_dominating_result_is_returned_by_identity() {
        let order = PreferenceOrder::default();
        let big = result(CandidateType::Decimal, Some(8), SizeInfo::new(4, 3));
        let small = result(CandidateType::Decimal, Some(3), SizeInfo::new(1, 1));
        match order.max(&small, &big).unwrap() {
            Cow::Borrowed(r) => assert!(std::ptr::eq(r, &big)),
            Cow::Owned(_) => panic!("expected the dominating result"),
        }
    }

    #[test]
    fn test_types_outside_order_fail() {
        let order = PreferenceOrder::new(vec![CandidateType::Integer, CandidateType::String]).unwrap();
        let a = result(CandidateType::Boolean, Some(4), SizeInfo::default());
        let b = result(CandidateType::DateTime, Some(27), SizeInfo::default());
        let err = order.max(&a, &b).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnsupportedCombination {
                first: "boolean".to_string(),
                second: "date-time".to_string(),
            }
        );

        // one side in the order is enough
        let c = result(CandidateType::Integer, Some(2), SizeInfo::new(2, 0));
        assert_eq!(order.max(&a, &c).unwrap().candidate_type, CandidateType::Integer);
    }
}
