use std::sync::Arc;

use chrono::{NaiveTime, TimeDelta, Timelike};

use crate::culture::Culture;
use crate::error::InferenceError;
use crate::formats::match_any_time;
use crate::size::SizeInfo;
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

use super::TypeDecider;

/// Clock-like values such as "13:11:59" or "9AM"
#[derive(Debug, Clone)]
pub struct TimeSpanDecider {
    culture: Arc<Culture>,
}

impl TimeSpanDecider {
    pub fn new(culture: Arc<Culture>) -> Self {
        Self { culture }
    }

    pub(crate) fn parse_time(&self, candidate: &str) -> Option<NaiveTime> {
        let text = candidate.trim();
        if text.is_empty() {
            return None;
        }
        match_any_time(text, &self.culture)
    }
}

impl TypeDecider for TimeSpanDecider {
    fn name(&self) -> &'static str {
        "TimeSpanDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::TimeSpan
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        CompatibilityGroup::Exclusive
    }

    fn accept(&self, candidate: &str, _size: &mut SizeInfo) -> bool {
        self.parse_time(candidate).is_some()
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        let time = self
            .parse_time(candidate)
            .ok_or_else(|| InferenceError::format(self.name(), candidate))?;
        Ok(TypedValue::TimeSpan(TimeDelta::seconds(i64::from(
            time.num_seconds_from_midnight(),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decider() -> TimeSpanDecider {
        TimeSpanDecider::new(Arc::new(Culture::invariant()))
    }

    #[test]
    fn test_accepts_clock_values() {
        let d = decider();
        let mut size = SizeInfo::default();
        for text in ["13:11:59", "9AM", "9 pm", "09:30", "12:00:00 AM"] {
            assert!(d.accept(text, &mut size), "{text}");
        }
        assert!(size.is_empty());
    }

    #[test]
    fn test_rejects_non_times() {
        let d = decider();
        let mut size = SizeInfo::default();
        for text in ["9", "12.5", "2001-01-01", "25:00", "noon", ""] {
            assert!(!d.accept(text, &mut size), "{text}");
        }
    }

    #[test]
    fn test_parse_to_duration() {
        let d = decider();
        assert_eq!(
            d.parse("13:11:59").unwrap(),
            TypedValue::TimeSpan(TimeDelta::hours(13) + TimeDelta::minutes(11) + TimeDelta::seconds(59))
        );
        assert_eq!(d.parse("9AM").unwrap(), TypedValue::TimeSpan(TimeDelta::hours(9)));
        assert!(matches!(d.parse("later"), Err(InferenceError::Format { .. })));
    }
}
