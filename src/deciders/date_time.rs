use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, trace, warn};

use crate::culture::{Culture, DateOrder};
use crate::error::InferenceError;
use crate::formats::{DateTimeFormat, match_any_date, match_any_time};
use crate::size::SizeInfo;
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

use super::TypeDecider;
use super::numeric::DecimalDecider;
use super::time_span::TimeSpanDecider;

const ISO_DATE_TIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Time suffixes tried after the culture's short date pattern
const CULTURE_TIME_SUFFIXES: [&str; 4] = [" H:mm:ss", " H:mm", " h:mm:ss tt", " h:mm tt"];

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

/// Date used for time-only values
fn epoch_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
}

/// Dates and date-times, guessing the format when none is given
///
/// Parsing tries the culture's own formats first, then the generated tables
/// for the active day/month order. Text that also reads as a decimal or a
/// time of day is never accepted as a date.
#[derive(Debug, Clone)]
pub struct DateTimeDecider {
    culture: Arc<Culture>,
    culture_formats: Arc<[DateTimeFormat]>,
    order: DateOrder,
    explicit_formats: Option<Arc<[String]>>,
    guess_enabled: bool,
    decimal: DecimalDecider,
    time_span: TimeSpanDecider,
}

impl DateTimeDecider {
    pub fn new(culture: Arc<Culture>) -> Self {
        let short = culture.short_date_pattern.as_str();
        let culture_formats: Vec<DateTimeFormat> = std::iter::once(short.to_string())
            .chain(CULTURE_TIME_SUFFIXES.iter().map(|s| format!("{short}{s}")))
            .filter_map(|p| match DateTimeFormat::compile(&p) {
                Ok(format) => Some(format),
                Err(e) => {
                    warn!("Skipping culture date pattern: {}", e);
                    None
                }
            })
            .collect();

        Self {
            order: culture.date_order,
            culture_formats: culture_formats.into(),
            explicit_formats: None,
            guess_enabled: true,
            decimal: DecimalDecider::new(Arc::clone(&culture)),
            time_span: TimeSpanDecider::new(Arc::clone(&culture)),
            culture,
        }
    }

    /// Use only these chrono formats, bypassing the generated tables
    pub fn with_explicit_formats(mut self, formats: Option<Vec<String>>) -> Self {
        self.explicit_formats = formats.map(Into::into);
        self
    }

    /// Enable or disable `guess_date_format`
    pub fn with_guessing(mut self, enabled: bool) -> Self {
        self.set_guessing(enabled);
        self
    }

    pub fn set_guessing(&mut self, enabled: bool) {
        self.guess_enabled = enabled;
    }

    pub fn date_order(&self) -> DateOrder {
        self.order
    }

    pub fn set_date_order(&mut self, order: DateOrder) {
        self.order = order;
    }

    fn guessing_allowed(&self) -> bool {
        self.guess_enabled && self.explicit_formats.is_none()
    }

    /// Pick the day/month order that matches more of `samples`
    ///
    /// Samples the culture's free-form parse already understands are not
    /// counted. Day-first wins only with strictly more matches.
    pub fn guess_date_format<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.guessing_allowed() {
            trace!("Date format guessing suppressed");
            return;
        }

        let (mut day_month, mut month_day) = (0usize, 0usize);
        for sample in samples {
            let text = sample.trim();
            if text.is_empty() || self.free_form(text).is_some() {
                continue;
            }
            if self.match_tables(text, DateOrder::DayMonth).is_some() {
                day_month += 1;
            }
            if self.match_tables(text, DateOrder::MonthDay).is_some() {
                month_day += 1;
            }
        }

        self.order = if day_month > month_day {
            DateOrder::DayMonth
        } else {
            DateOrder::MonthDay
        };
        debug!(
            "Guessed date order {:?} ({} day-first, {} month-first matches)",
            self.order, day_month, month_day
        );
    }

    fn parse_explicit(&self, text: &str, formats: &[String]) -> Option<NaiveDateTime> {
        formats.iter().find_map(|fmt| {
            NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .or_else(|| NaiveDate::parse_from_str(text, fmt).ok().and_then(midnight))
        })
    }

    /// ISO 8601 / RFC 3339 and the culture's short date pattern
    fn free_form(&self, text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = text.parse::<NaiveDateTime>() {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }
        if let Some(dt) = ISO_DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        {
            return Some(dt);
        }
        if let Ok(date) = text.parse::<NaiveDate>() {
            return midnight(date);
        }
        self.culture_formats.iter().find_map(|f| {
            let (date, time) = f.match_date_time(text, &self.culture)?;
            match time {
                Some(time) => Some(date.and_time(time)),
                None => midnight(date),
            }
        })
    }

    /// Generated tables only, for the given day/month order
    fn match_tables(&self, text: &str, order: DateOrder) -> Option<NaiveDateTime> {
        if !text.contains(' ') {
            if let Some(time) = match_any_time(text, &self.culture) {
                return Some(epoch_date()?.and_time(time));
            }
            return match_any_date(text, order, &self.culture).and_then(midnight);
        }

        if let Some((left, right)) = text.split_once(' ') {
            let date = match_any_date(left, order, &self.culture);
            let time: Option<NaiveTime> = match_any_time(right.trim(), &self.culture);
            if let (Some(date), Some(time)) = (date, time) {
                return Some(date.and_time(time));
            }
        }
        match_any_date(text, order, &self.culture).and_then(midnight)
    }

    /// Parse `text` as a date/time without the decimal/time-of-day exclusion
    pub(crate) fn parse_date_time(&self, candidate: &str) -> Option<NaiveDateTime> {
        let text = candidate.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(formats) = &self.explicit_formats {
            return self.parse_explicit(text, formats);
        }
        self.free_form(text)
            .or_else(|| self.match_tables(text, self.order))
    }
}

impl TypeDecider for DateTimeDecider {
    fn name(&self) -> &'static str {
        "DateTimeDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::DateTime
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        CompatibilityGroup::Exclusive
    }

    fn accept(&self, candidate: &str, _size: &mut SizeInfo) -> bool {
        if self.explicit_formats.is_none()
            && (self.decimal.parse_decimal(candidate).is_some()
                || self.time_span.parse_time(candidate).is_some())
        {
            return false;
        }
        self.parse_date_time(candidate).is_some()
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        self.parse_date_time(candidate)
            .map(TypedValue::DateTime)
            .ok_or_else(|| InferenceError::format(self.name(), candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decider() -> DateTimeDecider {
        DateTimeDecider::new(Arc::new(Culture::invariant()))
    }

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn accepts(d: &DateTimeDecider, text: &str) -> bool {
        d.accept(text, &mut SizeInfo::default())
    }

    #[test]
    fn test_iso_free_form() {
        let d = decider();
        assert_eq!(d.parse_date_time("2001-01-01"), Some(ymd_hms(2001, 1, 1, 0, 0, 0)));
        assert_eq!(
            d.parse_date_time("2001-01-01T10:30:00"),
            Some(ymd_hms(2001, 1, 1, 10, 30, 0))
        );
        assert_eq!(
            d.parse_date_time("2001-01-01 10:30:00"),
            Some(ymd_hms(2001, 1, 1, 10, 30, 0))
        );
        assert_eq!(
            d.parse_date_time("2001-01-01T10:30:00+02:00"),
            Some(ymd_hms(2001, 1, 1, 8, 30, 0))
        );
    }

    #[test]
    fn test_tables_and_split_on_space() {
        let d = decider();
        assert_eq!(d.parse_date_time("1/31/2001"), Some(ymd_hms(2001, 1, 31, 0, 0, 0)));
        assert_eq!(
            d.parse_date_time("1-31-01 9:15 PM"),
            Some(ymd_hms(2001, 1, 31, 21, 15, 0))
        );
        assert_eq!(d.parse_date_time("Jan 5 2001"), Some(ymd_hms(2001, 1, 5, 0, 0, 0)));
        assert_eq!(d.parse_date_time("31/1/2001"), None);
    }

    #[test]
    fn test_rejects_decimals_and_times() {
        let d = decider();
        assert!(!accepts(&d, "2001"));
        assert!(!accepts(&d, "12.5"));
        assert!(!accepts(&d, "13:11:59"));
        assert!(accepts(&d, "2001-01-01"));
        assert!(!accepts(&d, "hello"));
        // still parseable once the column is settled
        assert!(d.parse("13:11:59").is_ok());
    }

    #[test]
    fn test_guess_switches_to_day_month() {
        let mut d = decider();
        assert_eq!(d.date_order(), DateOrder::MonthDay);
        d.guess_date_format(["13/01/2001", "25/12/2001", "01/02/2001", "2001-01-01"]);
        assert_eq!(d.date_order(), DateOrder::DayMonth);
        assert_eq!(d.parse_date_time("2/3/2001"), Some(ymd_hms(2001, 3, 2, 0, 0, 0)));
        // the culture's own pattern still wins
        assert_eq!(d.parse_date_time("02/03/2001"), Some(ymd_hms(2001, 2, 3, 0, 0, 0)));
    }

    #[test]
    fn test_guess_tie_stays_month_day() {
        let mut d = decider();
        d.set_date_order(DateOrder::DayMonth);
        d.guess_date_format(["01/02/2001", "03/04/2001"]);
        assert_eq!(d.date_order(), DateOrder::MonthDay);
    }

    #[test]
    fn test_guess_suppressed() {
        let mut d = decider().with_guessing(false);
        d.guess_date_format(["13/01/2001"]);
        assert_eq!(d.date_order(), DateOrder::MonthDay);

        let mut d = decider().with_explicit_formats(Some(vec!["%Y%m%d".to_string()]));
        d.guess_date_format(["13/01/2001"]);
        assert_eq!(d.date_order(), DateOrder::MonthDay);
    }

    #[test]
    fn test_explicit_formats_are_exclusive() {
        let d = decider().with_explicit_formats(Some(vec!["%d|%m|%Y".to_string()]));
        assert!(accepts(&d, "31|12|2001"));
        assert!(!accepts(&d, "2001-12-31"));
        assert_eq!(
            d.parse("31|12|2001").unwrap(),
            TypedValue::DateTime(ymd_hms(2001, 12, 31, 0, 0, 0))
        );
        assert!(d.parse("12/31/2001").is_err());
    }

    #[test]
    fn test_culture_short_date() {
        let de = DateTimeDecider::new(Arc::new(Culture::builtin("de-DE").unwrap()));
        assert_eq!(de.date_order(), DateOrder::DayMonth);
        assert_eq!(de.parse_date_time("31.12.2001"), Some(ymd_hms(2001, 12, 31, 0, 0, 0)));
        assert_eq!(
            de.parse_date_time("31.12.2001 14:05"),
            Some(ymd_hms(2001, 12, 31, 14, 5, 0))
        );
        assert_eq!(de.parse_date_time("3 März 2001"), Some(ymd_hms(2001, 3, 3, 0, 0, 0)));
    }
}
