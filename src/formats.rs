//! Generated date and time format tables
//!
//! Formats use .NET-style tokens (`yyyy`, `MM`, `d`, `HH`, `tt`, ...) and are
//! compiled into anchored regular expressions once per process. Matching is whitespace tolerant
//! between tokens and resolves month names and AM/PM designators against a
//! [`Culture`].
//!
//! Two date tables are generated from the same cross product, one with the
//! month before the day and one with the day before the month. Both contain
//! the year-first forms.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::culture::{Culture, DateOrder};
use crate::error::InferenceError;

const DATE_SEPARATORS: [char; 4] = ['/', '-', '.', ' '];
const YEAR_TOKENS: [&str; 2] = ["yyyy", "yy"];
const MONTH_TOKENS: [&str; 4] = ["M", "MM", "MMM", "MMMM"];
const DAY_TOKENS: [&str; 2] = ["d", "dd"];

const TIME_SEPARATORS: [char; 2] = [':', '.'];
const HOUR_24_TOKENS: [&str; 2] = ["H", "HH"];
const HOUR_12_TOKENS: [&str; 2] = ["h", "hh"];
const MINUTE_TOKENS: [Option<&str>; 3] = [Some("m"), Some("mm"), None];
const SECOND_TOKENS: [Option<&str>; 3] = [Some("s"), Some("ss"), None];
const AM_PM_SUFFIXES: [&str; 2] = ["tt", " tt"];

static DATE_FORMATS_MD: Lazy<Vec<DateTimeFormat>> =
    Lazy::new(|| build_date_table(DateOrder::MonthDay));

static DATE_FORMATS_DM: Lazy<Vec<DateTimeFormat>> =
    Lazy::new(|| build_date_table(DateOrder::DayMonth));

static TIME_FORMATS: Lazy<Vec<DateTimeFormat>> = Lazy::new(build_time_table);

/// Digits a numeric token accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Digits {
    /// One or two digits (`d`, `M`, `H`, ...)
    OneOrTwo,
    /// Exactly two digits (`dd`, `MM`, `HH`, ...)
    Two,
}

impl Digits {
    fn regex(self) -> &'static str {
        match self {
            Digits::OneOrTwo => "[0-9]{1,2}",
            Digits::Two => "[0-9]{2}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    Month(Digits),
    MonthAbbreviated,
    MonthName,
    Day(Digits),
    Hour12(Digits),
    Hour24(Digits),
    Minute(Digits),
    Second(Digits),
    AmPm,
    Literal(char),
}

impl Token {
    fn regex(&self) -> String {
        match self {
            Token::Year4 => "(?P<year4>[0-9]{4})".to_string(),
            Token::Year2 => "(?P<year2>[0-9]{2})".to_string(),
            Token::Month(d) => format!("(?P<month>{})", d.regex()),
            Token::MonthAbbreviated | Token::MonthName => {
                r"(?P<month_name>\p{L}+\.?)".to_string()
            }
            Token::Day(d) => format!("(?P<day>{})", d.regex()),
            Token::Hour12(d) => format!("(?P<hour12>{})", d.regex()),
            Token::Hour24(d) => format!("(?P<hour24>{})", d.regex()),
            Token::Minute(d) => format!("(?P<minute>{})", d.regex()),
            Token::Second(d) => format!("(?P<second>{})", d.regex()),
            Token::AmPm => r"(?P<ampm>[\p{L}.]+)".to_string(),
            Token::Literal(c) if c.is_whitespace() => r"\s".to_string(),
            Token::Literal(c) => regex::escape(&c.to_string()),
        }
    }
}

/// Date/time fields captured by a successful match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Captured {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    hour12: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    pm: Option<bool>,
}

impl Captured {
    /// Read the named groups, resolving month names and designators
    /// against `culture`; unknown words fail the match
    fn from_captures(caps: &Captures<'_>, culture: &Culture, abbreviated: bool) -> Option<Self> {
        let month = match caps.name("month_name") {
            Some(word) => Some(resolve_month(word.as_str(), culture, abbreviated)?),
            None => group_number(caps, "month"),
        };
        let pm = match caps.name("ampm") {
            Some(word) => Some(resolve_am_pm(word.as_str(), culture)?),
            None => None,
        };
        let year = group_number(caps, "year4")
            .map(|y| y as i32)
            .or_else(|| group_number(caps, "year2").map(expand_two_digit_year));

        Some(Self {
            year,
            month,
            day: group_number(caps, "day"),
            hour: group_number(caps, "hour24"),
            hour12: group_number(caps, "hour12"),
            minute: group_number(caps, "minute"),
            second: group_number(caps, "second"),
            pm,
        })
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    fn time(&self) -> Option<NaiveTime> {
        let hour = match (self.hour, self.hour12) {
            (Some(h), _) => h,
            (None, Some(h)) => {
                if !(1..=12).contains(&h) {
                    return None;
                }
                h % 12 + if self.pm == Some(true) { 12 } else { 0 }
            }
            (None, None) => return None,
        };
        NaiveTime::from_hms_opt(hour, self.minute.unwrap_or(0), self.second.unwrap_or(0))
    }
}

/// A compiled date or time format
#[derive(Debug, Clone)]
pub struct DateTimeFormat {
    pattern: String,
    tokens: Vec<Token>,
    regex: Regex,
}

impl DateTimeFormat {
    /// Compile a .NET-style pattern such as `dd/MM/yyyy` or `h:mm tt`
    ///
    /// Characters that are not recognised tokens are matched literally and
    /// whitespace is allowed between any two tokens. A space in the pattern
    /// requires at least one whitespace character.
    pub fn compile(pattern: &str) -> Result<Self, InferenceError> {
        let tokens = tokenize(pattern);
        let body = tokens
            .iter()
            .map(Token::regex)
            .collect::<Vec<_>>()
            .join(r"\s*");
        let regex = Regex::new(&format!(r"^\s*{body}\s*$")).map_err(|e| {
            InferenceError::InvalidConfig(format!("Invalid date pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn uses_literal(&self, c: char) -> bool {
        self.tokens.contains(&Token::Literal(c))
    }

    /// Match the whole of `text`, returning the captured fields
    pub(crate) fn capture(&self, text: &str, culture: &Culture) -> Option<Captured> {
        let caps = self.regex.captures(text)?;
        let abbreviated = self.tokens.contains(&Token::MonthAbbreviated);
        Captured::from_captures(&caps, culture, abbreviated)
    }

    /// Match `text` as a calendar date
    pub fn match_date(&self, text: &str, culture: &Culture) -> Option<NaiveDate> {
        self.capture(text, culture)?.date()
    }

    /// Match `text` as a time of day
    pub fn match_time(&self, text: &str, culture: &Culture) -> Option<NaiveTime> {
        self.capture(text, culture)?.time()
    }

    /// Match `text` as a date optionally followed by a time of day
    pub(crate) fn match_date_time(
        &self,
        text: &str,
        culture: &Culture,
    ) -> Option<(NaiveDate, Option<NaiveTime>)> {
        let captured = self.capture(text, culture)?;
        let date = captured.date()?;
        if captured.hour.is_some() || captured.hour12.is_some() {
            Some((date, Some(captured.time()?)))
        } else {
            Some((date, None))
        }
    }
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let digits = if run >= 2 { Digits::Two } else { Digits::OneOrTwo };
        let (token, consumed) = match c {
            'y' if run >= 4 => (Token::Year4, 4),
            'y' if run >= 2 => (Token::Year2, 2),
            'M' if run >= 4 => (Token::MonthName, 4),
            'M' if run == 3 => (Token::MonthAbbreviated, 3),
            'M' => (Token::Month(digits), run.min(2)),
            'd' if run <= 2 => (Token::Day(digits), run),
            'h' if run <= 2 => (Token::Hour12(digits), run),
            'H' if run <= 2 => (Token::Hour24(digits), run),
            'm' if run <= 2 => (Token::Minute(digits), run),
            's' if run <= 2 => (Token::Second(digits), run),
            't' => (Token::AmPm, run.min(2)),
            other => (Token::Literal(other), 1),
        };
        tokens.push(token);
        i += consumed;
    }
    tokens
}

fn group_number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn resolve_month(word: &str, culture: &Culture, abbreviated: bool) -> Option<u32> {
    culture.month_from_name(word, abbreviated).or_else(|| {
        // "janv." is stored with its dot, "Jan." is not
        culture.month_from_name(word.strip_suffix('.')?, abbreviated)
    })
}

fn resolve_am_pm(word: &str, culture: &Culture) -> Option<bool> {
    [
        (culture.am_designator.as_str(), false),
        (culture.pm_designator.as_str(), true),
        ("AM", false),
        ("PM", true),
    ]
    .iter()
    .find(|(designator, _)| !designator.is_empty() && designator.eq_ignore_ascii_case(word))
    .map(|(_, pm)| *pm)
}

/// Two-digit years map into 1950..=2049
fn expand_two_digit_year(yy: u32) -> i32 {
    let yy = yy as i32;
    if yy < 50 { 2000 + yy } else { 1900 + yy }
}

fn build_date_table(order: DateOrder) -> Vec<DateTimeFormat> {
    let mut table = Vec::new();
    for y in YEAR_TOKENS {
        for m in MONTH_TOKENS {
            for d in DAY_TOKENS {
                for sep in DATE_SEPARATORS {
                    let pattern = match order {
                        DateOrder::MonthDay => format!("{m}{sep}{d}{sep}{y}"),
                        DateOrder::DayMonth => format!("{d}{sep}{m}{sep}{y}"),
                    };
                    table.push(generated(&pattern));
                    table.push(generated(&format!("{y}{sep}{m}{sep}{d}")));
                }
            }
        }
    }
    table
}

fn build_time_table() -> Vec<DateTimeFormat> {
    let mut table = Vec::new();
    for sep in TIME_SEPARATORS {
        for minute in MINUTE_TOKENS {
            for second in SECOND_TOKENS {
                let clock = match (minute, second) {
                    (None, Some(_)) => continue,
                    (Some(m), Some(s)) => format!("{sep}{m}{sep}{s}"),
                    (Some(m), None) => format!("{sep}{m}"),
                    (None, None) => String::new(),
                };
                // A bare hour is only a time when it carries AM/PM
                if !clock.is_empty() {
                    for h in HOUR_24_TOKENS {
                        push_unique(&mut table, format!("{h}{clock}"));
                    }
                }
                for h in HOUR_12_TOKENS {
                    for suffix in AM_PM_SUFFIXES {
                        push_unique(&mut table, format!("{h}{clock}{suffix}"));
                    }
                }
            }
        }
    }
    table
}

// Hour-only patterns carry no separator and would repeat per separator
fn push_unique(table: &mut Vec<DateTimeFormat>, pattern: String) {
    if !table.iter().any(|f| f.pattern == pattern) {
        table.push(generated(&pattern));
    }
}

fn generated(pattern: &str) -> DateTimeFormat {
    DateTimeFormat::compile(pattern).unwrap()
}

/// The generated date-only table for a day/month order
pub fn date_formats(order: DateOrder) -> &'static [DateTimeFormat] {
    match order {
        DateOrder::MonthDay => &DATE_FORMATS_MD,
        DateOrder::DayMonth => &DATE_FORMATS_DM,
    }
}

/// The generated time-only table
pub fn time_formats() -> &'static [DateTimeFormat] {
    &TIME_FORMATS
}

/// Match `text` against the date table for `order`
pub fn match_any_date(text: &str, order: DateOrder, culture: &Culture) -> Option<NaiveDate> {
    date_formats(order)
        .iter()
        .find_map(|f| f.match_date(text, culture))
}

/// Match `text` against the time table, honouring the culture's separator
pub fn match_any_time(text: &str, culture: &Culture) -> Option<NaiveTime> {
    time_formats()
        .iter()
        .filter(|f| !f.uses_literal('.') || culture.time_separator == '.')
        .find_map(|f| f.match_time(text, culture))
}
