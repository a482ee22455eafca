//! Read-only culture formatting data
//!
//! Deciders consult a [`Culture`] for number separators, the short date
//! pattern, the day/month order and month names. The inferrer never mutates
//! it; registries share it behind an `Arc`.

use serde::{Deserialize, Serialize};

/// Relative position of day and month in numeric dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateOrder {
    /// e.g. 12/31/2001
    MonthDay,
    /// e.g. 31/12/2001
    DayMonth,
}

/// Number and date formatting conventions for one culture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Culture {
    /// Culture name, e.g. `en-US`; used as the registry cache key
    pub name: String,
    pub decimal_separator: char,
    pub group_separator: char,
    pub time_separator: char,
    /// Short date pattern in `d`/`M`/`y` tokens, e.g. `M/d/yyyy`
    pub short_date_pattern: String,
    pub date_order: DateOrder,
    pub am_designator: String,
    pub pm_designator: String,
    /// Full month names, January first
    pub month_names: Vec<String>,
    /// Abbreviated month names, January first
    pub abbreviated_month_names: Vec<String>,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

const FRENCH_ABBREVIATED_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn abbreviate(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.chars().take(3).collect()).collect()
}

impl Culture {
    /// Culture-neutral conventions (English names, month before day)
    pub fn invariant() -> Self {
        Self {
            name: String::new(),
            decimal_separator: '.',
            group_separator: ',',
            time_separator: ':',
            short_date_pattern: "MM/dd/yyyy".to_string(),
            date_order: DateOrder::MonthDay,
            am_designator: "AM".to_string(),
            pm_designator: "PM".to_string(),
            month_names: owned(&ENGLISH_MONTHS),
            abbreviated_month_names: abbreviate(&ENGLISH_MONTHS),
        }
    }

    /// Look up one of the built-in cultures by name (case-insensitive)
    pub fn builtin(name: &str) -> Option<Self> {
        let culture = match name.to_ascii_lowercase().as_str() {
            "" | "invariant" => Self::invariant(),
            "en-us" => Self {
                name: "en-US".to_string(),
                short_date_pattern: "M/d/yyyy".to_string(),
                ..Self::invariant()
            },
            "en-gb" => Self {
                name: "en-GB".to_string(),
                short_date_pattern: "dd/MM/yyyy".to_string(),
                date_order: DateOrder::DayMonth,
                ..Self::invariant()
            },
            "de-de" => Self {
                name: "de-DE".to_string(),
                decimal_separator: ',',
                group_separator: '.',
                time_separator: ':',
                short_date_pattern: "dd.MM.yyyy".to_string(),
                date_order: DateOrder::DayMonth,
                am_designator: "AM".to_string(),
                pm_designator: "PM".to_string(),
                month_names: owned(&GERMAN_MONTHS),
                abbreviated_month_names: abbreviate(&GERMAN_MONTHS),
            },
            "fr-fr" => Self {
                name: "fr-FR".to_string(),
                decimal_separator: ',',
                group_separator: '\u{a0}',
                time_separator: ':',
                short_date_pattern: "dd/MM/yyyy".to_string(),
                date_order: DateOrder::DayMonth,
                am_designator: "AM".to_string(),
                pm_designator: "PM".to_string(),
                month_names: owned(&FRENCH_MONTHS),
                abbreviated_month_names: owned(&FRENCH_ABBREVIATED_MONTHS),
            },
            "fi-fi" => Self {
                name: "fi-FI".to_string(),
                decimal_separator: ',',
                group_separator: '\u{a0}',
                time_separator: '.',
                short_date_pattern: "d.M.yyyy".to_string(),
                date_order: DateOrder::DayMonth,
                ..Self::invariant()
            },
            _ => return None,
        };
        Some(culture)
    }

    /// Cache key for registries
    pub fn key(&self) -> &str {
        &self.name
    }

    /// Month number (1-based) for a full or abbreviated name, case-insensitive
    pub fn month_from_name(&self, text: &str, abbreviated: bool) -> Option<u32> {
        let names = if abbreviated {
            &self.abbreviated_month_names
        } else {
            &self.month_names
        };
        names
            .iter()
            .position(|n| n.to_lowercase() == text.to_lowercase())
            .map(|i| i as u32 + 1)
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let gb = Culture::builtin("en-GB").unwrap();
        assert_eq!(gb.date_order, DateOrder::DayMonth);
        assert_eq!(gb.key(), "en-GB");
        assert!(Culture::builtin("xx-XX").is_none());
        assert_eq!(Culture::builtin("invariant"), Some(Culture::invariant()));
    }

    #[test]
    fn test_german_separators() {
        let de = Culture::builtin("de-de").unwrap();
        assert_eq!(de.decimal_separator, ',');
        assert_eq!(de.group_separator, '.');
    }

    #[test]
    fn test_month_lookup() {
        let inv = Culture::invariant();
        assert_eq!(inv.month_from_name("jan", true), Some(1));
        assert_eq!(inv.month_from_name("DECEMBER", false), Some(12));
        assert_eq!(inv.month_from_name("Dec", false), None);

        let de = Culture::builtin("de-DE").unwrap();
        assert_eq!(de.month_from_name("märz", false), Some(3));
        assert_eq!(de.month_from_name("Mär", true), Some(3));
    }
}
