//! Settings for column type inference

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Minimum reported width for date/time columns
///
/// Long enough for `yyyy-MM-ddTHH:mm:ss.fffffff`.
pub const MIN_DATE_WIDTH: usize = 27;

/// Settings shared by the deciders of one inferrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceSettings {
    /// Accept single letters (Y/N/T/F/J/0/1) as booleans
    pub allow_single_letter_booleans: bool,

    /// Exact chrono formats to use for date/time values instead of guessing
    pub explicit_date_formats: Option<Vec<String>>,

    /// Allow `guess_date_format` to switch between day-first and month-first
    pub guess_date_format: bool,

    /// Extra width added per non-ASCII character of string values
    pub extra_length_per_non_ascii: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            allow_single_letter_booleans: false,
            explicit_date_formats: None,
            guess_date_format: true,
            extra_length_per_non_ascii: 0,
        }
    }
}

impl InferenceSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom settings
    pub fn builder() -> InferenceSettingsBuilder {
        InferenceSettingsBuilder::default()
    }

    /// Load settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a YAML document
    #[cfg(feature = "yaml-config")]
    pub fn from_yaml(yaml: &str) -> Result<Self, InferenceError> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that can never match anything
    pub fn validate(&self) -> Result<(), InferenceError> {
        if let Some(formats) = &self.explicit_date_formats {
            if formats.is_empty() {
                return Err(InferenceError::InvalidConfig(
                    "explicitDateFormats must not be empty when set".to_string(),
                ));
            }
            if formats.iter().any(|f| f.trim().is_empty()) {
                return Err(InferenceError::InvalidConfig(
                    "explicitDateFormats contains a blank format".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for InferenceSettings
#[derive(Debug, Default)]
pub struct InferenceSettingsBuilder {
    settings: InferenceSettings,
}

impl InferenceSettingsBuilder {
    /// Accept single-letter boolean codes
    pub fn allow_single_letter_booleans(mut self, allow: bool) -> Self {
        self.settings.allow_single_letter_booleans = allow;
        self
    }

    /// Use exactly these chrono formats for date/time values
    pub fn explicit_date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.explicit_date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable the day/month order heuristic
    pub fn guess_date_format(mut self, guess: bool) -> Self {
        self.settings.guess_date_format = guess;
        self
    }

    pub fn extra_length_per_non_ascii(mut self, extra: usize) -> Self {
        self.settings.extra_length_per_non_ascii = extra;
        self
    }

    /// Build the settings
    pub fn build(self) -> InferenceSettings {
        self.settings
    }
}
