//! Error types for column type inference

use thiserror::Error;

/// Errors that can occur during column type inference
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Native and text observations were mixed, or the native type changed
    #[error(
        "Mixed typing: value '{value}' of type {value_type} cannot be added to a column already established as {established}"
    )]
    MixedTyping {
        value: String,
        value_type: String,
        established: String,
    },

    /// A type name that is not part of the candidate domain
    #[error("Unsupported candidate type: {0}")]
    UnsupportedCandidateType(String),

    /// Text could not be parsed as the settled type
    #[error("{decider} could not parse '{text}'")]
    Format { decider: String, text: String },

    /// Neither type of a combination is in the preference order
    #[error("Cannot combine {first} with {second}: neither type is in the preference order")]
    UnsupportedCombination { first: String, second: String },

    /// Invalid settings or preference order
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InferenceError {
    pub(crate) fn format(decider: &str, text: &str) -> Self {
        InferenceError::Format {
            decider: decider.to_string(),
            text: text.to_string(),
        }
    }
}

impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        InferenceError::InvalidConfig(e.to_string())
    }
}

#[cfg(feature = "yaml-config")]
impl From<serde_yaml::Error> for InferenceError {
    fn from(e: serde_yaml::Error) -> Self {
        InferenceError::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_typing_message_names_everything() {
        let err = InferenceError::MixedTyping {
            value: "1.5".to_string(),
            value_type: "decimal".to_string(),
            established: "integer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("decimal"));
        assert!(msg.contains("integer"));
    }

    #[test]
    fn test_format_error_names_decider_and_text() {
        let err = InferenceError::format("IntegerDecider", "abc");
        assert_eq!(err.to_string(), "IntegerDecider could not parse 'abc'");
    }
}
