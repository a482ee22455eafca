use crate::error::InferenceError;
use crate::size::SizeInfo;
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

use super::TypeDecider;

const TRUE_WORDS: [&str; 3] = ["true", "yes", "ja"];
const FALSE_WORDS: [&str; 3] = ["false", "no", "nein"];
const TRUE_LETTERS: [char; 4] = ['y', 't', 'j', '1'];
const FALSE_LETTERS: [char; 3] = ['n', 'f', '0'];

/// Booleans written as words, or as single letters when allowed
#[derive(Debug, Clone, Default)]
pub struct BooleanDecider {
    allow_single_letter: bool,
}

impl BooleanDecider {
    pub fn new(allow_single_letter: bool) -> Self {
        Self {
            allow_single_letter,
        }
    }

    fn interpret(&self, candidate: &str) -> Option<bool> {
        let text = candidate.trim();
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !self.allow_single_letter {
                return None;
            }
            let c = c.to_ascii_lowercase();
            return if TRUE_LETTERS.contains(&c) {
                Some(true)
            } else if FALSE_LETTERS.contains(&c) {
                Some(false)
            } else {
                None
            };
        }

        if TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text)) {
            Some(true)
        } else if FALSE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text)) {
            Some(false)
        } else {
            None
        }
    }
}

impl TypeDecider for BooleanDecider {
    fn name(&self) -> &'static str {
        "BooleanDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        CandidateType::Boolean
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        CompatibilityGroup::Exclusive
    }

    fn accept(&self, candidate: &str, _size: &mut SizeInfo) -> bool {
        self.interpret(candidate).is_some()
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        self.interpret(candidate)
            .map(TypedValue::Boolean)
            .ok_or_else(|| InferenceError::format(self.name(), candidate))
    }
}
