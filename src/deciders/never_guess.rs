use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use crate::error::InferenceError;
use crate::size::SizeInfo;
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

use super::TypeDecider;

/// A type that is never inferred from text but can still be parsed
///
/// These types only come from native observations or an explicit request
/// for a parse; `accept` always declines so text skips past them.
#[derive(Debug, Clone, Copy)]
pub struct NeverGuessDecider {
    target: CandidateType,
}

impl NeverGuessDecider {
    pub fn new(target: CandidateType) -> Result<Self, InferenceError> {
        match target {
            CandidateType::Long
            | CandidateType::Byte
            | CandidateType::Short
            | CandidateType::Identifier
            | CandidateType::ByteBlob => Ok(Self { target }),
            other => Err(InferenceError::UnsupportedCandidateType(other.to_string())),
        }
    }

    /// Construct for a target the caller already knows is never guessed
    pub(crate) const fn known(target: CandidateType) -> Self {
        Self { target }
    }

    fn parse_bytes(text: &str) -> Option<Vec<u8>> {
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            if hex.len() % 2 != 0 {
                return None;
            }
            return (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
                .collect();
        }
        STANDARD.decode(text).ok()
    }
}

impl TypeDecider for NeverGuessDecider {
    fn name(&self) -> &'static str {
        "NeverGuessDecider"
    }

    fn candidate_type(&self) -> CandidateType {
        self.target
    }

    fn compatibility_group(&self) -> CompatibilityGroup {
        self.target
            .compatibility_group()
            .unwrap_or(CompatibilityGroup::None)
    }

    fn accept(&self, _candidate: &str, _size: &mut SizeInfo) -> bool {
        false
    }

    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError> {
        let text = candidate.trim();
        let value = match self.target {
            CandidateType::Long => text.parse().ok().map(TypedValue::Long),
            CandidateType::Byte => text.parse().ok().map(TypedValue::Byte),
            CandidateType::Short => text.parse().ok().map(TypedValue::Short),
            CandidateType::Identifier => {
                let bare = text
                    .strip_prefix('{')
                    .and_then(|t| t.strip_suffix('}'))
                    .unwrap_or(text);
                Uuid::parse_str(bare).ok().map(TypedValue::Identifier)
            }
            CandidateType::ByteBlob => Self::parse_bytes(text).map(TypedValue::ByteBlob),
            _ => None,
        };
        value.ok_or_else(|| InferenceError::format(self.name(), candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_never_guessed_targets() {
        for ty in [
            CandidateType::Long,
            CandidateType::Byte,
            CandidateType::Short,
            CandidateType::Identifier,
            CandidateType::ByteBlob,
        ] {
            assert!(NeverGuessDecider::new(ty).is_ok(), "{ty}");
        }
        assert!(matches!(
            NeverGuessDecider::new(CandidateType::Integer),
            Err(InferenceError::UnsupportedCandidateType(_))
        ));
    }

    #[test]
    fn test_never_accepts() {
        let d = NeverGuessDecider::new(CandidateType::Long).unwrap();
        let mut size = SizeInfo::default();
        assert!(!d.accept("12", &mut size));
        assert!(size.is_empty());
        assert_eq!(d.compatibility_group(), CompatibilityGroup::Numerical);
    }

    #[test]
    fn test_parses_targets() {
        let long = NeverGuessDecider::new(CandidateType::Long).unwrap();
        assert_eq!(long.parse("9000000000").unwrap(), TypedValue::Long(9_000_000_000));

        let byte = NeverGuessDecider::new(CandidateType::Byte).unwrap();
        assert_eq!(byte.parse("255").unwrap(), TypedValue::Byte(255));
        assert!(byte.parse("256").is_err());

        let id = NeverGuessDecider::new(CandidateType::Identifier).unwrap();
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            id.parse("{67e55044-10b1-426f-9247-bb680e5fe0c8}").unwrap(),
            TypedValue::Identifier(uuid)
        );

        let blob = NeverGuessDecider::new(CandidateType::ByteBlob).unwrap();
        assert_eq!(blob.parse("0x0aFF").unwrap(), TypedValue::ByteBlob(vec![0x0a, 0xff]));
        assert_eq!(blob.parse("AQI=").unwrap(), TypedValue::ByteBlob(vec![1, 2]));
        assert!(blob.parse("0x0").is_err());
    }
}
