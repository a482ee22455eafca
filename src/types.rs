//! Candidate type domain, native values and the preference order

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InferenceError;

/// A column type the inferrer may settle on
///
/// Variants are listed in default preference order, from the most restrictive
/// to `String`, which accepts everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateType {
    Boolean,
    Integer,
    Decimal,
    Long,
    TimeSpan,
    DateTime,
    Byte,
    Short,
    /// GUID/UUID values
    Identifier,
    /// Raw bytes
    ByteBlob,
    String,
}

impl CandidateType {
    /// All candidate types in default preference order
    pub const ALL: [CandidateType; 11] = [
        CandidateType::Boolean,
        CandidateType::Integer,
        CandidateType::Decimal,
        CandidateType::Long,
        CandidateType::TimeSpan,
        CandidateType::DateTime,
        CandidateType::Byte,
        CandidateType::Short,
        CandidateType::Identifier,
        CandidateType::ByteBlob,
        CandidateType::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CandidateType::Boolean => "boolean",
            CandidateType::Integer => "integer",
            CandidateType::Decimal => "decimal",
            CandidateType::Long => "long",
            CandidateType::TimeSpan => "time-span",
            CandidateType::DateTime => "date-time",
            CandidateType::Byte => "byte",
            CandidateType::Short => "short",
            CandidateType::Identifier => "identifier",
            CandidateType::ByteBlob => "byte-blob",
            CandidateType::String => "string",
        }
    }

    /// Compatibility group of the decider responsible for this type
    ///
    /// `String` has no decider and therefore no group.
    pub fn compatibility_group(&self) -> Option<CompatibilityGroup> {
        match self {
            CandidateType::Boolean | CandidateType::TimeSpan | CandidateType::DateTime => {
                Some(CompatibilityGroup::Exclusive)
            }
            CandidateType::Integer
            | CandidateType::Decimal
            | CandidateType::Long
            | CandidateType::Byte
            | CandidateType::Short => Some(CompatibilityGroup::Numerical),
            CandidateType::Identifier | CandidateType::ByteBlob => Some(CompatibilityGroup::None),
            CandidateType::String => None,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CandidateType {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let ty = match normalized.as_str() {
            "boolean" | "bool" => CandidateType::Boolean,
            "integer" | "int" => CandidateType::Integer,
            "decimal" => CandidateType::Decimal,
            "long" => CandidateType::Long,
            "time-span" | "timespan" | "time" => CandidateType::TimeSpan,
            "date-time" | "datetime" => CandidateType::DateTime,
            "byte" => CandidateType::Byte,
            "short" => CandidateType::Short,
            "identifier" | "guid" | "uuid" => CandidateType::Identifier,
            "byte-blob" | "bytes" => CandidateType::ByteBlob,
            "string" => CandidateType::String,
            _ => return Err(InferenceError::UnsupportedCandidateType(s.to_string())),
        };
        Ok(ty)
    }
}

/// Governs whether a downgrade may step through intermediate types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompatibilityGroup {
    None,
    /// Integer and decimal style types
    Numerical,
    /// Types that only step into other exclusive types
    Exclusive,
}

/// A value that is already typed, or the result of parsing text
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Boolean(bool),
    Integer(i32),
    Decimal(Decimal),
    Long(i64),
    TimeSpan(TimeDelta),
    DateTime(NaiveDateTime),
    Byte(u8),
    Short(i16),
    Identifier(Uuid),
    ByteBlob(Vec<u8>),
    String(String),
}

impl TypedValue {
    pub fn candidate_type(&self) -> CandidateType {
        match self {
            TypedValue::Boolean(_) => CandidateType::Boolean,
            TypedValue::Integer(_) => CandidateType::Integer,
            TypedValue::Decimal(_) => CandidateType::Decimal,
            TypedValue::Long(_) => CandidateType::Long,
            TypedValue::TimeSpan(_) => CandidateType::TimeSpan,
            TypedValue::DateTime(_) => CandidateType::DateTime,
            TypedValue::Byte(_) => CandidateType::Byte,
            TypedValue::Short(_) => CandidateType::Short,
            TypedValue::Identifier(_) => CandidateType::Identifier,
            TypedValue::ByteBlob(_) => CandidateType::ByteBlob,
            TypedValue::String(_) => CandidateType::String,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Boolean(v) => write!(f, "{v}"),
            TypedValue::Integer(v) => write!(f, "{v}"),
            TypedValue::Decimal(v) => write!(f, "{v}"),
            TypedValue::Long(v) => write!(f, "{v}"),
            TypedValue::TimeSpan(v) => write!(f, "{v}"),
            TypedValue::DateTime(v) => write!(f, "{v}"),
            TypedValue::Byte(v) => write!(f, "{v}"),
            TypedValue::Short(v) => write!(f, "{v}"),
            TypedValue::Identifier(v) => write!(f, "{v}"),
            TypedValue::ByteBlob(v) => write!(f, "<{} bytes>", v.len()),
            TypedValue::String(v) => f.write_str(v),
        }
    }
}

macro_rules! typed_value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for TypedValue {
                fn from(v: $source) -> Self {
                    TypedValue::$variant(v)
                }
            }
        )*
    };
}

typed_value_from! {
    bool => Boolean,
    i32 => Integer,
    Decimal => Decimal,
    i64 => Long,
    TimeDelta => TimeSpan,
    NaiveDateTime => DateTime,
    u8 => Byte,
    i16 => Short,
    Uuid => Identifier,
    Vec<u8> => ByteBlob,
    String => String,
}

/// One input to the inferrer
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<'a> {
    /// Raw text, borrowed from the caller
    Text(&'a str),
    /// An already typed value
    Native(TypedValue),
    /// A missing value
    Null,
}

impl<'a> From<&'a str> for Observation<'a> {
    fn from(text: &'a str) -> Self {
        Observation::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for Observation<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(Observation::Null, Observation::Text)
    }
}

impl From<TypedValue> for Observation<'_> {
    fn from(value: TypedValue) -> Self {
        Observation::Native(value)
    }
}

/// Total order over candidate types, most restrictive first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CandidateType>", into = "Vec<CandidateType>")]
pub struct PreferenceOrder {
    types: Vec<CandidateType>,
}

impl PreferenceOrder {
    /// Build a custom order
    ///
    /// The order must be non-empty, free of duplicates and end with `String`.
    pub fn new(types: Vec<CandidateType>) -> Result<Self, InferenceError> {
        if types.last() != Some(&CandidateType::String) {
            return Err(InferenceError::InvalidConfig(
                "preference order must end with string".to_string(),
            ));
        }
        for (i, ty) in types.iter().enumerate() {
            if types[..i].contains(ty) {
                return Err(InferenceError::InvalidConfig(format!(
                    "preference order lists {ty} more than once"
                )));
            }
        }
        Ok(Self { types })
    }

    pub fn types(&self) -> &[CandidateType] {
        &self.types
    }

    /// The initial, most restrictive state
    pub fn first(&self) -> CandidateType {
        self.types[0]
    }

    pub fn position(&self, ty: CandidateType) -> Option<usize> {
        self.types.iter().position(|t| *t == ty)
    }

    pub fn contains(&self, ty: CandidateType) -> bool {
        self.position(ty).is_some()
    }

    /// The type following `ty`, or `String` past the end
    pub fn next_after(&self, ty: CandidateType) -> CandidateType {
        self.position(ty)
            .and_then(|i| self.types.get(i + 1))
            .copied()
            .unwrap_or(CandidateType::String)
    }
}

impl Default for PreferenceOrder {
    fn default() -> Self {
        Self {
            types: CandidateType::ALL.to_vec(),
        }
    }
}

impl TryFrom<Vec<CandidateType>> for PreferenceOrder {
    type Error = InferenceError;

    fn try_from(types: Vec<CandidateType>) -> Result<Self, Self::Error> {
        Self::new(types)
    }
}

impl From<PreferenceOrder> for Vec<CandidateType> {
    fn from(order: PreferenceOrder) -> Self {
        order.types
    }
}
