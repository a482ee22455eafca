//! Progressive type inference over a stream of observations
//!
//! A [`TypeInferrer`] starts at the most restrictive type of its
//! [`PreferenceOrder`] and only ever moves towards `String`. Text values walk
//! the decider chain; native values take a fast path that derives sizes from
//! the value itself. [`SharedTypeInferrer`] wraps the same state behind one
//! lock for use from several threads.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{InferenceSettings, MIN_DATE_WIDTH};
use crate::culture::Culture;
use crate::deciders::decimal_size;
use crate::error::InferenceError;
use crate::registry::DeciderRegistry;
use crate::size::{SizeInfo, digit_count};
use crate::types::{CandidateType, CompatibilityGroup, Observation, PreferenceOrder, TypedValue};

/// Width of `hh:mm:ss`
const TIME_SPAN_WIDTH: usize = 8;
/// Width of a hyphenated GUID
const IDENTIFIER_WIDTH: usize = 36;

/// The type settled on for a column, with the size needed to store it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredColumnType {
    pub candidate_type: CandidateType,
    /// Characters needed to print every value; unset when nothing was observed
    pub width: Option<usize>,
    pub size: SizeInfo,
    /// True if any value needs more than ASCII
    pub unicode: bool,
    pub value_count: usize,
    pub null_count: usize,
}

impl InferredColumnType {
    /// True if `self` is at least as large as `other` in every dimension
    pub fn dominates(&self, other: &InferredColumnType) -> bool {
        self.width >= other.width
            && self.size.dominates(&other.size)
            && (self.unicode || !other.unicode)
            && self.value_count >= other.value_count
            && self.null_count >= other.null_count
    }
}

/// How the first non-null observation primed the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Priming {
    Text,
    Native(CandidateType),
}

/// Single-threaded inference session
#[derive(Debug, Clone)]
pub struct TypeInferrer {
    registry: DeciderRegistry,
    order: PreferenceOrder,
    current: CandidateType,
    size: SizeInfo,
    raw_width: Option<usize>,
    trimmed_width: Option<usize>,
    unicode: bool,
    value_count: usize,
    null_count: usize,
    priming: Option<Priming>,
    group_seen: Option<CompatibilityGroup>,
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInferrer {
    /// Invariant culture, default settings, date order guessing enabled
    pub fn new() -> Self {
        Self::from_parts(DeciderRegistry::new(Arc::new(Culture::invariant())))
    }

    /// Invariant culture with custom settings
    pub fn with_settings(settings: InferenceSettings) -> Result<Self, InferenceError> {
        let registry = DeciderRegistry::new(Arc::new(Culture::invariant()));
        Ok(Self::from_parts(registry.with_settings(settings)?))
    }

    /// An explicit culture; date order guessing is suppressed
    pub fn with_culture(culture: Culture, settings: InferenceSettings) -> Result<Self, InferenceError> {
        let registry = DeciderRegistry::new(Arc::new(culture));
        Self::from_registry(&registry, settings)
    }

    /// Start from a shared registry, typically one handed out by a
    /// [`RegistryCache`](crate::registry::RegistryCache)
    ///
    /// Date order guessing stays available only for the invariant culture.
    pub fn from_registry(
        registry: &DeciderRegistry,
        settings: InferenceSettings,
    ) -> Result<Self, InferenceError> {
        let explicit_culture = !registry.culture().key().is_empty();
        let mut registry = registry.with_settings(settings)?;
        if explicit_culture {
            registry.date_time_mut().set_guessing(false);
        }
        Ok(Self::from_parts(registry))
    }

    fn from_parts(registry: DeciderRegistry) -> Self {
        let order = PreferenceOrder::default();
        Self {
            current: order.first(),
            registry,
            order,
            size: SizeInfo::default(),
            raw_width: None,
            trimmed_width: None,
            unicode: false,
            value_count: 0,
            null_count: 0,
            priming: None,
            group_seen: None,
        }
    }

    /// Replace the preference order, restarting at its first type
    pub fn with_order(mut self, order: PreferenceOrder) -> Self {
        self.current = order.first();
        self.order = order;
        self
    }

    pub fn current_type(&self) -> CandidateType {
        self.current
    }

    pub fn order(&self) -> &PreferenceOrder {
        &self.order
    }

    pub fn registry(&self) -> &DeciderRegistry {
        &self.registry
    }

    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Feed one observation
    pub fn observe<'a>(&mut self, observation: impl Into<Observation<'a>>) -> Result<(), InferenceError> {
        match observation.into() {
            Observation::Null => {
                self.observe_null();
                Ok(())
            }
            Observation::Text(text) => self.observe_str(text),
            Observation::Native(value) => self.observe_native(value),
        }
    }

    /// Feed every observation of `observations`, stopping at the first error
    pub fn observe_all<'a, I>(&mut self, observations: I) -> Result<(), InferenceError>
    where
        I: IntoIterator,
        I::Item: Into<Observation<'a>>,
    {
        for observation in observations {
            self.observe(observation)?;
        }
        Ok(())
    }

    pub fn observe_null(&mut self) {
        self.null_count += 1;
    }

    /// Feed a text value
    ///
    /// Empty and whitespace-only text is ignored.
    pub fn observe_str(&mut self, text: &str) -> Result<(), InferenceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        match self.priming {
            Some(Priming::Native(established)) => {
                return Err(InferenceError::MixedTyping {
                    value: text.to_string(),
                    value_type: CandidateType::String.to_string(),
                    established: established.to_string(),
                });
            }
            Some(Priming::Text) => {}
            None => self.priming = Some(Priming::Text),
        }

        self.value_count += 1;
        self.unicode |= !text.is_ascii();
        let extra = self.registry.settings().extra_length_per_non_ascii;
        self.raw_width = self.raw_width.max(Some(display_width(text, extra)));
        self.trimmed_width = self.trimmed_width.max(Some(display_width(trimmed, extra)));

        let mut size = self.size;
        while let Some(decider) = self.registry.decider(self.current) {
            if decider.accept(text, &mut size) {
                self.size = size;
                self.group_seen = Some(decider.compatibility_group());
                return Ok(());
            }
            size = self.size;
            let next = self.next_candidate();
            trace!("Downgrading column from {} to {} on '{}'", self.current, next, text);
            self.current = next;
        }
        Ok(())
    }

    /// The state to try after the current type rejected a value
    fn next_candidate(&self) -> CandidateType {
        let next = self.order.next_after(self.current);
        let Some(seen) = self.group_seen else {
            return next;
        };
        match self.registry.decider(next) {
            Some(decider) if decider.compatibility_group() == seen => next,
            _ => CandidateType::String,
        }
    }

    /// Feed an already typed value
    ///
    /// A native `String` is treated as text. Every other native value must
    /// match the type of the first one seen.
    pub fn observe_native(&mut self, value: TypedValue) -> Result<(), InferenceError> {
        let ty = value.candidate_type();
        if let TypedValue::String(text) = &value {
            return self.observe_str(text);
        }

        let established = match self.priming {
            Some(Priming::Native(established)) if established == ty => None,
            Some(Priming::Native(established)) => Some(established),
            Some(Priming::Text) => Some(self.current),
            None => None,
        };
        if let Some(established) = established {
            return Err(InferenceError::MixedTyping {
                value: value.to_string(),
                value_type: ty.to_string(),
                established: established.to_string(),
            });
        }

        self.priming = Some(Priming::Native(ty));
        self.current = ty;
        self.group_seen = ty.compatibility_group();
        self.value_count += 1;

        let (size, width) = native_size(&value);
        self.size = self.size.combine(size);
        if let Some(width) = width {
            self.raw_width = self.raw_width.max(Some(width));
            self.trimmed_width = self.trimmed_width.max(Some(width));
        }
        Ok(())
    }

    /// Snapshot of the column type so far
    pub fn build(&self) -> InferredColumnType {
        let width = if self.value_count == 0 {
            None
        } else {
            match self.current {
                CandidateType::String => self.raw_width,
                CandidateType::DateTime => Some(
                    self.trimmed_width
                        .unwrap_or(0)
                        .max(self.size.string_length())
                        .max(MIN_DATE_WIDTH),
                ),
                _ => self
                    .trimmed_width
                    .map(|w| w.max(self.size.string_length())),
            }
        };

        InferredColumnType {
            candidate_type: self.current,
            width,
            size: self.size,
            unicode: self.unicode,
            value_count: self.value_count,
            null_count: self.null_count,
        }
    }

    /// Parse `raw` as the type settled on so far
    pub fn parse(&self, raw: &str) -> Result<TypedValue, InferenceError> {
        match self.registry.decider(self.current) {
            Some(decider) => decider.parse(raw),
            None => Ok(TypedValue::String(raw.to_string())),
        }
    }

    /// Pick the day/month order for date values from `samples`
    pub fn guess_date_format<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.registry.date_time_mut().guess_date_format(samples);
    }

    /// Forget everything observed, keeping culture, settings and order
    ///
    /// A guessed date order is dropped in favour of the culture's own.
    pub fn reset(&mut self) {
        let order = self.registry.culture().date_order;
        self.registry.date_time_mut().set_date_order(order);
        self.current = self.order.first();
        self.size = SizeInfo::default();
        self.raw_width = None;
        self.trimmed_width = None;
        self.unicode = false;
        self.value_count = 0;
        self.null_count = 0;
        self.priming = None;
        self.group_seen = None;
    }
}

/// Characters in `text`, padded for non-ASCII characters
fn display_width(text: &str, extra_per_non_ascii: usize) -> usize {
    text.chars()
        .map(|c| if c.is_ascii() { 1 } else { 1 + extra_per_non_ascii })
        .sum()
}

fn integer_size(value: i128) -> (SizeInfo, Option<usize>) {
    let digits = digit_count(value.unsigned_abs());
    let sign = usize::from(value < 0);
    (SizeInfo::new(digits, 0), Some(digits as usize + sign))
}

/// Size and printed width of a native value, without formatting it
fn native_size(value: &TypedValue) -> (SizeInfo, Option<usize>) {
    match value {
        TypedValue::Boolean(b) => (SizeInfo::default(), Some(if *b { 4 } else { 5 })),
        TypedValue::Integer(n) => integer_size(i128::from(*n)),
        TypedValue::Long(n) => integer_size(i128::from(*n)),
        TypedValue::Byte(n) => integer_size(i128::from(*n)),
        TypedValue::Short(n) => integer_size(i128::from(*n)),
        TypedValue::Decimal(d) => {
            let size = decimal_size(&d.normalize());
            let sign = usize::from(d.is_sign_negative() && !d.is_zero());
            (size, Some(size.string_length() + sign))
        }
        TypedValue::TimeSpan(_) => (SizeInfo::default(), Some(TIME_SPAN_WIDTH)),
        TypedValue::DateTime(_) => (SizeInfo::default(), None),
        TypedValue::Identifier(_) => (SizeInfo::default(), Some(IDENTIFIER_WIDTH)),
        TypedValue::ByteBlob(bytes) => (SizeInfo::default(), Some(bytes.len())),
        TypedValue::String(text) => (SizeInfo::default(), Some(text.chars().count())),
    }
}

/// A [`TypeInferrer`] behind a single mutex
///
/// Every observation and every snapshot takes the lock, so the fields of the
/// session always change together.
#[derive(Debug, Default)]
pub struct SharedTypeInferrer {
    inner: Mutex<TypeInferrer>,
}

impl SharedTypeInferrer {
    pub fn new(inferrer: TypeInferrer) -> Self {
        Self {
            inner: Mutex::new(inferrer),
        }
    }

    pub fn observe<'a>(&self, observation: impl Into<Observation<'a>>) -> Result<(), InferenceError> {
        self.inner.lock().observe(observation)
    }

    pub fn observe_all<'a, I>(&self, observations: I) -> Result<(), InferenceError>
    where
        I: IntoIterator,
        I::Item: Into<Observation<'a>>,
    {
        self.inner.lock().observe_all(observations)
    }

    pub fn build(&self) -> InferredColumnType {
        self.inner.lock().build()
    }

    pub fn parse(&self, raw: &str) -> Result<TypedValue, InferenceError> {
        self.inner.lock().parse(raw)
    }

    pub fn guess_date_format<'a, I>(&self, samples: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.inner.lock().guess_date_format(samples);
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn into_inner(self) -> TypeInferrer {
        self.inner.into_inner()
    }
}

impl From<TypeInferrer> for SharedTypeInferrer {
    fn from(inferrer: TypeInferrer) -> Self {
        Self::new(inferrer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn infer(values: &[&str]) -> InferredColumnType {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe_all(values.iter().copied()).unwrap();
        inferrer.build()
    }

    #[test]
    fn test_starts_at_first_type_without_width() {
        let inferrer = TypeInferrer::new();
        let result = inferrer.build();
        assert_eq!(result.candidate_type, CandidateType::Boolean);
        assert_eq!(result.width, None);
        assert_eq!(result.value_count, 0);
    }

    #[test]
    fn test_numeric_steps_within_group() {
        let result = infer(&["1", "1.5"]);
        assert_eq!(result.candidate_type, CandidateType::Decimal);
        assert_eq!(result.size, SizeInfo::new(1, 1));
        assert_eq!(result.width, Some(3));
    }

    #[test]
    fn test_cross_group_collapses_to_string() {
        let result = infer(&["true", "2001-01-01"]);
        assert_eq!(result.candidate_type, CandidateType::String);
        assert_eq!(result.width, Some(10));

        // Numerical has no path to the exclusive date type
        let result = infer(&["12", "2001-01-01"]);
        assert_eq!(result.candidate_type, CandidateType::String);
    }

    #[test]
    fn test_first_value_walks_freely() {
        assert_eq!(infer(&["2001-01-01"]).candidate_type, CandidateType::DateTime);
        assert_eq!(infer(&["13:11:59"]).candidate_type, CandidateType::TimeSpan);
        assert_eq!(infer(&["hello"]).candidate_type, CandidateType::String);
    }

    #[test]
    fn test_date_time_width_floor() {
        let result = infer(&["2001-01-01"]);
        assert_eq!(result.width, Some(MIN_DATE_WIDTH));
    }

    #[test]
    fn test_rejected_probe_does_not_grow_size() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe("12").unwrap();
        inferrer.observe("1.25").unwrap();
        assert_eq!(inferrer.build().size, SizeInfo::new(2, 2));
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe("   ").unwrap();
        inferrer.observe("").unwrap();
        assert_eq!(inferrer.build(), TypeInferrer::new().build());
        // blank text does not prime the session either
        inferrer.observe(TypedValue::Integer(3)).unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::Integer);
    }

    #[test]
    fn test_nulls_only_count() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe(None::<&str>).unwrap();
        inferrer.observe(Observation::Null).unwrap();
        let result = inferrer.build();
        assert_eq!(result.null_count, 2);
        assert_eq!(result.value_count, 0);
        assert_eq!(result.candidate_type, CandidateType::Boolean);
    }

    #[test]
    fn test_unicode_and_extra_width() {
        let settings = InferenceSettings::builder()
            .extra_length_per_non_ascii(1)
            .build();
        let mut inferrer = TypeInferrer::with_settings(settings).unwrap();
        inferrer.observe("grün").unwrap();
        let result = inferrer.build();
        assert!(result.unicode);
        assert_eq!(result.width, Some(5));
    }

    #[test]
    fn test_native_widths() {
        let mut inferrer = TypeInferrer::new();
        inferrer
            .observe_all([Decimal::new(-12211, 3), Decimal::new(5, 1)].map(TypedValue::from))
            .unwrap();
        let result = inferrer.build();
        assert_eq!(result.candidate_type, CandidateType::Decimal);
        assert_eq!(result.size, SizeInfo::new(2, 3));
        assert_eq!(result.width, Some(7));

        let mut inferrer = TypeInferrer::new();
        inferrer.observe(TypedValue::Boolean(false)).unwrap();
        assert_eq!(inferrer.build().width, Some(5));
    }

    #[test]
    fn test_native_date_time_gets_floor() {
        let mut inferrer = TypeInferrer::new();
        let dt = chrono::NaiveDate::from_ymd_opt(2001, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        inferrer.observe(TypedValue::DateTime(dt)).unwrap();
        assert_eq!(inferrer.build().width, Some(MIN_DATE_WIDTH));
    }

    #[test]
    fn test_native_string_is_text() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe(TypedValue::String("42".to_string())).unwrap();
        inferrer.observe("43").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::Integer);
    }

    #[test]
    fn test_parse_uses_settled_type() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe("12").unwrap();
        assert_eq!(inferrer.parse("7").unwrap(), TypedValue::Integer(7));
        assert!(matches!(inferrer.parse("x"), Err(InferenceError::Format { .. })));

        inferrer.observe("abc").unwrap();
        assert_eq!(inferrer.parse("x").unwrap(), TypedValue::String("x".to_string()));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut inferrer = TypeInferrer::new();
        inferrer.observe(TypedValue::Long(5)).unwrap();
        inferrer.observe_null();
        inferrer.reset();
        assert_eq!(inferrer.build(), TypeInferrer::new().build());
        // priming is forgotten too
        inferrer.observe("true").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::Boolean);
    }

    #[test]
    fn test_custom_order() {
        let order = PreferenceOrder::new(vec![CandidateType::Decimal, CandidateType::String]).unwrap();
        let mut inferrer = TypeInferrer::new().with_order(order);
        inferrer.observe("5").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::Decimal);
        inferrer.observe("five").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::String);
    }

    #[test]
    fn test_explicit_culture_disables_guessing() {
        let culture = Culture::builtin("en-US").unwrap();
        let mut inferrer = TypeInferrer::with_culture(culture, InferenceSettings::default()).unwrap();
        inferrer.guess_date_format(["13/01/2001", "25/12/2001"]);
        inferrer.observe("13/01/2001").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::String);

        let mut inferrer = TypeInferrer::new();
        inferrer.guess_date_format(["13/01/2001", "25/12/2001"]);
        inferrer.observe("13/01/2001").unwrap();
        assert_eq!(inferrer.current_type(), CandidateType::DateTime);
    }

    #[test]
    fn test_shared_inferrer() {
        let shared = SharedTypeInferrer::from(TypeInferrer::new());
        shared.observe_all(["1", "22"]).unwrap();
        assert_eq!(shared.build().candidate_type, CandidateType::Integer);
        assert_eq!(shared.parse("3").unwrap(), TypedValue::Integer(3));
        shared.reset();
        assert_eq!(shared.into_inner().value_count(), 0);
    }
}
