//! Per-type acceptance and parsing
//!
//! Each candidate type except `String` has a decider that answers two
//! questions about a piece of text: could it be a value of this type
//! (`accept`), and what value is it (`parse`). Accepting may grow the
//! caller's [`SizeInfo`]; the inferrer only keeps that growth when the
//! candidate is accepted.

mod boolean;
mod date_time;
mod never_guess;
mod numeric;
mod time_span;

pub use boolean::BooleanDecider;
pub use date_time::DateTimeDecider;
pub use never_guess::NeverGuessDecider;
pub use numeric::{DecimalDecider, IntegerDecider, decimal_size};
pub use time_span::TimeSpanDecider;

use crate::error::InferenceError;
use crate::size::SizeInfo;
use crate::types::{CandidateType, CompatibilityGroup, TypedValue};

/// Acceptance and parsing for one candidate type
pub trait TypeDecider: Send + Sync {
    /// Name used in error messages
    fn name(&self) -> &'static str;

    /// The type this decider produces
    fn candidate_type(&self) -> CandidateType;

    /// Group deciding whether downgrades may step through this type
    fn compatibility_group(&self) -> CompatibilityGroup;

    /// Whether `candidate` is a value of this type
    ///
    /// May grow `size` in place; callers discard the growth on rejection.
    fn accept(&self, candidate: &str, size: &mut SizeInfo) -> bool;

    /// Parse `candidate` into a value of this type
    fn parse(&self, candidate: &str) -> Result<TypedValue, InferenceError>;
}
