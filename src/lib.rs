//! Column Type Inference - progressive type detection for imported columns
//!
//! Provides:
//! - Incremental inference of the narrowest shared column type
//! - Size tracking (precision, scale, width, unicode) alongside the type
//! - Culture-aware parsing of booleans, numbers, times and dates
//! - Thread-safe sessions, a per-culture registry cache and an inferrer pool

pub mod config;
pub mod culture;
pub mod deciders;
pub mod error;
pub mod formats;
pub mod inferrer;
pub mod merge;
pub mod pool;
pub mod registry;
pub mod size;
pub mod types;

// Re-export commonly used types
pub use config::{InferenceSettings, InferenceSettingsBuilder, MIN_DATE_WIDTH};
pub use culture::{Culture, DateOrder};
pub use deciders::TypeDecider;
pub use error::InferenceError;
pub use inferrer::{InferredColumnType, SharedTypeInferrer, TypeInferrer};
pub use pool::InferrerPool;
pub use registry::{DeciderRegistry, RegistryCache};
pub use size::SizeInfo;
pub use types::{CandidateType, CompatibilityGroup, Observation, PreferenceOrder, TypedValue};
