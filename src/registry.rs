//! Culture-scoped decider bundles and their cache

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::InferenceSettings;
use crate::culture::Culture;
use crate::deciders::{
    BooleanDecider, DateTimeDecider, DecimalDecider, IntegerDecider, NeverGuessDecider,
    TimeSpanDecider, TypeDecider,
};
use crate::error::InferenceError;
use crate::types::CandidateType;

/// One decider per candidate type, configured for a culture and settings
///
/// Registries are cheap to clone; an inferrer owns its own clone so that
/// guessing the date order in one session does not leak into another.
#[derive(Debug, Clone)]
pub struct DeciderRegistry {
    culture: Arc<Culture>,
    settings: InferenceSettings,
    boolean: BooleanDecider,
    integer: IntegerDecider,
    decimal: DecimalDecider,
    long: NeverGuessDecider,
    time_span: TimeSpanDecider,
    date_time: DateTimeDecider,
    byte: NeverGuessDecider,
    short: NeverGuessDecider,
    identifier: NeverGuessDecider,
    byte_blob: NeverGuessDecider,
}

impl DeciderRegistry {
    /// Registry for `culture` with default settings
    pub fn new(culture: Arc<Culture>) -> Self {
        let settings = InferenceSettings::default();
        Self {
            boolean: BooleanDecider::new(settings.allow_single_letter_booleans),
            integer: IntegerDecider::new(),
            decimal: DecimalDecider::new(Arc::clone(&culture)),
            long: NeverGuessDecider::known(CandidateType::Long),
            time_span: TimeSpanDecider::new(Arc::clone(&culture)),
            date_time: DateTimeDecider::new(Arc::clone(&culture))
                .with_guessing(settings.guess_date_format),
            byte: NeverGuessDecider::known(CandidateType::Byte),
            short: NeverGuessDecider::known(CandidateType::Short),
            identifier: NeverGuessDecider::known(CandidateType::Identifier),
            byte_blob: NeverGuessDecider::known(CandidateType::ByteBlob),
            settings,
            culture,
        }
    }

    /// Copy of this registry with `settings` applied
    pub fn with_settings(&self, settings: InferenceSettings) -> Result<Self, InferenceError> {
        settings.validate()?;
        let mut registry = self.clone();
        registry.boolean = BooleanDecider::new(settings.allow_single_letter_booleans);
        registry.date_time = DateTimeDecider::new(Arc::clone(&self.culture))
            .with_explicit_formats(settings.explicit_date_formats.clone())
            .with_guessing(settings.guess_date_format);
        registry.settings = settings;
        Ok(registry)
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    /// The decider for `ty`; `String` has none since it accepts everything
    pub fn decider(&self, ty: CandidateType) -> Option<&dyn TypeDecider> {
        let decider: &dyn TypeDecider = match ty {
            CandidateType::Boolean => &self.boolean,
            CandidateType::Integer => &self.integer,
            CandidateType::Decimal => &self.decimal,
            CandidateType::Long => &self.long,
            CandidateType::TimeSpan => &self.time_span,
            CandidateType::DateTime => &self.date_time,
            CandidateType::Byte => &self.byte,
            CandidateType::Short => &self.short,
            CandidateType::Identifier => &self.identifier,
            CandidateType::ByteBlob => &self.byte_blob,
            CandidateType::String => return None,
        };
        Some(decider)
    }

    pub fn date_time(&self) -> &DateTimeDecider {
        &self.date_time
    }

    pub fn date_time_mut(&mut self) -> &mut DateTimeDecider {
        &mut self.date_time
    }
}

/// Process-wide cache of registries keyed by culture name
///
/// Callers create and share the cache themselves; there is no implicit
/// global instance.
#[derive(Debug, Default)]
pub struct RegistryCache {
    registries: RwLock<HashMap<String, Arc<DeciderRegistry>>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `culture`, created on first request
    pub fn get_or_create(&self, culture: &Culture) -> Arc<DeciderRegistry> {
        if let Some(registry) = self.registries.read().get(culture.key()) {
            return Arc::clone(registry);
        }

        let mut registries = self.registries.write();
        let registry = registries
            .entry(culture.key().to_string())
            .or_insert_with(|| {
                debug!("Creating decider registry for culture '{}'", culture.key());
                Arc::new(DeciderRegistry::new(Arc::new(culture.clone())))
            });
        Arc::clone(registry)
    }

    /// Registry for one of the built-in cultures
    pub fn get_or_create_named(&self, name: &str) -> Result<Arc<DeciderRegistry>, InferenceError> {
        let culture = Culture::builtin(name)
            .ok_or_else(|| InferenceError::InvalidConfig(format!("Unknown culture: {name}")))?;
        Ok(self.get_or_create(&culture))
    }

    pub fn len(&self) -> usize {
        self.registries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::DateOrder;

    #[test]
    fn test_every_type_but_string_has_a_decider() {
        let registry = DeciderRegistry::new(Arc::new(Culture::invariant()));
        for ty in CandidateType::ALL {
            match registry.decider(ty) {
                Some(decider) => assert_eq!(decider.candidate_type(), ty),
                None => assert_eq!(ty, CandidateType::String),
            }
        }
    }

    #[test]
    fn test_with_settings_returns_a_copy() {
        let base = DeciderRegistry::new(Arc::new(Culture::invariant()));
        let settings = InferenceSettings::builder()
            .allow_single_letter_booleans(true)
            .build();
        let custom = base.with_settings(settings).unwrap();

        let mut size = Default::default();
        let boolean = CandidateType::Boolean;
        assert!(custom.decider(boolean).unwrap().accept("Y", &mut size));
        assert!(!base.decider(boolean).unwrap().accept("Y", &mut size));
    }

    #[test]
    fn test_with_settings_validates() {
        let base = DeciderRegistry::new(Arc::new(Culture::invariant()));
        let settings = InferenceSettings {
            explicit_date_formats: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            base.with_settings(settings),
            Err(InferenceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cache_creates_once_per_culture() {
        let cache = RegistryCache::new();
        assert!(cache.is_empty());

        let first = cache.get_or_create(&Culture::invariant());
        let second = cache.get_or_create(&Culture::invariant());
        assert!(Arc::ptr_eq(&first, &second));

        let gb = cache.get_or_create_named("en-GB").unwrap();
        assert_eq!(gb.date_time().date_order(), DateOrder::DayMonth);
        assert_eq!(cache.len(), 2);

        assert!(cache.get_or_create_named("xx-XX").is_err());
    }
}
