//! Rule, profile and action tables
//!
//! Stages read their tables through [`RuleProvider`] so the orchestrator
//! can be handed an alternate book in tests. The process-wide book is built
//! once from the global config and never mutated afterwards.

pub mod catalog;
mod initiators;

pub use initiators::*;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::config::{self, ActionSpec, DiagnosisKeyword, EngineConfig, ProfileConfig};

/// Read-only access to every lookup table the stages need.
pub trait RuleProvider: Send + Sync {
    /// Initiator rules for a component family (case-insensitive). Unknown
    /// families yield an empty slice.
    fn initiator_rules(&self, component: &str) -> &[InitiatorRule];

    /// Weight profile for a system type, if one is configured.
    fn profile(&self, system_type: &str) -> Option<&ProfileConfig>;

    /// Ordered keyword stems for diagnosis matching.
    fn diagnosis_map(&self) -> &[DiagnosisKeyword];

    /// Catalog entry for an action id.
    fn action(&self, id: &str) -> Option<&ActionSpec>;
}

/// Concrete provider: configured tables plus the compiled-in initiator rules.
#[derive(Debug, Clone)]
pub struct RuleBook {
    profiles: Vec<ProfileConfig>,
    actions: BTreeMap<String, ActionSpec>,
    diagnosis_map: Vec<DiagnosisKeyword>,
}

static GLOBAL_BOOK: OnceLock<Arc<RuleBook>> = OnceLock::new();

impl RuleBook {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            profiles: config.profiles.clone(),
            actions: config.actions.clone(),
            diagnosis_map: config.diagnosis_map.clone(),
        }
    }

    /// The book built from `config::get()`, shared for the process lifetime.
    pub fn global() -> Arc<RuleBook> {
        GLOBAL_BOOK
            .get_or_init(|| {
                let book = RuleBook::from_config(config::get());
                tracing::debug!(
                    profiles = book.profiles.len(),
                    actions = book.actions.len(),
                    components = INITIATOR_TABLE.len(),
                    "Rule book ready"
                );
                Arc::new(book)
            })
            .clone()
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RuleProvider for RuleBook {
    fn initiator_rules(&self, component: &str) -> &[InitiatorRule] {
        rules_for(component)
    }

    fn profile(&self, system_type: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.system_type == system_type)
    }

    fn diagnosis_map(&self) -> &[DiagnosisKeyword] {
        &self.diagnosis_map
    }

    fn action(&self, id: &str) -> Option<&ActionSpec> {
        self.actions.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_book_lookups() {
        let book = RuleBook::default();
        assert_eq!(book.initiator_rules("AFB").len(), 16);
        assert!(book.initiator_rules("turbine").is_empty());
        assert_eq!(
            book.profile("pump_train_horizontal").map(|p| p.id.as_str()),
            Some("PROFILE_PUMP_A")
        );
        assert!(book.profile("unknown").is_none());
        assert_eq!(book.diagnosis_map()[0].stem, "imbalanc");
        assert!(book.action("ACT008").is_some());
        assert!(book.action("ACT404").is_none());
    }

    #[test]
    fn test_book_reflects_config_overrides() {
        let mut config = EngineConfig::default();
        config.profiles.retain(|p| p.system_type == "fan_train");
        let book = RuleBook::from_config(&config);
        assert!(book.profile("gearbox_train").is_none());
        assert!(book.profile("fan_train").is_some());
    }

    #[test]
    fn test_provider_is_object_safe() {
        let provider: Arc<dyn RuleProvider> = Arc::new(RuleBook::default());
        assert_eq!(provider.initiator_rules("shafts").len(), 3);
    }
}
