use tracing::debug;

use super::registry::{RuleContext, RuleRegistry};
use super::verdict::ValidationVerdict;
use crate::config::ValidationConfig;
use crate::hierarchy::OrganizationTree;
use crate::model::Version;

/// Runs the rule set registered for a version's declared entity type.
///
/// Every applicable rule runs, so a verdict lists all violations at once, in
/// rule-declaration order.
#[derive(Debug, Clone)]
pub struct CompletenessValidator {
    registry: RuleRegistry,
    required_languages: Vec<String>,
}

impl Default for CompletenessValidator {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

impl CompletenessValidator {
    pub fn new(registry: RuleRegistry, required_languages: Vec<String>) -> Self {
        Self {
            registry,
            required_languages,
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(RuleRegistry::standard(), config.required_languages.clone())
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn required_languages(&self) -> &[String] {
        &self.required_languages
    }

    pub fn validate(&self, version: &Version, tree: &OrganizationTree) -> ValidationVerdict {
        let ctx = RuleContext {
            tree,
            required_languages: &self.required_languages,
        };

        let violations: Vec<_> = self
            .registry
            .rules_for(version.entity_type)
            .iter()
            .flat_map(|rule| (rule.check)(version, &ctx))
            .collect();

        debug!(
            version_id = %version.id,
            entity_type = %version.entity_type,
            violations = violations.len(),
            "Completeness validation finished"
        );

        ValidationVerdict {
            entity_type: version.entity_type,
            version_id: version.id,
            violations,
        }
    }
}
