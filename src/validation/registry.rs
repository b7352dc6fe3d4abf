//! Rule registry: entity type tag → ordered rule list.

use std::collections::BTreeMap;

use super::rules;
use super::verdict::Violation;
use crate::hierarchy::OrganizationTree;
use crate::model::{EntityType, Version};

/// Inputs every rule may consult besides the version itself
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub tree: &'a OrganizationTree,
    /// A localized field passes when non-blank in any of these
    pub required_languages: &'a [String],
}

pub type RuleCheck = fn(&Version, &RuleContext<'_>) -> Vec<Violation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Structural,
    FieldPresence,
    CrossField,
    Format,
    Hierarchy,
}

/// An independent predicate over a version
#[derive(Clone)]
pub struct Rule {
    pub id: &'static str,
    pub category: RuleCategory,
    pub check: RuleCheck,
}

impl Rule {
    pub const fn new(id: &'static str, category: RuleCategory, check: RuleCheck) -> Self {
        Self { id, category, check }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<EntityType, Vec<Rule>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the directory's standard rule tables
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for rule in rules::organization::RULES {
            registry.register(EntityType::Organization, rule.clone());
        }
        for rule in rules::service::RULES {
            registry.register(EntityType::Service, rule.clone());
        }
        for rule in rules::channel::RULES {
            registry.register(EntityType::Channel, rule.clone());
        }
        registry
    }

    /// Append a rule; it runs after every rule already registered for the type
    pub fn register(&mut self, entity_type: EntityType, rule: Rule) -> &mut Self {
        self.rules.entry(entity_type).or_default().push(rule);
        self
    }

    pub fn rules_for(&self, entity_type: EntityType) -> &[Rule] {
        self.rules.get(&entity_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rule_ids(&self, entity_type: EntityType) -> Vec<&'static str> {
        self.rules_for(entity_type).iter().map(|rule| rule.id).collect()
    }
}
