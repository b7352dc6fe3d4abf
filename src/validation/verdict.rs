use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{EntityType, VersionId};

/// Machine-readable classification of a rule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// Payload variant does not match the declared entity type
    TypeMismatch,
    MissingField,
    /// A field required because a sibling flag is set
    MissingConditionalField,
    InvalidValue,
    /// Referenced organization absent from the hierarchy or removed
    OrganizationMissing,
    /// Referenced organization exists but is archived
    OrganizationArchived,
    /// Reference would break the shape of the hierarchy
    HierarchyViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub code: ViolationCode,
    /// Dotted path into the payload, e.g. `kind.numbers[1]`
    pub field_path: String,
    pub reason: String,
}

impl Violation {
    pub fn new(
        rule_id: &str,
        code: ViolationCode,
        field_path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            code,
            field_path: field_path.into(),
            reason: reason.into(),
        }
    }
}

/// Outcome of one validation run; passes only with zero violations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub entity_type: EntityType,
    pub version_id: VersionId,
    /// In rule-declaration order
    pub violations: Vec<Violation>,
}

impl ValidationVerdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field_path.as_str()).collect()
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "{} version {} is complete", self.entity_type, self.version_id);
        }
        write!(
            f,
            "{} version {} has {} violation(s)",
            self.entity_type,
            self.version_id,
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(
                f,
                "\n  - [{}] {}: {}",
                violation.rule_id, violation.field_path, violation.reason
            )?;
        }
        Ok(())
    }
}
