// Completeness validation
//
// A registry maps each entity type to an ordered list of independent rules.
// Validation runs every rule for the version's declared type and collects a
// verdict; only a verdict with zero violations passes.

pub mod registry;
pub mod rules;
pub mod validator;
pub mod verdict;

pub use registry::{Rule, RuleCategory, RuleCheck, RuleContext, RuleRegistry};
pub use validator::CompletenessValidator;
pub use verdict::{ValidationVerdict, Violation, ViolationCode};
