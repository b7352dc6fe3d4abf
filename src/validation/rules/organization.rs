// Completeness rules for organizations

use regex::Regex;
use std::sync::LazyLock;

use super::{
    check_emails, check_organization_reference, check_phone_numbers, is_blank, require_localized,
    PAYLOAD_MATCHES_TYPE,
};
use crate::model::{OrganizationId, OrganizationPayload, OrganizationType, Payload, Version};
use crate::validation::registry::{Rule, RuleCategory, RuleContext};
use crate::validation::verdict::{Violation, ViolationCode};

static BUSINESS_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{7})-(\d)$").expect("valid business code pattern"));

static MUNICIPALITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("valid municipality code pattern"));

const BUSINESS_CODE_WEIGHTS: [u32; 7] = [7, 9, 10, 5, 8, 4, 2];

pub const RULES: &[Rule] = &[
    PAYLOAD_MATCHES_TYPE,
    Rule::new("organization.name.required", RuleCategory::FieldPresence, name_required),
    Rule::new("organization.type.required", RuleCategory::FieldPresence, type_required),
    Rule::new("organization.business_code.format", RuleCategory::Format, business_code_format),
    Rule::new(
        "organization.municipality_code.required_for_municipality",
        RuleCategory::CrossField,
        municipality_code_required,
    ),
    Rule::new("organization.contact.format", RuleCategory::Format, contact_format),
    Rule::new("organization.parent.hierarchy", RuleCategory::Hierarchy, parent_in_hierarchy),
];

fn payload(version: &Version) -> Option<&OrganizationPayload> {
    match &version.payload {
        Payload::Organization(p) => Some(p),
        _ => None,
    }
}

fn name_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| require_localized("organization.name.required", "name", &p.name, ctx))
        .into_iter()
        .collect()
}

fn type_required(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    match payload(version) {
        Some(p) if p.organization_type.is_none() => vec![Violation::new(
            "organization.type.required",
            ViolationCode::MissingField,
            "organization_type",
            "organization_type must be set",
        )],
        _ => Vec::new(),
    }
}

/// Finnish business id check digit (weights 7,9,10,5,8,4,2, modulo 11)
pub fn is_valid_business_code(code: &str) -> bool {
    let Some(captures) = BUSINESS_CODE.captures(code.trim()) else {
        return false;
    };

    let sum: u32 = captures[1]
        .chars()
        .filter_map(|c| c.to_digit(10))
        .zip(BUSINESS_CODE_WEIGHTS)
        .map(|(digit, weight)| digit * weight)
        .sum();
    let check: u32 = captures[2].parse().unwrap_or(u32::MAX);

    match sum % 11 {
        0 => check == 0,
        1 => false,
        remainder => check == 11 - remainder,
    }
}

fn business_code_format(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    let Some(code) = payload(version).and_then(|p| p.business_code.as_deref()) else {
        return Vec::new();
    };
    if code.trim().is_empty() || is_valid_business_code(code) {
        return Vec::new();
    }
    vec![Violation::new(
        "organization.business_code.format",
        ViolationCode::InvalidValue,
        "business_code",
        format!("'{code}' is not a valid business id"),
    )]
}

fn municipality_code_required(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    const RULE: &str = "organization.municipality_code.required_for_municipality";

    let Some(p) = payload(version) else {
        return Vec::new();
    };
    // Ignored for every other organization type
    if p.organization_type != Some(OrganizationType::Municipality) {
        return Vec::new();
    }

    let code = p.municipality_code.as_deref();
    if is_blank(code) {
        return vec![Violation::new(
            RULE,
            ViolationCode::MissingConditionalField,
            "municipality_code",
            "municipality_code is required when organization_type is municipality",
        )];
    }
    match code {
        Some(code) if !MUNICIPALITY_CODE.is_match(code.trim()) => vec![Violation::new(
            RULE,
            ViolationCode::InvalidValue,
            "municipality_code",
            format!("'{code}' is not a three-digit municipality code"),
        )],
        _ => Vec::new(),
    }
}

fn contact_format(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    const RULE: &str = "organization.contact.format";

    let Some(p) = payload(version) else {
        return Vec::new();
    };
    let mut violations = check_emails(RULE, "emails", &p.emails);
    violations.extend(check_phone_numbers(RULE, "phone_numbers", &p.phone_numbers));
    violations
}

fn parent_in_hierarchy(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    const RULE: &str = "organization.parent.hierarchy";

    let Some(parent) = payload(version).and_then(|p| p.parent_id) else {
        return Vec::new();
    };
    let this = OrganizationId::from(version.unific_root_id);

    if parent == this {
        return vec![Violation::new(
            RULE,
            ViolationCode::HierarchyViolation,
            "parent_id",
            "an organization cannot be its own parent",
        )];
    }
    if ctx.tree.is_descendant_of(parent, this) {
        return vec![Violation::new(
            RULE,
            ViolationCode::HierarchyViolation,
            "parent_id",
            format!("organization {parent} is a sub-organization of this organization"),
        )];
    }

    check_organization_reference(RULE, "parent_id", parent, ctx.tree)
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_code_check_digit() {
        assert!(is_valid_business_code("0112038-9"));
        assert!(is_valid_business_code("1234567-1"));
        assert!(!is_valid_business_code("1234567-2"));
        assert!(!is_valid_business_code("123456-1"));
        assert!(!is_valid_business_code("1234567"));
    }
}
