// Rule tables per entity type, plus the helpers they share

pub mod channel;
pub mod organization;
pub mod service;

use regex::Regex;
use std::sync::LazyLock;

use super::registry::{Rule, RuleCategory, RuleContext};
use super::verdict::{Violation, ViolationCode};
use crate::hierarchy::OrganizationTree;
use crate::model::{LocalizedText, NodeStatus, OrganizationId, Version};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{4,19}$").expect("valid phone pattern"));

static WEB_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url pattern"));

/// First rule of every table: the payload must match the declared type
pub const PAYLOAD_MATCHES_TYPE: Rule = Rule::new(
    "payload.matches_entity_type",
    RuleCategory::Structural,
    payload_matches_type,
);

fn payload_matches_type(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    let actual = version.payload.entity_type();
    if actual == version.entity_type {
        return Vec::new();
    }
    vec![Violation::new(
        PAYLOAD_MATCHES_TYPE.id,
        ViolationCode::TypeMismatch,
        "payload",
        format!(
            "payload holds {actual} content but the version is declared as {}",
            version.entity_type
        ),
    )]
}

pub(crate) fn require_localized(
    rule_id: &str,
    field_path: &str,
    text: &LocalizedText,
    ctx: &RuleContext<'_>,
) -> Option<Violation> {
    let present = if ctx.required_languages.is_empty() {
        !text.is_blank()
    } else {
        text.has_any(ctx.required_languages)
    };
    if present {
        return None;
    }
    Some(Violation::new(
        rule_id,
        ViolationCode::MissingField,
        field_path,
        format!(
            "{field_path} must be filled in for at least one of: {}",
            ctx.required_languages.join(", ")
        ),
    ))
}

pub(crate) fn require_non_empty<T>(rule_id: &str, field_path: &str, values: &[T]) -> Option<Violation> {
    if !values.is_empty() {
        return None;
    }
    Some(Violation::new(
        rule_id,
        ViolationCode::MissingField,
        field_path,
        format!("{field_path} must contain at least one entry"),
    ))
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Presence and archival check for a referenced organization
pub(crate) fn check_organization_reference(
    rule_id: &str,
    field_path: &str,
    organization: OrganizationId,
    tree: &OrganizationTree,
) -> Option<Violation> {
    match tree.status_of(organization) {
        Some(NodeStatus::Active) => None,
        Some(NodeStatus::Archived) => Some(Violation::new(
            rule_id,
            ViolationCode::OrganizationArchived,
            field_path,
            format!("organization {organization} is archived"),
        )),
        Some(NodeStatus::Removed) => Some(Violation::new(
            rule_id,
            ViolationCode::OrganizationMissing,
            field_path,
            format!("organization {organization} has been removed"),
        )),
        None => Some(Violation::new(
            rule_id,
            ViolationCode::OrganizationMissing,
            field_path,
            format!("organization {organization} is not present in the hierarchy"),
        )),
    }
}

pub(crate) fn check_emails(rule_id: &str, field: &str, emails: &[String]) -> Vec<Violation> {
    check_each(rule_id, field, emails, &EMAIL, "is not a valid email address")
}

pub(crate) fn check_phone_numbers(rule_id: &str, field: &str, numbers: &[String]) -> Vec<Violation> {
    check_each(rule_id, field, numbers, &PHONE, "is not a valid phone number")
}

pub(crate) fn is_web_url(value: &str) -> bool {
    WEB_URL.is_match(value.trim())
}

fn check_each(
    rule_id: &str,
    field: &str,
    values: &[String],
    pattern: &Regex,
    problem: &str,
) -> Vec<Violation> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| !pattern.is_match(value.trim()))
        .map(|(index, value)| {
            Violation::new(
                rule_id,
                ViolationCode::InvalidValue,
                format!("{field}[{index}]"),
                format!("'{value}' {problem}"),
            )
        })
        .collect()
}
