// Completeness rules for services

use super::{check_organization_reference, require_localized, require_non_empty, PAYLOAD_MATCHES_TYPE};
use crate::model::{ChargeType, Payload, ServicePayload, Version};
use crate::validation::registry::{Rule, RuleCategory, RuleContext};
use crate::validation::verdict::{Violation, ViolationCode};

pub const RULES: &[Rule] = &[
    PAYLOAD_MATCHES_TYPE,
    Rule::new("service.name.required", RuleCategory::FieldPresence, name_required),
    Rule::new("service.summary.required", RuleCategory::FieldPresence, summary_required),
    Rule::new("service.description.required", RuleCategory::FieldPresence, description_required),
    Rule::new("service.service_classes.required", RuleCategory::FieldPresence, classes_required),
    Rule::new("service.target_groups.required", RuleCategory::FieldPresence, target_groups_required),
    Rule::new(
        "service.charge_info.required_when_charged",
        RuleCategory::CrossField,
        charge_info_required,
    ),
    Rule::new("service.organization.hierarchy", RuleCategory::Hierarchy, organization_in_hierarchy),
    Rule::new("service.producers.hierarchy", RuleCategory::Hierarchy, producers_in_hierarchy),
];

fn payload(version: &Version) -> Option<&ServicePayload> {
    match &version.payload {
        Payload::Service(p) => Some(p),
        _ => None,
    }
}

fn name_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| require_localized("service.name.required", "name", &p.name, ctx))
        .into_iter()
        .collect()
}

fn summary_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| require_localized("service.summary.required", "summary", &p.summary, ctx))
        .into_iter()
        .collect()
}

fn description_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| {
            require_localized("service.description.required", "description", &p.description, ctx)
        })
        .into_iter()
        .collect()
}

fn classes_required(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| {
            require_non_empty("service.service_classes.required", "service_classes", &p.service_classes)
        })
        .into_iter()
        .collect()
}

fn target_groups_required(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| {
            require_non_empty("service.target_groups.required", "target_groups", &p.target_groups)
        })
        .into_iter()
        .collect()
}

fn charge_info_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    let Some(p) = payload(version) else {
        return Vec::new();
    };
    // Charge info is ignored unless the service is charged
    if p.charge_type != Some(ChargeType::Charged) {
        return Vec::new();
    }
    match require_localized(
        "service.charge_info.required_when_charged",
        "charge_info",
        &p.charge_info,
        ctx,
    ) {
        Some(mut violation) => {
            violation.code = ViolationCode::MissingConditionalField;
            violation.reason = "charge_info is required when charge_type is charged".to_string();
            vec![violation]
        }
        None => Vec::new(),
    }
}

fn organization_in_hierarchy(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    if payload(version).is_none() {
        return Vec::new();
    }
    check_organization_reference(
        "service.organization.hierarchy",
        "organization_id",
        version.organization_id,
        ctx.tree,
    )
    .into_iter()
    .collect()
}

fn producers_in_hierarchy(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    let Some(p) = payload(version) else {
        return Vec::new();
    };
    p.producer_organizations
        .iter()
        .enumerate()
        .filter_map(|(index, producer)| {
            check_organization_reference(
                "service.producers.hierarchy",
                &format!("producer_organizations[{index}]"),
                *producer,
                ctx.tree,
            )
        })
        .collect()
}
