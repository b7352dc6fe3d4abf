// Completeness rules for service channels

use super::{
    check_organization_reference, check_phone_numbers, is_blank, is_web_url, require_localized,
    PAYLOAD_MATCHES_TYPE,
};
use crate::model::{ChannelKind, ChannelPayload, Payload, Version};
use crate::validation::registry::{Rule, RuleCategory, RuleContext};
use crate::validation::verdict::{Violation, ViolationCode};

pub const RULES: &[Rule] = &[
    PAYLOAD_MATCHES_TYPE,
    Rule::new("channel.name.required", RuleCategory::FieldPresence, name_required),
    Rule::new("channel.description.required", RuleCategory::FieldPresence, description_required),
    Rule::new("channel.kind.contact", RuleCategory::FieldPresence, kind_contact),
    Rule::new(
        "channel.signature_count.required_when_signed",
        RuleCategory::CrossField,
        signature_count_required,
    ),
    Rule::new("channel.organization.hierarchy", RuleCategory::Hierarchy, organization_in_hierarchy),
];

fn payload(version: &Version) -> Option<&ChannelPayload> {
    match &version.payload {
        Payload::Channel(p) => Some(p),
        _ => None,
    }
}

fn name_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| require_localized("channel.name.required", "name", &p.name, ctx))
        .into_iter()
        .collect()
}

fn description_required(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    payload(version)
        .and_then(|p| {
            require_localized("channel.description.required", "description", &p.description, ctx)
        })
        .into_iter()
        .collect()
}

fn kind_contact(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    const RULE: &str = "channel.kind.contact";

    let Some(p) = payload(version) else {
        return Vec::new();
    };

    let missing = |field: &str, what: &str| {
        vec![Violation::new(RULE, ViolationCode::MissingField, field, what.to_string())]
    };

    match &p.kind {
        ChannelKind::Electronic { url } | ChannelKind::WebPage { url } => match url.as_deref() {
            None => missing("kind.url", "a url is required for this channel kind"),
            Some(url) if url.trim().is_empty() => {
                missing("kind.url", "a url is required for this channel kind")
            }
            Some(url) if !is_web_url(url) => vec![Violation::new(
                RULE,
                ViolationCode::InvalidValue,
                "kind.url",
                format!("'{url}' is not an http(s) address"),
            )],
            Some(_) => Vec::new(),
        },
        ChannelKind::Phone { numbers } if numbers.is_empty() => {
            missing("kind.numbers", "at least one phone number is required")
        }
        ChannelKind::Phone { numbers } => check_phone_numbers(RULE, "kind.numbers", numbers),
        ChannelKind::ServiceLocation { addresses } if addresses.is_empty() => {
            missing("kind.addresses", "at least one address is required")
        }
        ChannelKind::ServiceLocation { addresses } => addresses
            .iter()
            .enumerate()
            .filter(|(_, address)| address.trim().is_empty())
            .map(|(index, _)| {
                Violation::new(
                    RULE,
                    ViolationCode::MissingField,
                    format!("kind.addresses[{index}]"),
                    "address must not be blank",
                )
            })
            .collect(),
        ChannelKind::PrintableForm { form_identifier } if is_blank(form_identifier.as_deref()) => {
            missing("kind.form_identifier", "a form identifier is required")
        }
        ChannelKind::PrintableForm { .. } => Vec::new(),
    }
}

fn signature_count_required(version: &Version, _ctx: &RuleContext<'_>) -> Vec<Violation> {
    const RULE: &str = "channel.signature_count.required_when_signed";

    let Some(p) = payload(version) else {
        return Vec::new();
    };
    // Signature count is ignored for channels without a signature
    if !p.requires_signature {
        return Vec::new();
    }
    match p.signature_count {
        None => vec![Violation::new(
            RULE,
            ViolationCode::MissingConditionalField,
            "signature_count",
            "signature_count is required when requires_signature is set",
        )],
        Some(0) => vec![Violation::new(
            RULE,
            ViolationCode::InvalidValue,
            "signature_count",
            "signature_count must be at least 1",
        )],
        Some(_) => Vec::new(),
    }
}

fn organization_in_hierarchy(version: &Version, ctx: &RuleContext<'_>) -> Vec<Violation> {
    if payload(version).is_none() {
        return Vec::new();
    }
    check_organization_reference(
        "channel.organization.hierarchy",
        "organization_id",
        version.organization_id,
        ctx.tree,
    )
    .into_iter()
    .collect()
}
