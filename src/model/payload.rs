// Type-specific version content

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::OrganizationId;
use super::status::EntityType;

/// Text keyed by language code ("fi", "sv", "en", ...)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: &str, text: &str) -> Self {
        self.0.insert(language.to_string(), text.to_string());
        self
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// True when at least one of `languages` carries non-blank text
    pub fn has_any(&self, languages: &[String]) -> bool {
        languages
            .iter()
            .any(|lang| self.get(lang).is_some_and(|text| !text.trim().is_empty()))
    }

    /// Text in the first of `languages` that has some, else any non-blank text
    pub fn preferred(&self, languages: &[String]) -> Option<&str> {
        languages
            .iter()
            .filter_map(|lang| self.get(lang))
            .chain(self.0.values().map(String::as_str))
            .find(|text| !text.trim().is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum Payload {
    Organization(OrganizationPayload),
    Service(ServicePayload),
    Channel(ChannelPayload),
}

impl Payload {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Payload::Organization(_) => EntityType::Organization,
            Payload::Service(_) => EntityType::Service,
            Payload::Channel(_) => EntityType::Channel,
        }
    }

    pub fn name(&self) -> &LocalizedText {
        match self {
            Payload::Organization(p) => &p.name,
            Payload::Service(p) => &p.name,
            Payload::Channel(p) => &p.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    State,
    Municipality,
    RegionalOrganization,
    Organization,
    Company,
    SotePublic,
    SotePrivate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationPayload {
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub organization_type: Option<OrganizationType>,
    /// Finnish business id, `NNNNNNN-C`
    pub business_code: Option<String>,
    /// Required for municipalities only
    pub municipality_code: Option<String>,
    pub parent_id: Option<OrganizationId>,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    Service,
    PermitOrObligation,
    ProfessionalQualification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    Charged,
    Free,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePayload {
    pub name: LocalizedText,
    pub summary: LocalizedText,
    pub description: LocalizedText,
    pub service_type: ServiceType,
    pub service_classes: Vec<String>,
    pub target_groups: Vec<String>,
    pub charge_type: Option<ChargeType>,
    /// Only meaningful when `charge_type` is `Charged`
    pub charge_info: LocalizedText,
    pub producer_organizations: Vec<OrganizationId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelKind {
    Electronic { url: Option<String> },
    Phone { numbers: Vec<String> },
    WebPage { url: Option<String> },
    PrintableForm { form_identifier: Option<String> },
    ServiceLocation { addresses: Vec<String> },
}

impl Default for ChannelKind {
    fn default() -> Self {
        ChannelKind::Electronic { url: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPayload {
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub kind: ChannelKind,
    pub requires_signature: bool,
    /// Only meaningful when `requires_signature` is set
    pub signature_count: Option<u32>,
    pub requires_authentication: bool,
}
