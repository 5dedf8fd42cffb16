use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown entity type: '{0}'. Valid types are: contacts, deals, leads, activities")]
pub struct EntityTypeParseError(String);

/// The record kinds a filter can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Contacts,
    Deals,
    Leads,
    Activities,
}

impl FromStr for EntityType {
    type Err = EntityTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contacts" | "contact" => Ok(EntityType::Contacts),
            "deals" | "deal" => Ok(EntityType::Deals),
            "leads" | "lead" => Ok(EntityType::Leads),
            "activities" | "activity" => Ok(EntityType::Activities),
            _ => Err(EntityTypeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Broad value family of a field, used to pick the operators a criterion
/// builder should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }
}

/// One row of an entity's schema-mapping table: the UI-facing field name, the
/// backend's capitalized counterpart, and the value family.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub ui_name: &'static str,
    pub backend_name: &'static str,
    pub kind: FieldKind,
}

const fn field(ui_name: &'static str, backend_name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef {
        ui_name,
        backend_name,
        kind,
    }
}

const CONTACT_FIELDS: [FieldDef; 7] = [
    field("name", "Name", FieldKind::Text),
    field("email", "email", FieldKind::Text),
    field("phone", "phone", FieldKind::Text),
    field("company", "company", FieldKind::Text),
    field("status", "status", FieldKind::Text),
    field("tags", "Tags", FieldKind::Text),
    field("createdAt", "createdAt", FieldKind::Date),
];

const DEAL_FIELDS: [FieldDef; 8] = [
    field("title", "title", FieldKind::Text),
    field("contactId", "contactId", FieldKind::Number),
    field("value", "value", FieldKind::Number),
    field("stage", "stage", FieldKind::Text),
    field("probability", "probability", FieldKind::Number),
    field("expectedClose", "expectedClose", FieldKind::Date),
    field("tags", "Tags", FieldKind::Text),
    field("createdAt", "createdAt", FieldKind::Date),
];

const LEAD_FIELDS: [FieldDef; 7] = [
    field("name", "Name", FieldKind::Text),
    field("contactId", "contactId", FieldKind::Number),
    field("source", "source", FieldKind::Text),
    field("status", "status", FieldKind::Text),
    field("score", "score", FieldKind::Number),
    field("tags", "Tags", FieldKind::Text),
    field("createdAt", "createdAt", FieldKind::Date),
];

const ACTIVITY_FIELDS: [FieldDef; 6] = [
    field("type", "type", FieldKind::Text),
    field("contactId", "contactId", FieldKind::Number),
    field("description", "description", FieldKind::Text),
    field("timestamp", "timestamp", FieldKind::Date),
    field("metadata", "metadata", FieldKind::Text),
    field("tags", "Tags", FieldKind::Text),
];

impl EntityType {
    /// Get the canonical name of this entity type
    pub fn canonical_name(&self) -> &'static str {
        match self {
            EntityType::Contacts => "contacts",
            EntityType::Deals => "deals",
            EntityType::Leads => "leads",
            EntityType::Activities => "activities",
        }
    }

    /// The schema-mapping table for this entity
    pub fn fields(&self) -> &'static [FieldDef] {
        match self {
            EntityType::Contacts => &CONTACT_FIELDS,
            EntityType::Deals => &DEAL_FIELDS,
            EntityType::Leads => &LEAD_FIELDS,
            EntityType::Activities => &ACTIVITY_FIELDS,
        }
    }

    /// Look up a field by its UI name
    pub fn field(&self, ui_name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.ui_name == ui_name)
    }

    /// Look up a field by the backend's name for it
    pub fn field_by_backend_name(&self, backend_name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.backend_name == backend_name)
    }
}
