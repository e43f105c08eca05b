//! Common types used throughout the gateway

use crate::constants::{DESCRIPTOR_CODE_FIELDS, DESCRIPTOR_ID_FIELDS, DESCRIPTOR_NAME_FIELDS};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Static CRM API key, exchanged once per operation for a session token
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// Short-lived bearer token owned by a single operation
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// One entry of the CRM attribute catalog
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub numeric_id: i64,
    /// First non-empty of `code | key | sysName | systemName`
    pub code: Option<String>,
    /// First non-empty of `name | title`
    pub name: Option<String>,
}

impl AttributeDescriptor {
    /// Extract a descriptor from a raw catalog entry.
    /// Entries without a usable numeric ID yield `None`.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let numeric_id = DESCRIPTOR_ID_FIELDS
            .iter()
            .find_map(|field| entry.get(*field).and_then(parse_numeric_id))?;

        Some(Self {
            numeric_id,
            code: first_text(entry, &DESCRIPTOR_CODE_FIELDS),
            name: first_text(entry, &DESCRIPTOR_NAME_FIELDS),
        })
    }

    /// Code used when reverse-mapping IDs: code aliases first, then name aliases
    pub fn preferred_code(&self) -> Option<&str> {
        self.code.as_deref().or(self.name.as_deref())
    }
}

/// Numeric attribute ID from a JSON number or numeric string
pub(crate) fn parse_numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn first_text(entry: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match entry.get(*field)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Caller-facing attribute reference, e.g. `parent1 = "Anna"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalAttributeRef {
    pub logical_name: String,
    pub value: String,
}

/// CRM-facing attribute reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmAttributeRef {
    #[serde(rename = "attributeId")]
    pub numeric_id: i64,
    pub value: String,
}

/// Validated phone number: exactly 11 ASCII digits starting with '7'
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Only the phone normalizer constructs these
    pub(crate) fn from_checked(digits: String) -> Self {
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of the CRM create-user call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    name: String,
    phone: NormalizedPhone,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<CrmAttributeRef>,
}

impl Contact {
    /// Empty email/note strings are treated as absent
    pub fn new(
        name: String,
        phone: NormalizedPhone,
        email: Option<String>,
        note: Option<String>,
        attributes: Vec<CrmAttributeRef>,
    ) -> Self {
        Self {
            name,
            phone,
            email: email.filter(|e| !e.is_empty()),
            note: note.filter(|n| !n.is_empty()),
            attributes,
        }
    }

    pub fn phone(&self) -> &NormalizedPhone {
        &self.phone
    }

    pub fn attributes(&self) -> &[CrmAttributeRef] {
        &self.attributes
    }
}

/// Terminal success outcomes of the CRM create-user call
#[derive(Debug, Clone, PartialEq)]
pub enum LeadOutcome {
    /// New user created; carries the CRM's response body
    Created(Value),
    /// CRM answered 409: the contact is already linked
    AlreadyExists,
}

/// Render a caller-supplied attribute value the way the CRM stores it
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
