//! Shared wire types for the lead gateway's inbound HTTP contract

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scalar the browser form may send either as text or as a bare number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    pub fn to_text(&self) -> String {
        match self {
            TextOrNumber::Text(text) => text.clone(),
            TextOrNumber::Number(number) => number.to_string(),
        }
    }

    /// Empty text and numeric zero count as not supplied
    pub fn is_blank(&self) -> bool {
        match self {
            TextOrNumber::Text(text) => text.is_empty(),
            TextOrNumber::Number(number) => number.as_f64() == Some(0.0),
        }
    }
}

/// One caller-supplied attribute entry, after shape detection
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInput {
    /// Entry that already carries the CRM's numeric attribute ID
    Direct { attribute_id: i64, value: Value },
    /// Entry addressed by a logical name such as `parent1`
    Logical { name: String, value: Value },
}

impl AttributeInput {
    /// Classify a raw entry. Entries with a numeric `attributeId` are direct,
    /// entries with a string `name` are logical, anything else is ignored.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let object = entry.as_object()?;
        let value = object.get("value").cloned().unwrap_or(Value::Null);

        if let Some(attribute_id) = object.get("attributeId").and_then(Value::as_i64) {
            return Some(AttributeInput::Direct { attribute_id, value });
        }

        match object.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => Some(AttributeInput::Logical {
                name: name.to_string(),
                value,
            }),
            _ => None,
        }
    }
}

/// Body of `POST /sendLead`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitLeadRequest {
    #[serde(default)]
    pub name: Option<TextOrNumber>,
    #[serde(default)]
    pub phone: Option<TextOrNumber>,
    #[serde(default)]
    pub email: Option<TextOrNumber>,
    #[serde(default)]
    pub note: Option<TextOrNumber>,
    /// Kept loose: a non-array value is ignored rather than rejected
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl SubmitLeadRequest {
    pub fn attribute_inputs(&self) -> Vec<AttributeInput> {
        self.attributes
            .as_ref()
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(AttributeInput::from_value).collect())
            .unwrap_or_default()
    }
}

/// Successful reply of `POST /sendLead`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitLeadResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SubmitLeadResponse {
    pub fn created(data: Value) -> Self {
        Self {
            ok: true,
            status: None,
            message: None,
            data: Some(data),
        }
    }

    pub fn already_exists() -> Self {
        Self {
            ok: true,
            status: Some(409),
            message: Some("User exists".to_string()),
            data: None,
        }
    }
}

/// Query string of `GET /getUser`.
///
/// Unlike the deployed form handler, which enables enrichment for any
/// non-empty `resolveAttributes`, `0`/`false`/`no`/`off` switch it off here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchUserQuery {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "resolveAttributes", default)]
    pub resolve_attributes: Option<String>,
}

impl FetchUserQuery {
    /// `resolveAttributes` counts as set unless it is empty or an explicit "off" word
    pub fn wants_resolution(&self) -> bool {
        match self.resolve_attributes.as_deref() {
            None => false,
            Some(flag) => !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "no" | "off"
            ),
        }
    }
}

/// A raw user attribute annotated with the catalog code of its ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttribute {
    #[serde(rename = "attributeId")]
    pub attribute_id: Value,
    pub code: Option<String>,
    pub value: Value,
}

/// Successful reply of `GET /getUser`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchUserResponse {
    pub ok: bool,
    pub user: Value,
    #[serde(
        rename = "resolvedAttributes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_attributes: Option<Vec<ResolvedAttribute>>,
}

/// Successful reply of `GET /listAttributes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttributesResponse {
    pub ok: bool,
    pub endpoint: Option<String>,
    pub count: usize,
    pub parent1_id: Option<i64>,
    pub discount_id: Option<i64>,
    pub sample: Vec<Value>,
}

/// Failure reply shared by every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
