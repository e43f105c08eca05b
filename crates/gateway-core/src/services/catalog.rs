//! Attribute catalog discovery and name resolution
//!
//! The CRM exposes custom attributes only as numeric IDs, and the catalog
//! listing them lives under different paths depending on tenant setup. The
//! resolver probes the configured candidate paths in order and accepts the
//! first one that answers with a success status and a catalog-shaped body
//! (a bare array, or an object with an `items` array). Structurally valid
//! answers are trusted as-is; there is no backtracking once one is accepted.

use crate::clients::CrmTransport;
use crate::types::{AttributeDescriptor, SessionToken};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

/// Catalog snapshot for a single operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCatalog {
    endpoint: Option<String>,
    entries: Vec<Value>,
    descriptors: Vec<AttributeDescriptor>,
}

impl AttributeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(endpoint: Option<String>, entries: Vec<Value>) -> Self {
        let descriptors = entries.iter().filter_map(AttributeDescriptor::from_value).collect();
        Self {
            endpoint,
            entries,
            descriptors,
        }
    }

    /// Empty means "resolution unavailable", not "no attributes exist"
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidate path that produced this catalog
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Raw entries as returned by the CRM, including ones without a usable ID
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// First descriptor, in catalog order, whose code or name equals one of
    /// `names`, or whose code contains one of them (case-insensitive, trimmed).
    pub fn find_id<S: AsRef<str>>(&self, names: &[S]) -> Option<i64> {
        let wanted: Vec<String> = names
            .iter()
            .map(|name| fold(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();

        self.descriptors
            .iter()
            .find(|descriptor| {
                let code = descriptor.code.as_deref().map(fold).unwrap_or_default();
                let name = descriptor.name.as_deref().map(fold).unwrap_or_default();

                wanted.iter().any(|n| *n == code || *n == name)
                    || wanted.iter().any(|n| code.contains(n.as_str()))
            })
            .map(|descriptor| descriptor.numeric_id)
    }

    /// Resolve a logical name such as `parent1` via its candidate spellings
    pub fn find_logical(&self, logical_name: &str) -> Option<i64> {
        self.find_id(candidate_names(logical_name).as_slice())
    }

    /// numeric ID -> preferred code, for reverse mapping. Later duplicates win.
    pub fn code_index(&self) -> HashMap<i64, String> {
        self.descriptors
            .iter()
            .filter_map(|d| d.preferred_code().map(|code| (d.numeric_id, code.to_string())))
            .collect()
    }
}

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Spellings a logical name may carry in the catalog: `parent1`, `user.parent1`
pub fn candidate_names(logical_name: &str) -> Vec<String> {
    let logical_name = logical_name.trim();
    vec![logical_name.to_string(), format!("user.{}", logical_name)]
}

/// Accept either a bare array or `{ "items": [...] }`
pub fn extract_catalog_items(body: &Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => map.get("items").and_then(Value::as_array).cloned(),
        _ => None,
    }
}

/// Try `candidates` in order and return the first one whose probe yields a value.
pub async fn first_successful_probe<'c, C, T, F, Fut>(
    candidates: &'c [C],
    mut probe: F,
) -> Option<(&'c C, T)>
where
    F: FnMut(&'c C) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for candidate in candidates {
        if let Some(found) = probe(candidate).await {
            return Some((candidate, found));
        }
    }
    None
}

/// Fetch the attribute catalog, or an empty one if no candidate qualifies
pub async fn resolve_catalog(
    transport: &dyn CrmTransport,
    token: &SessionToken,
    endpoints: &[String],
) -> AttributeCatalog {
    let found = first_successful_probe(endpoints, |endpoint| {
        probe_endpoint(transport, token, endpoint)
    })
    .await;

    match found {
        Some((endpoint, entries)) => {
            log::info!(
                "Attribute catalog resolved at {} with {} entries",
                endpoint,
                entries.len()
            );
            AttributeCatalog::from_entries(Some(endpoint.clone()), entries)
        }
        None => {
            log::warn!(
                "No attribute catalog found after probing {} candidate(s)",
                endpoints.len()
            );
            AttributeCatalog::empty()
        }
    }
}

async fn probe_endpoint(
    transport: &dyn CrmTransport,
    token: &SessionToken,
    endpoint: &str,
) -> Option<Vec<Value>> {
    match transport.fetch_catalog(token, endpoint).await {
        Ok(reply) if reply.is_success() => {
            let items = reply.json().as_ref().and_then(extract_catalog_items);
            if items.is_none() {
                log::debug!("Catalog candidate {} returned an unexpected shape", endpoint);
            }
            items
        }
        Ok(reply) => {
            log::debug!("Catalog candidate {} answered {}", endpoint, reply.status);
            None
        }
        Err(e) => {
            log::debug!("Catalog candidate {} failed: {}", endpoint, e);
            None
        }
    }
}
