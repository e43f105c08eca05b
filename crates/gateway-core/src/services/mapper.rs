//! Bidirectional mapping between logical attribute names and CRM IDs

use crate::config::AttributeConfig;
use crate::services::catalog::AttributeCatalog;
use crate::types::{parse_numeric_id, stringify_value, CrmAttributeRef, LogicalAttributeRef};
use gateway_types::{AttributeInput, ResolvedAttribute};
use serde_json::Value;

/// Result of forward mapping: what will be submitted, and what was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedAttributes {
    pub resolved: Vec<CrmAttributeRef>,
    pub unresolved: Vec<LogicalAttributeRef>,
}

/// Resolves logical attribute names, in order of precedence:
/// caller-supplied numeric ID, configured fixed ID, catalog lookup.
pub struct AttributeMapper<'a> {
    config: &'a AttributeConfig,
    catalog: Option<&'a AttributeCatalog>,
}

impl<'a> AttributeMapper<'a> {
    pub fn new(config: &'a AttributeConfig, catalog: Option<&'a AttributeCatalog>) -> Self {
        Self { config, catalog }
    }

    /// True when some logical entry has no fixed ID and must go through the catalog
    pub fn needs_catalog(config: &AttributeConfig, inputs: &[AttributeInput]) -> bool {
        inputs.iter().any(|input| match input {
            AttributeInput::Logical { name, .. } => config.fixed_id(name).is_none(),
            AttributeInput::Direct { .. } => false,
        })
    }

    pub fn resolve_id(&self, logical_name: &str) -> Option<i64> {
        self.config.fixed_id(logical_name).or_else(|| {
            self.catalog
                .filter(|catalog| !catalog.is_empty())
                .and_then(|catalog| catalog.find_logical(logical_name))
        })
    }

    /// Map every input; entries that cannot be resolved are dropped, never zero-filled
    pub fn map(&self, inputs: &[AttributeInput]) -> MappedAttributes {
        let mut mapped = MappedAttributes::default();

        for input in inputs {
            match input {
                AttributeInput::Direct { attribute_id, value } => {
                    mapped.resolved.push(CrmAttributeRef {
                        numeric_id: *attribute_id,
                        value: stringify_value(value),
                    });
                }
                AttributeInput::Logical { name, value } => match self.resolve_id(name) {
                    Some(numeric_id) => mapped.resolved.push(CrmAttributeRef {
                        numeric_id,
                        value: stringify_value(value),
                    }),
                    None => {
                        log::warn!("Dropping attribute '{}': no CRM attribute ID found", name);
                        mapped.unresolved.push(LogicalAttributeRef {
                            logical_name: name.clone(),
                            value: stringify_value(value),
                        });
                    }
                },
            }
        }

        mapped
    }
}

/// Annotate a fetched user's raw `{attributeId, value}` entries with catalog codes
pub fn annotate_attributes(user: &Value, catalog: &AttributeCatalog) -> Vec<ResolvedAttribute> {
    let index = catalog.code_index();

    user.get("attributes")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    let attribute_id = ["attributeId", "id"]
                        .iter()
                        .find_map(|field| entry.get(*field).filter(|v| !v.is_null()))
                        .cloned()
                        .unwrap_or(Value::Null);
                    let code = parse_numeric_id(&attribute_id)
                        .and_then(|id| index.get(&id).cloned());

                    ResolvedAttribute {
                        attribute_id,
                        code,
                        value: entry.get("value").cloned().unwrap_or(Value::Null),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> AttributeCatalog {
        AttributeCatalog::from_entries(
            Some("/attributes".to_string()),
            vec![
                json!({"id": 5, "code": "user.parent1"}),
                json!({"id": 6, "code": "user.discount"}),
            ],
        )
    }

    fn logical(name: &str, value: Value) -> AttributeInput {
        AttributeInput::Logical { name: name.to_string(), value }
    }

    #[test]
    fn test_logical_names_resolve_through_catalog() {
        let config = AttributeConfig::default();
        let catalog = catalog();
        let mapper = AttributeMapper::new(&config, Some(&catalog));

        let mapped = mapper.map(&[logical("parent1", json!("Мама Анна")), logical("discount", json!(10))]);

        assert_eq!(
            mapped.resolved,
            vec![
                CrmAttributeRef { numeric_id: 5, value: "Мама Анна".to_string() },
                CrmAttributeRef { numeric_id: 6, value: "10".to_string() },
            ]
        );
        assert!(mapped.unresolved.is_empty());
    }

    #[test]
    fn test_direct_ids_pass_through_without_catalog() {
        let config = AttributeConfig::default();
        let mapper = AttributeMapper::new(&config, None);

        let mapped = mapper.map(&[AttributeInput::Direct { attribute_id: 77, value: Value::Null }]);

        assert_eq!(mapped.resolved, vec![CrmAttributeRef { numeric_id: 77, value: String::new() }]);
    }

    #[test]
    fn test_unresolved_names_are_reported_not_defaulted() {
        let config = AttributeConfig::default();
        let empty = AttributeCatalog::empty();
        let mapper = AttributeMapper::new(&config, Some(&empty));

        let mapped = mapper.map(&[
            logical("parent1", json!("Anna")),
            AttributeInput::Direct { attribute_id: 9, value: json!("x") },
        ]);

        assert_eq!(mapped.resolved, vec![CrmAttributeRef { numeric_id: 9, value: "x".to_string() }]);
        assert_eq!(
            mapped.unresolved,
            vec![LogicalAttributeRef { logical_name: "parent1".to_string(), value: "Anna".to_string() }]
        );
    }

    #[test]
    fn test_fixed_id_takes_precedence_over_catalog() {
        let mut config = AttributeConfig::default();
        config.fixed_ids.insert("parent1".to_string(), 500);
        let catalog = catalog();
        let mapper = AttributeMapper::new(&config, Some(&catalog));

        assert_eq!(mapper.resolve_id("parent1"), Some(500));
        assert_eq!(mapper.resolve_id("discount"), Some(6));
    }

    #[test]
    fn test_needs_catalog_only_for_names_without_fixed_id() {
        let mut config = AttributeConfig::default();
        config.fixed_ids.insert("parent1".to_string(), 500);

        assert!(!AttributeMapper::needs_catalog(&config, &[]));
        assert!(!AttributeMapper::needs_catalog(&config, &[logical("parent1", json!("a"))]));
        assert!(!AttributeMapper::needs_catalog(
            &config,
            &[AttributeInput::Direct { attribute_id: 1, value: json!("a") }]
        ));
        assert!(AttributeMapper::needs_catalog(&config, &[logical("discount", json!(5))]));
    }

    #[test]
    fn test_reverse_mapping_annotates_codes() {
        let user = json!({
            "id": 1,
            "attributes": [
                {"attributeId": 5, "value": "Anna"},
                {"id": "6", "value": "10"},
                {"attributeId": 999, "value": "?"}
            ]
        });

        let annotated = annotate_attributes(&user, &catalog());

        assert_eq!(
            annotated,
            vec![
                ResolvedAttribute {
                    attribute_id: json!(5),
                    code: Some("user.parent1".to_string()),
                    value: json!("Anna"),
                },
                ResolvedAttribute {
                    attribute_id: json!("6"),
                    code: Some("user.discount".to_string()),
                    value: json!("10"),
                },
                ResolvedAttribute { attribute_id: json!(999), code: None, value: json!("?") },
            ]
        );
    }

    #[test]
    fn test_reverse_mapping_without_attributes() {
        assert!(annotate_attributes(&json!({"id": 1}), &catalog()).is_empty());
    }
}
