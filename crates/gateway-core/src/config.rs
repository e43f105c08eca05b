//! Configuration management for the lead gateway

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CATALOG_ENDPOINTS, DISCOUNT_ATTRIBUTE, PARENT1_ATTRIBUTE,
};
use crate::error::{GatewayError, Result};
use crate::types::ApiCredential;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Raw configuration structure matching the environment variable names exactly
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    mk_api_key: Option<String>,
    #[serde(default)]
    moyklass_api_key: Option<String>,
    #[serde(default)]
    mk_base_url: Option<String>,
    #[serde(default)]
    mk_parent1_attribute_id: Option<String>,
    #[serde(default)]
    mk_discount_attribute_id: Option<String>,
    /// Comma-separated catalog candidate paths
    #[serde(default)]
    mk_attribute_endpoints: Option<String>,
    #[serde(default)]
    mk_request_timeout_secs: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub crm: CrmConfig,
    pub attributes: AttributeConfig,
}

#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Missing key is reported per operation, not at load time
    pub api_key: Option<ApiCredential>,
    pub base_url: String,
    /// `None` leaves the transport default in place
    pub request_timeout_secs: Option<u64>,
}

impl CrmConfig {
    pub fn credential(&self) -> Result<ApiCredential> {
        self.api_key
            .clone()
            .ok_or_else(|| GatewayError::Config("MK_API_KEY not set".to_string()))
    }

    /// Absolute URL for an API path such as `/attributes`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeConfig {
    /// Catalog candidate paths, probed in order
    pub catalog_endpoints: Vec<String>,
    /// Logical name (lower case) -> fixed CRM attribute ID
    pub fixed_ids: BTreeMap<String, i64>,
}

impl AttributeConfig {
    pub fn fixed_id(&self, logical_name: &str) -> Option<i64> {
        self.fixed_ids
            .get(&logical_name.trim().to_lowercase())
            .copied()
    }
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            catalog_endpoints: default_catalog_endpoints(),
            fixed_ids: BTreeMap::new(),
        }
    }
}

fn default_catalog_endpoints() -> Vec<String> {
    DEFAULT_CATALOG_ENDPOINTS.iter().map(|e| e.to_string()).collect()
}

impl GatewayConfig {
    /// Load configuration from the process environment, layered over an optional file
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::build(config_file, None)
    }

    /// Load configuration from an explicit variable map instead of the process environment
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(None, Some(vars))
    }

    /// Load configuration from a file, layered under an explicit variable map
    pub fn from_file_with_env<P: AsRef<Path>>(
        path: P,
        vars: HashMap<String, String>,
    ) -> Result<Self> {
        Self::build(Some(path.as_ref()), Some(vars))
    }

    fn build(config_file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::default().source(env));

        let raw: RawConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| GatewayError::Config(format!("Failed to load configuration: {}", e)))?;

        Self::from_raw_config(raw)
    }

    /// Convert raw config to structured config, resolving aliases and parsing numbers
    fn from_raw_config(raw: RawConfig) -> Result<Self> {
        let api_key = non_empty(raw.mk_api_key)
            .or_else(|| non_empty(raw.moyklass_api_key))
            .map(ApiCredential::new);

        let base_url = non_empty(raw.mk_base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout_secs = non_empty(raw.mk_request_timeout_secs)
            .map(|secs| {
                secs.trim().parse::<u64>().map_err(|_| {
                    GatewayError::Config(format!("MK_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
                })
            })
            .transpose()?;

        let mut fixed_ids = BTreeMap::new();
        for (logical_name, env_name, raw_id) in [
            (PARENT1_ATTRIBUTE, "MK_PARENT1_ATTRIBUTE_ID", raw.mk_parent1_attribute_id),
            (DISCOUNT_ATTRIBUTE, "MK_DISCOUNT_ATTRIBUTE_ID", raw.mk_discount_attribute_id),
        ] {
            if let Some(id) = non_empty(raw_id) {
                let id = id.trim().parse::<i64>().map_err(|_| {
                    GatewayError::Config(format!("{} is not a numeric attribute ID: {}", env_name, id))
                })?;
                fixed_ids.insert(logical_name.to_string(), id);
            }
        }

        let catalog_endpoints = non_empty(raw.mk_attribute_endpoints)
            .map(|list| parse_endpoint_list(&list))
            .filter(|endpoints| !endpoints.is_empty())
            .unwrap_or_else(default_catalog_endpoints);

        Ok(Self {
            crm: CrmConfig {
                api_key,
                base_url,
                request_timeout_secs,
            },
            attributes: AttributeConfig {
                catalog_endpoints,
                fixed_ids,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_endpoint_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| {
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_list_gets_leading_slash() {
        assert_eq!(
            parse_endpoint_list(" attributes, /users/attributes ,,"),
            vec!["/attributes".to_string(), "/users/attributes".to_string()]
        );
    }

    #[test]
    fn test_fixed_id_lookup_is_case_insensitive() {
        let mut config = AttributeConfig::default();
        config.fixed_ids.insert("parent1".to_string(), 12);
        assert_eq!(config.fixed_id(" Parent1 "), Some(12));
        assert_eq!(config.fixed_id("discount"), None);
    }
}
