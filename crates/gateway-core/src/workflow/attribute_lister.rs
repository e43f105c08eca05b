//! Diagnostic listing of the CRM attribute catalog

use crate::clients::{CrmSession, CrmTransport};
use crate::config::GatewayConfig;
use crate::constants::{CATALOG_SAMPLE_SIZE, DISCOUNT_ATTRIBUTE, PARENT1_ATTRIBUTE};
use crate::error::{GatewayError, Result};
use crate::services::AttributeMapper;
use gateway_types::ListAttributesResponse;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeListing {
    /// Absolute URL of the candidate that answered
    pub endpoint: Option<String>,
    /// Raw entries in the catalog, including ones without a usable ID
    pub count: usize,
    pub parent1_id: Option<i64>,
    pub discount_id: Option<i64>,
    pub sample: Vec<Value>,
}

impl From<AttributeListing> for ListAttributesResponse {
    fn from(listing: AttributeListing) -> Self {
        ListAttributesResponse {
            ok: true,
            endpoint: listing.endpoint,
            count: listing.count,
            parent1_id: listing.parent1_id,
            discount_id: listing.discount_id,
            sample: listing.sample,
        }
    }
}

pub struct AttributeLister<'a> {
    transport: &'a dyn CrmTransport,
    config: &'a GatewayConfig,
}

impl<'a> AttributeLister<'a> {
    pub fn new(transport: &'a dyn CrmTransport, config: &'a GatewayConfig) -> Self {
        Self { transport, config }
    }

    pub async fn list(&self) -> Result<AttributeListing> {
        let credential = self.config.crm.credential()?;
        let session = CrmSession::new(self.transport).authenticate(&credential).await?;

        let catalog = session
            .resolve_catalog(&self.config.attributes.catalog_endpoints)
            .await;
        if catalog.is_empty() {
            return Err(GatewayError::catalog_unavailable());
        }

        let mapper = AttributeMapper::new(&self.config.attributes, Some(&catalog));
        log::info!("Listing {} catalog entries", catalog.entries().len());
        Ok(AttributeListing {
            endpoint: catalog.endpoint().map(|path| self.config.crm.url(path)),
            count: catalog.entries().len(),
            parent1_id: mapper.resolve_id(PARENT1_ATTRIBUTE),
            discount_id: mapper.resolve_id(DISCOUNT_ATTRIBUTE),
            sample: catalog
                .entries()
                .iter()
                .take(CATALOG_SAMPLE_SIZE)
                .cloned()
                .collect(),
        })
    }
}
