//! Single entry point for the three gateway operations

use super::attribute_lister::{AttributeLister, AttributeListing};
use super::lead_submitter::{LeadSubmission, LeadSubmitter};
use super::user_fetcher::{FetchedUser, UserFetcher};
use crate::clients::{CrmTransport, MoyKlassClient};
use crate::config::GatewayConfig;
use crate::error::Result;
use gateway_types::{FetchUserQuery, SubmitLeadRequest};
use std::sync::Arc;

/// Shared by every request; holds no per-operation state
#[derive(Clone)]
pub struct LeadGateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn CrmTransport>,
}

impl LeadGateway {
    pub fn new(config: GatewayConfig, transport: Arc<dyn CrmTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Gateway talking to the real CRM over HTTPS
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let client = MoyKlassClient::new(config.crm.clone())?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub async fn submit_lead(&self, request: &SubmitLeadRequest) -> Result<LeadSubmission> {
        LeadSubmitter::new(self.transport.as_ref(), &self.config)
            .submit(request)
            .await
    }

    pub async fn fetch_user(&self, query: &FetchUserQuery) -> Result<FetchedUser> {
        UserFetcher::new(self.transport.as_ref(), &self.config)
            .fetch(query)
            .await
    }

    pub async fn list_attributes(&self) -> Result<AttributeListing> {
        AttributeLister::new(self.transport.as_ref(), &self.config)
            .list()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttributeConfig, CrmConfig};
    use crate::testing::ScriptedTransport;
    use crate::types::ApiCredential;
    use serde_json::json;

    #[tokio::test]
    async fn test_each_operation_exchanges_its_own_token() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = GatewayConfig {
            crm: CrmConfig {
                api_key: Some(ApiCredential::new("company-key")),
                ..CrmConfig::default()
            },
            attributes: AttributeConfig::default(),
        };
        let gateway = LeadGateway::new(config, transport.clone());

        let request: SubmitLeadRequest =
            serde_json::from_value(json!({"name": "A", "phone": "9991234567"})).unwrap();
        gateway.submit_lead(&request).await.unwrap();
        gateway
            .fetch_user(&FetchUserQuery {
                user_id: Some("1".to_string()),
                resolve_attributes: None,
            })
            .await
            .unwrap();

        assert_eq!(
            transport.credentials_seen(),
            vec!["company-key".to_string(), "company-key".to_string()]
        );
    }

    #[test]
    fn test_from_config_builds_http_client() {
        let gateway = LeadGateway::from_config(GatewayConfig {
            crm: CrmConfig::default(),
            attributes: AttributeConfig::default(),
        });
        assert!(gateway.is_ok());
    }
}
