//! User lookup with optional attribute-code enrichment

use crate::clients::moyklass::is_dot_segment;
use crate::clients::{CrmSession, CrmTransport};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::services::annotate_attributes;
use gateway_types::{FetchUserQuery, FetchUserResponse, ResolvedAttribute};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedUser {
    pub user: Value,
    /// `None` when enrichment was not asked for or no catalog was readable
    pub resolved_attributes: Option<Vec<ResolvedAttribute>>,
}

impl From<FetchedUser> for FetchUserResponse {
    fn from(fetched: FetchedUser) -> Self {
        FetchUserResponse {
            ok: true,
            user: fetched.user,
            resolved_attributes: fetched.resolved_attributes,
        }
    }
}

pub struct UserFetcher<'a> {
    transport: &'a dyn CrmTransport,
    config: &'a GatewayConfig,
}

impl<'a> UserFetcher<'a> {
    pub fn new(transport: &'a dyn CrmTransport, config: &'a GatewayConfig) -> Self {
        Self { transport, config }
    }

    pub async fn fetch(&self, query: &FetchUserQuery) -> Result<FetchedUser> {
        // Sent as given; whitespace only matters for the presence check
        let user_id = query
            .user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::Validation("Query param 'userId' is required".to_string())
            })?;
        if is_dot_segment(user_id) {
            return Err(GatewayError::Validation(
                "Query param 'userId' is invalid".to_string(),
            ));
        }
        let credential = self.config.crm.credential()?;

        let session = CrmSession::new(self.transport).authenticate(&credential).await?;
        let user = session.fetch_user(user_id).await?;

        if !query.wants_resolution() {
            log::info!("User {} fetched", user_id);
            return Ok(FetchedUser {
                user,
                resolved_attributes: None,
            });
        }

        let catalog = session
            .resolve_catalog(&self.config.attributes.catalog_endpoints)
            .await;
        // Enrichment is best effort: the raw user is still returned
        let resolved_attributes = if catalog.is_empty() {
            log::warn!("User {}: attribute catalog unavailable, skipping enrichment", user_id);
            None
        } else {
            Some(annotate_attributes(&user, &catalog))
        };
        log::info!(
            "User {} fetched ({} annotated attribute(s))",
            user_id,
            resolved_attributes.as_ref().map_or(0, Vec::len)
        );

        Ok(FetchedUser {
            user,
            resolved_attributes,
        })
    }
}
