//! Type-safe CRM session with compile-time authentication enforcement
//!
//! Authenticated calls only exist on `CrmSession<Authenticated>`, and the only
//! way to obtain one is to exchange an API credential for a session token.
//! The token lives inside the session and is dropped with it at the end of
//! the operation.

use crate::clients::CrmTransport;
use crate::error::{GatewayError, Result};
use crate::services::{acquire_token, resolve_catalog, AttributeCatalog};
use crate::types::{ApiCredential, Contact, LeadOutcome, SessionToken};
use serde_json::Value;

// Type-safe authentication states
pub struct Unauthenticated;

pub struct Authenticated {
    token: SessionToken,
}

pub struct CrmSession<'a, State = Unauthenticated> {
    transport: &'a dyn CrmTransport,
    state: State,
}

impl<'a> CrmSession<'a, Unauthenticated> {
    pub fn new(transport: &'a dyn CrmTransport) -> Self {
        Self {
            transport,
            state: Unauthenticated,
        }
    }

    /// Authenticate and transition to authenticated state
    pub async fn authenticate(
        self,
        credential: &ApiCredential,
    ) -> Result<CrmSession<'a, Authenticated>> {
        let token = acquire_token(self.transport, credential).await?;
        log::debug!("CRM session authenticated");

        Ok(CrmSession {
            transport: self.transport,
            state: Authenticated { token },
        })
    }
}

impl<'a> CrmSession<'a, Authenticated> {
    pub fn token(&self) -> &SessionToken {
        &self.state.token
    }

    /// Read a user record; any non-success status counts as not found
    pub async fn fetch_user(&self, user_id: &str) -> Result<Value> {
        let reply = self.transport.fetch_user(self.token(), user_id).await?;

        if !reply.is_success() {
            log::warn!("CRM user {} lookup failed with status {}", user_id, reply.status);
            return Err(GatewayError::NotFound(reply.error_text()));
        }

        Ok(reply.json_or_empty())
    }

    /// Create a user; a 409 conflict means the contact already exists
    pub async fn create_user(&self, contact: &Contact) -> Result<LeadOutcome> {
        let reply = self.transport.create_user(self.token(), contact).await?;

        if reply.status == 409 {
            log::info!("CRM reports contact {} already exists", contact.phone());
            return Ok(LeadOutcome::AlreadyExists);
        }

        if !reply.is_success() {
            log::error!("CRM create-user failed with status {}", reply.status);
            return Err(GatewayError::Rejected(reply.error_text()));
        }

        Ok(LeadOutcome::Created(reply.json_or_empty()))
    }

    pub async fn resolve_catalog(&self, endpoints: &[String]) -> AttributeCatalog {
        resolve_catalog(self.transport, self.token(), endpoints).await
    }
}
