//! Lead submission pipeline
//!
//! `AcquiringToken -> ResolvingAttributes (optional) -> Submitting -> Done`.
//! Caller input is validated before any remote call is made.

use crate::clients::{CrmSession, CrmTransport};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::services::{normalize_phone, AttributeCatalog, AttributeMapper, MappedAttributes};
use crate::types::{Contact, LeadOutcome};
use gateway_types::{SubmitLeadRequest, SubmitLeadResponse, TextOrNumber};
use std::fmt;

/// Stages of a lead submission, used for progress logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadStage {
    AcquiringToken,
    ResolvingAttributes,
    Submitting,
    Done,
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            LeadStage::AcquiringToken => "acquiring token",
            LeadStage::ResolvingAttributes => "resolving attributes",
            LeadStage::Submitting => "submitting",
            LeadStage::Done => "done",
        };
        f.write_str(stage)
    }
}

/// Everything a finished submission produced
#[derive(Debug, Clone, PartialEq)]
pub struct LeadSubmission {
    pub outcome: LeadOutcome,
    pub contact: Contact,
    pub attributes: MappedAttributes,
}

impl From<&LeadSubmission> for SubmitLeadResponse {
    fn from(submission: &LeadSubmission) -> Self {
        match &submission.outcome {
            LeadOutcome::Created(data) => SubmitLeadResponse::created(data.clone()),
            LeadOutcome::AlreadyExists => SubmitLeadResponse::already_exists(),
        }
    }
}

pub struct LeadSubmitter<'a> {
    transport: &'a dyn CrmTransport,
    config: &'a GatewayConfig,
}

impl<'a> LeadSubmitter<'a> {
    pub fn new(transport: &'a dyn CrmTransport, config: &'a GatewayConfig) -> Self {
        Self { transport, config }
    }

    pub async fn submit(&self, request: &SubmitLeadRequest) -> Result<LeadSubmission> {
        let name = request
            .name
            .as_ref()
            .filter(|name| !name.is_blank())
            .map(TextOrNumber::to_text)
            .ok_or_else(|| GatewayError::Validation("Missing name".to_string()))?;
        let raw_phone = request
            .phone
            .as_ref()
            .filter(|phone| !phone.is_blank())
            .ok_or_else(|| GatewayError::Validation("Missing phone".to_string()))?;
        let phone = normalize_phone(&raw_phone.to_text())?;
        let credential = self.config.crm.credential()?;

        log::debug!("Lead {}: {}", phone, LeadStage::AcquiringToken);
        let session = CrmSession::new(self.transport).authenticate(&credential).await?;

        let inputs = request.attribute_inputs();
        let catalog_needed = AttributeMapper::needs_catalog(&self.config.attributes, &inputs);
        let catalog = if catalog_needed {
            log::debug!("Lead {}: {}", phone, LeadStage::ResolvingAttributes);
            session
                .resolve_catalog(&self.config.attributes.catalog_endpoints)
                .await
        } else {
            AttributeCatalog::empty()
        };

        let attributes = AttributeMapper::new(&self.config.attributes, Some(&catalog)).map(&inputs);

        // Without a catalog, go ahead only if something else in the request resolved
        if catalog_needed && catalog.is_empty() && attributes.resolved.is_empty() {
            return Err(GatewayError::catalog_unavailable());
        }
        if !attributes.unresolved.is_empty() {
            log::warn!(
                "Lead {}: submitting without {} unresolved attribute(s)",
                phone,
                attributes.unresolved.len()
            );
        }

        let contact = Contact::new(
            name,
            phone,
            request.email.as_ref().map(TextOrNumber::to_text),
            request.note.as_ref().map(TextOrNumber::to_text),
            attributes.resolved.clone(),
        );

        log::debug!("Lead {}: {}", contact.phone(), LeadStage::Submitting);
        let outcome = session.create_user(&contact).await?;
        let result = match outcome {
            LeadOutcome::Created(_) => "created",
            LeadOutcome::AlreadyExists => "already exists",
        };
        log::info!("Lead {}: {} ({})", contact.phone(), LeadStage::Done, result);

        Ok(LeadSubmission {
            outcome,
            contact,
            attributes,
        })
    }
}
