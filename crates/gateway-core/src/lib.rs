//! Lead Gateway Core Library
//!
//! Business logic for the lead gateway: CRM client, phone normalization,
//! attribute resolution and the three operation pipelines.

pub mod config;
pub mod clients;
pub mod constants;
pub mod services;
pub mod workflow;
pub mod types;
pub mod error;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types for easy access
pub use config::{AttributeConfig, CrmConfig, GatewayConfig};
pub use error::{GatewayError, Result};

pub use clients::{CrmReply, CrmTransport, MoyKlassClient};

pub use services::{normalize_phone, AttributeCatalog, MappedAttributes};

pub use types::{Contact, CrmAttributeRef, LeadOutcome, NormalizedPhone};

pub use workflow::{AttributeListing, FetchedUser, LeadGateway, LeadSubmission};
