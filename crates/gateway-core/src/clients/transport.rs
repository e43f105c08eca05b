//! Transport seam between the gateway and the CRM REST API
//!
//! Every remote call the gateway makes goes through [`CrmTransport`]. The
//! production implementation is [`super::MoyKlassClient`]; tests substitute a
//! scripted transport so the pipelines can be exercised without a network.

use crate::error::Result;
use crate::types::{ApiCredential, Contact, SessionToken};
use async_trait::async_trait;
use serde_json::Value;

/// Status and body of one CRM response
#[derive(Debug, Clone, PartialEq)]
pub struct CrmReply {
    pub status: u16,
    /// `None` when the body could not be read
    pub body: Option<String>,
}

impl CrmReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text for error messages, falling back to the numeric status
    pub fn error_text(&self) -> String {
        self.body
            .clone()
            .unwrap_or_else(|| self.status.to_string())
    }

    /// Body parsed as JSON, `None` if absent or malformed
    pub fn json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }

    /// Body parsed as JSON, or an empty object when that fails
    pub fn json_or_empty(&self) -> Value {
        self.json()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}

/// The four CRM calls the gateway depends on.
///
/// Implementations report transport failures as `Err` and every HTTP
/// status (including non-success) as `Ok(CrmReply)`.
#[async_trait]
pub trait CrmTransport: Send + Sync {
    /// `POST /auth/getToken` with `{apiKey}`
    async fn request_token(&self, credential: &ApiCredential) -> Result<CrmReply>;

    /// `GET /users/{id}`
    async fn fetch_user(&self, token: &SessionToken, user_id: &str) -> Result<CrmReply>;

    /// `POST /users`
    async fn create_user(&self, token: &SessionToken, contact: &Contact) -> Result<CrmReply>;

    /// `GET {endpoint}` for one attribute catalog candidate path
    async fn fetch_catalog(&self, token: &SessionToken, endpoint: &str) -> Result<CrmReply>;
}
