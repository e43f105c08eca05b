//! reqwest-backed CRM transport

use crate::clients::transport::{CrmReply, CrmTransport};
use crate::config::CrmConfig;
use crate::constants::{ACCESS_TOKEN_HEADER, TOKEN_PATH, USERS_PATH};
use crate::error::{GatewayError, Result};
use crate::types::{ApiCredential, Contact, SessionToken};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, Url};
use serde_json::json;

pub struct MoyKlassClient {
    config: CrmConfig,
    http_client: HttpClient,
}

impl MoyKlassClient {
    pub fn new(config: CrmConfig) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// `{base}/users/{id}` with the ID encoded as a single path segment
    fn user_url(&self, user_id: &str) -> Result<Url> {
        // `push` drops dot segments, which would leave `{base}/users`
        if is_dot_segment(user_id) {
            return Err(GatewayError::Validation(format!("Invalid user id: {}", user_id)));
        }
        let mut url = Url::parse(&self.config.url(USERS_PATH))
            .map_err(|e| GatewayError::Config(format!("Invalid CRM base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config("CRM base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(user_id);
        Ok(url)
    }

    async fn into_reply(response: Response) -> CrmReply {
        let status = response.status().as_u16();
        let body = response.text().await.ok();
        CrmReply { status, body }
    }
}

/// `.` and `..` would address the users collection instead of one user
pub(crate) fn is_dot_segment(user_id: &str) -> bool {
    matches!(user_id, "." | "..")
}

#[async_trait]
impl CrmTransport for MoyKlassClient {
    async fn request_token(&self, credential: &ApiCredential) -> Result<CrmReply> {
        let url = self.config.url(TOKEN_PATH);
        log::debug!("Requesting CRM session token from {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "apiKey": credential.expose() }))
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }

    async fn fetch_user(&self, token: &SessionToken, user_id: &str) -> Result<CrmReply> {
        let url = self.user_url(user_id)?;
        log::debug!("Fetching CRM user from {}", url);

        let response = self
            .http_client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, token.as_str())
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }

    async fn create_user(&self, token: &SessionToken, contact: &Contact) -> Result<CrmReply> {
        let url = self.config.url(USERS_PATH);
        log::debug!(
            "Creating CRM user at {} with {} attribute(s)",
            url,
            contact.attributes().len()
        );

        let response = self
            .http_client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, token.as_str())
            .json(contact)
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }

    async fn fetch_catalog(&self, token: &SessionToken, endpoint: &str) -> Result<CrmReply> {
        let url = self.config.url(endpoint);
        log::debug!("Probing attribute catalog at {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, token.as_str())
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }
}
