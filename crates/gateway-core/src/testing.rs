//! Scripted in-memory CRM transport for tests
//!
//! Replies are configured up front with builder methods; every call is
//! recorded so tests can assert on which remote calls happened, in what
//! order, and with which token.

use crate::clients::{CrmReply, CrmTransport};
use crate::error::{GatewayError, Result};
use crate::types::{ApiCredential, Contact, SessionToken};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

type Scripted = std::result::Result<CrmReply, String>;

pub struct ScriptedTransport {
    token_reply: Scripted,
    user_reply: Scripted,
    create_reply: Scripted,
    /// Unscripted catalog paths answer 404
    catalog_replies: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
    tokens_seen: Mutex<Vec<String>>,
    credentials_seen: Mutex<Vec<String>>,
    created: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    pub const DEFAULT_TOKEN: &'static str = "scripted-token";

    /// Token exchange succeeds, user 1 exists, create-user answers 200; no catalog
    pub fn new() -> Self {
        Self {
            token_reply: Ok(CrmReply::new(
                200,
                json!({ "accessToken": Self::DEFAULT_TOKEN }).to_string(),
            )),
            user_reply: Ok(CrmReply::new(200, json!({ "id": 1, "attributes": [] }).to_string())),
            create_reply: Ok(CrmReply::new(200, json!({ "id": 101 }).to_string())),
            catalog_replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
            credentials_seen: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token(self, token: &str) -> Self {
        self.with_token_reply(CrmReply::new(200, json!({ "accessToken": token }).to_string()))
    }

    pub fn with_token_reply(mut self, reply: CrmReply) -> Self {
        self.token_reply = Ok(reply);
        self
    }

    pub fn with_token_failure(mut self, message: &str) -> Self {
        self.token_reply = Err(message.to_string());
        self
    }

    pub fn with_user(self, user: Value) -> Self {
        self.with_user_reply(CrmReply::new(200, user.to_string()))
    }

    pub fn with_user_reply(mut self, reply: CrmReply) -> Self {
        self.user_reply = Ok(reply);
        self
    }

    pub fn with_create_reply(mut self, reply: CrmReply) -> Self {
        self.create_reply = Ok(reply);
        self
    }

    pub fn with_catalog(mut self, endpoint: &str, reply: CrmReply) -> Self {
        self.catalog_replies.insert(endpoint.to_string(), Ok(reply));
        self
    }

    pub fn with_catalog_failure(mut self, endpoint: &str, message: &str) -> Self {
        self.catalog_replies
            .insert(endpoint.to_string(), Err(message.to_string()));
        self
    }

    /// Calls in order: `request_token`, `fetch_user:{id}`, `create_user`, `fetch_catalog:{path}`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Tokens presented on authenticated calls, in order
    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().expect("tokens lock poisoned").clone()
    }

    pub fn credentials_seen(&self) -> Vec<String> {
        self.credentials_seen
            .lock()
            .expect("credentials lock poisoned")
            .clone()
    }

    /// Serialized create-user payloads, exactly as they would go on the wire
    pub fn created_payloads(&self) -> Vec<Value> {
        self.created.lock().expect("created lock poisoned").clone()
    }

    fn record(&self, call: String, token: Option<&SessionToken>) {
        self.calls.lock().expect("calls lock poisoned").push(call);
        if let Some(token) = token {
            self.tokens_seen
                .lock()
                .expect("tokens lock poisoned")
                .push(token.as_str().to_string());
        }
    }

    fn play(scripted: &Scripted) -> Result<CrmReply> {
        scripted
            .clone()
            .map_err(GatewayError::Transport)
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CrmTransport for ScriptedTransport {
    async fn request_token(&self, credential: &ApiCredential) -> Result<CrmReply> {
        self.record("request_token".to_string(), None);
        self.credentials_seen
            .lock()
            .expect("credentials lock poisoned")
            .push(credential.expose().to_string());
        Self::play(&self.token_reply)
    }

    async fn fetch_user(&self, token: &SessionToken, user_id: &str) -> Result<CrmReply> {
        self.record(format!("fetch_user:{}", user_id), Some(token));
        Self::play(&self.user_reply)
    }

    async fn create_user(&self, token: &SessionToken, contact: &Contact) -> Result<CrmReply> {
        self.record("create_user".to_string(), Some(token));
        self.created
            .lock()
            .expect("created lock poisoned")
            .push(serde_json::to_value(contact)?);
        Self::play(&self.create_reply)
    }

    async fn fetch_catalog(&self, token: &SessionToken, endpoint: &str) -> Result<CrmReply> {
        self.record(format!("fetch_catalog:{}", endpoint), Some(token));
        match self.catalog_replies.get(endpoint) {
            Some(scripted) => Self::play(scripted),
            None => Ok(CrmReply::new(404, "Not Found")),
        }
    }
}
