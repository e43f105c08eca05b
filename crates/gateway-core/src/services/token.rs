//! Session token acquisition

use crate::clients::CrmTransport;
use crate::constants::TOKEN_FIELDS;
use crate::error::{GatewayError, Result};
use crate::types::{ApiCredential, SessionToken};
use serde_json::Value;

/// Exchange the static API key for a session token. One attempt, no retry.
pub async fn acquire_token(
    transport: &dyn CrmTransport,
    credential: &ApiCredential,
) -> Result<SessionToken> {
    let reply = transport.request_token(credential).await?;

    if !reply.is_success() {
        log::warn!("CRM token exchange rejected with status {}", reply.status);
        return Err(GatewayError::Auth(reply.error_text()));
    }

    extract_token(&reply.json_or_empty()).ok_or_else(|| {
        log::warn!("CRM token response carried none of {:?}", TOKEN_FIELDS);
        GatewayError::AuthTokenMissing
    })
}

/// Extract the token from whichever field name this API revision uses
pub fn extract_token(body: &Value) -> Option<SessionToken> {
    TOKEN_FIELDS.iter().find_map(|field| match body.get(*field) {
        Some(Value::String(token)) if !token.is_empty() => Some(SessionToken::new(token.clone())),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CrmReply;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[test]
    fn test_token_field_aliases() {
        for field in TOKEN_FIELDS {
            let mut body = serde_json::Map::new();
            body.insert(field.to_string(), json!("abc"));
            let token = extract_token(&Value::Object(body)).unwrap();
            assert_eq!(token.as_str(), "abc");
        }
    }

    #[test]
    fn test_first_present_field_wins() {
        let body = json!({"accessToken": "", "token": "second", "access_token": "third"});
        assert_eq!(extract_token(&body).unwrap().as_str(), "second");
        assert!(extract_token(&json!({"accessToken": 42})).is_none());
        assert!(extract_token(&json!([])).is_none());
    }

    #[tokio::test]
    async fn test_rejected_exchange_carries_body() {
        let transport =
            ScriptedTransport::new().with_token_reply(CrmReply::new(403, "invalid apiKey"));
        let err = acquire_token(&transport, &ApiCredential::new("k")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(ref body) if body == "invalid apiKey"));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_unreadable_rejection_falls_back_to_status() {
        let transport =
            ScriptedTransport::new().with_token_reply(CrmReply { status: 500, body: None });
        let err = acquire_token(&transport, &ApiCredential::new("k")).await.unwrap_err();
        assert_eq!(err.to_string(), "Auth error: 500");
    }

    #[tokio::test]
    async fn test_success_without_token_field() {
        let transport =
            ScriptedTransport::new().with_token_reply(CrmReply::new(200, "not even json"));
        let err = acquire_token(&transport, &ApiCredential::new("k")).await.unwrap_err();
        assert!(matches!(err, GatewayError::AuthTokenMissing));
    }

    #[tokio::test]
    async fn test_credential_is_forwarded_once() {
        let transport = ScriptedTransport::new();
        let token = acquire_token(&transport, &ApiCredential::new("key-1")).await.unwrap();
        assert_eq!(token.as_str(), ScriptedTransport::DEFAULT_TOKEN);
        assert_eq!(transport.calls(), vec!["request_token".to_string()]);
        assert_eq!(transport.credentials_seen(), vec!["key-1".to_string()]);
    }
}
