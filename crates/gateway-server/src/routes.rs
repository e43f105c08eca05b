//! Inbound HTTP routes

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use gateway_core::{GatewayError, LeadGateway};
use gateway_types::{
    FetchUserQuery, FetchUserResponse, ListAttributesResponse, SubmitLeadRequest,
    SubmitLeadResponse,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn router(gateway: LeadGateway) -> Router {
    Router::new()
        .route("/sendLead", post(send_lead))
        .route("/getUser", get(get_user))
        .route("/listAttributes", get(list_attributes))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers([header::CONTENT_TYPE])
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .with_state(gateway)
}

/// Empty body counts as `{}`; anything else must be a JSON object
fn parse_lead_request(body: &[u8]) -> Result<SubmitLeadRequest, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmitLeadRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::Validation(format!("Invalid JSON body: {}", e)))
}

/// Lenient query parsing: unknown keys are ignored and the last duplicate wins
fn parse_user_query(raw: Option<&str>) -> FetchUserQuery {
    let mut query = FetchUserQuery::default();
    for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "userId" => query.user_id = Some(value.into_owned()),
            "resolveAttributes" => query.resolve_attributes = Some(value.into_owned()),
            _ => {}
        }
    }
    query
}

pub async fn send_lead(
    State(gateway): State<LeadGateway>,
    body: Bytes,
) -> Result<Json<SubmitLeadResponse>, ApiError> {
    let request = parse_lead_request(&body)?;
    let submission = gateway.submit_lead(&request).await?;
    Ok(Json(SubmitLeadResponse::from(&submission)))
}

pub async fn get_user(
    State(gateway): State<LeadGateway>,
    RawQuery(raw): RawQuery,
) -> Result<Json<FetchUserResponse>, ApiError> {
    let query = parse_user_query(raw.as_deref());
    let fetched = gateway.fetch_user(&query).await?;
    Ok(Json(fetched.into()))
}

pub async fn list_attributes(
    State(gateway): State<LeadGateway>,
) -> Result<Json<ListAttributesResponse>, ApiError> {
    let listing = gateway.list_attributes().await?;
    Ok(Json(listing.into()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use gateway_core::clients::CrmReply;
    use gateway_core::testing::ScriptedTransport;
    use gateway_core::types::ApiCredential;
    use gateway_core::{AttributeConfig, CrmConfig, GatewayConfig};
    use serde_json::json;
    use std::sync::Arc;

    fn gateway(transport: ScriptedTransport) -> LeadGateway {
        let config = GatewayConfig {
            crm: CrmConfig {
                api_key: Some(ApiCredential::new("test-key")),
                ..CrmConfig::default()
            },
            attributes: AttributeConfig::default(),
        };
        LeadGateway::new(config, Arc::new(transport))
    }

    #[tokio::test]
    async fn test_send_lead_created() {
        let Json(response) = send_lead(
            State(gateway(ScriptedTransport::new())),
            Bytes::from(r#"{"name":"A","phone":"+7 (999) 123-45-67"}"#),
        )
        .await
        .unwrap();

        assert_eq!(response, SubmitLeadResponse::created(json!({"id": 101})));
    }

    #[tokio::test]
    async fn test_send_lead_conflict_is_ok() {
        let transport = ScriptedTransport::new().with_create_reply(CrmReply::new(409, "exists"));

        let Json(response) = send_lead(
            State(gateway(transport)),
            Bytes::from(r#"{"name":"A","phone":"79991234567"}"#),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"ok": true, "status": 409, "message": "User exists"})
        );
    }

    #[tokio::test]
    async fn test_send_lead_bad_bodies() {
        let err = send_lead(State(gateway(ScriptedTransport::new())), Bytes::from("{not json"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.0.to_string().starts_with("Invalid JSON body"));

        // Empty body is `{}`, which then fails validation on the name
        let err = send_lead(State(gateway(ScriptedTransport::new())), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.0.to_string(), "Missing name");
    }

    #[tokio::test]
    async fn test_get_user_requires_user_id() {
        let err = get_user(State(gateway(ScriptedTransport::new())), RawQuery(None))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_user_with_enrichment() {
        let transport = ScriptedTransport::new()
            .with_user(json!({"id": 7, "attributes": [{"attributeId": 5, "value": "Anna"}]}))
            .with_catalog(
                "/attributes",
                CrmReply::new(200, json!([{"id": 5, "code": "user.parent1"}]).to_string()),
            );

        let Json(response) = get_user(
            State(gateway(transport)),
            RawQuery(Some("userId=7&resolveAttributes=1".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap()["resolvedAttributes"],
            json!([{"attributeId": 5, "code": "user.parent1", "value": "Anna"}])
        );
    }

    #[test]
    fn test_user_query_last_duplicate_wins() {
        let query = parse_user_query(Some("userId=1&userId=2&resolveAttributes=&extra=x"));
        assert_eq!(query.user_id.as_deref(), Some("2"));
        assert_eq!(query.resolve_attributes.as_deref(), Some(""));

        let query = parse_user_query(Some("userId=a%2Fb+c&userId"));
        assert_eq!(query.user_id.as_deref(), Some(""));

        let query = parse_user_query(Some("userId=a%2Fb+c"));
        assert_eq!(query.user_id.as_deref(), Some("a/b c"));
    }

    #[tokio::test]
    async fn test_get_user_duplicate_ids_answer_json() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = GatewayConfig {
            crm: CrmConfig {
                api_key: Some(ApiCredential::new("test-key")),
                ..CrmConfig::default()
            },
            attributes: AttributeConfig::default(),
        };
        let lead_gateway = LeadGateway::new(config, transport.clone());

        let Json(response) = get_user(
            State(lead_gateway),
            RawQuery(Some("userId=1&userId=2".to_string())),
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert!(transport.calls().contains(&"fetch_user:2".to_string()));
    }

    #[tokio::test]
    async fn test_get_user_bad_query_answers_json_error() {
        let response = get_user(
            State(gateway(ScriptedTransport::new())),
            RawQuery(Some("userId=..".to_string())),
        )
        .await
        .unwrap_err()
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_list_attributes_without_catalog_is_bad_gateway() {
        let err = list_attributes(State(gateway(ScriptedTransport::new())))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn test_router_builds() {
        let _router = router(gateway(ScriptedTransport::new()));
    }
}
