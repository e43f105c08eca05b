use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_core::GatewayError;
use gateway_types::ErrorResponse;

/// Gateway failure rendered as `{ok:false, error}` with the mapped status
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        if code.is_server_error() {
            log::error!("Request failed with {}: {}", code, self.0);
        } else {
            log::warn!("Request failed with {}: {}", code, self.0);
        }
        (code, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_gateway_error() {
        assert_eq!(
            ApiError(GatewayError::InvalidPhone).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(GatewayError::AuthTokenMissing).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(GatewayError::Rejected("bad".to_string())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(GatewayError::Config("MK_API_KEY not set".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_carries_status() {
        let response = ApiError(GatewayError::NotFound("gone".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
