//! Startup failures and the `{error:{type,message,details,hint}}` wire envelope.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use llm::GatewayError;
use serde::Serialize;

/// Errors that can abort server startup before the HTTP listener is serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind to address: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

/// Render a [`GatewayError`] as the Dialect A error envelope, at the status it maps to.
pub fn error_response(err: &GatewayError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        error: ErrorDetail {
            kind: err.wire_kind().to_string(),
            message: err.to_string(),
            details: err.details().map(str::to_string),
            hint: None,
        },
    };
    (status, Json(body)).into_response()
}

/// Render an arbitrary `(status, kind, message)` triple as the same envelope, for
/// failures raised directly in the admin surface rather than through [`GatewayError`].
pub fn error_response_raw(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: ErrorDetail { kind: kind.to_string(), message: message.into(), details: None, hint: None },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_maps_to_400_with_wire_kind() {
        let response = error_response(&GatewayError::Validation("bad input".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["type"], "validation_error");
        assert_eq!(json["error"]["message"], "bad input");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let response = error_response(&GatewayError::Unauthorized);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn timeout_maps_to_504() {
        let response = error_response(&GatewayError::Timeout);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
