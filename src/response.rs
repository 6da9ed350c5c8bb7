use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Uniform response envelope. Every endpoint, success or failure, answers
/// with `{ "statusCode": .., "message": .., "data": .. }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub message: String,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    pub fn ok(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: Value::Null,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_uses_camel_case_keys() {
        let body = serde_json::to_value(ApiResponse::ok("done", json!({"a": 1}))).unwrap();

        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["message"], "done");
        assert_eq!(body["data"]["a"], 1);
    }

    #[test]
    fn error_envelope_carries_null_data() {
        let body =
            serde_json::to_value(ApiResponse::error(StatusCode::BAD_REQUEST, "bad input")).unwrap();

        assert_eq!(body["statusCode"], 400);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn created_envelope_sets_http_status() {
        let response = ApiResponse::created("made", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
