use axum::{
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::config::Config;
use crate::utils::sanitize::sanitize_json;

const MAX_BODY_LOG_SIZE: usize = 1024;

pub async fn request_logger(State(config): State<Config>, req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let req = if config.log_request_body && body_fits(&req) {
        log_request_with_body(&request_id, req).await
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            "incoming request"
        );
        req
    };

    let mut response = next.run(req).await;

    let latency = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "outgoing response"
    );

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

fn body_fits(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .map(|len| len <= MAX_BODY_LOG_SIZE)
        .unwrap_or(false)
}

async fn log_request_with_body(request_id: &str, req: Request) -> Request {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let (parts, body) = req.into_parts();

    match axum::body::to_bytes(body, MAX_BODY_LOG_SIZE).await {
        Ok(bytes) => {
            let rendered = match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(json) => serde_json::to_string(&sanitize_json(&json))
                    .unwrap_or_else(|_| "[invalid json]".to_string()),
                Err(_) => format!("[non-json, {} bytes]", bytes.len()),
            };

            tracing::info!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                body = %rendered,
                "incoming request"
            );

            Request::from_parts(parts, axum::body::Body::from(bytes))
        }
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "failed to read request body for logging"
            );

            Request::from_parts(parts, axum::body::Body::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use axum::middleware::from_fn_with_state;
    use axum::{body::Body, routing::post, Router};
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            server_port: 0,
            database_url: String::new(),
            auth_token_secret: "secret".to_string(),
            cors_allowed_origins: None,
            log_request_body: false,
        }
    }

    #[tokio::test]
    async fn test_request_logger_adds_request_id() {
        let app = Router::new()
            .route("/test", post(|| async { "ok" }))
            .layer(from_fn_with_state(test_config(), request_logger));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }
}
