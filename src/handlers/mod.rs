pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod transactions;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{TransactionKind, TransactionWithCategory};
use crate::error::AppError;
use crate::money;
use crate::response::ApiResponse;
use crate::AppState;

/// Category reference embedded in transaction and budget payloads.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    #[serde(with = "money::as_json_number")]
    pub amount: BigDecimal,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub category: CategoryRef,
}

impl From<TransactionWithCategory> for TransactionDto {
    fn from(row: TransactionWithCategory) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            description: row.description,
            kind: row.kind,
            date: row.occurred_at,
            created_at: row.created_at,
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name,
                color: row.category_color,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub db: &'static str,
    pub db_pool: DbPoolStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbPoolStats {
    pub active_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    pub usage_percent: f32,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let pool = &state.db;
    let active_connections = pool.size();
    let idle_connections = pool.num_idle() as u32;
    let max_connections = pool.options().get_max_connections();
    let usage_percent = (active_connections as f32 / max_connections as f32) * 100.0;

    let health_response = HealthStatus {
        status: if db_status == "connected" {
            "healthy"
        } else {
            "unhealthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        db: db_status,
        db_pool: DbPoolStats {
            active_connections,
            idle_connections,
            max_connections,
            usage_percent,
        },
    };

    let status_code = if db_status == "connected" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    ApiResponse::new(status_code, "Health check", health_response)
}

/// Fallback so unknown routes answer with the envelope too.
pub async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

/// Path and query ids arrive as strings so a malformed id yields the
/// envelope instead of the framework's plain-text rejection.
pub fn parse_uuid(field: &'static str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{field}: must be a valid id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uuid_accepts_canonical_form() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("id", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_uuid_rejects_garbage() {
        let err = parse_uuid("id", "not-an-id").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
