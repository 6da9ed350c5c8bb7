use axum::{
    extract::{Path, Query, State},
    Extension,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::db::models::{Transaction, TransactionKind};
use crate::db::queries::{self, TransactionFilter};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::handlers::TransactionDto;
use crate::middleware::auth::AuthUser;
use crate::money;
use crate::response::ApiResponse;
use crate::validation;
use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    #[serde(with = "money::as_json_number")]
    pub amount: BigDecimal,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: Uuid,
    pub date: Option<String>,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateTransactionPayload>,
) -> Result<ApiResponse, AppError> {
    validation::validate_non_negative("amount", &payload.amount)?;

    let kind = TransactionKind::parse(&payload.kind)
        .ok_or_else(|| AppError::Validation("type: must be one of: income, expense".to_string()))?;

    let description = payload.description.unwrap_or_default();
    validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)?;

    let occurred_at = match payload.date.as_deref() {
        Some(raw) => validation::parse_date("date", raw)?,
        None => state.clock.now(),
    };

    let category = queries::get_active_category(&state.db, user_id, payload.category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if category.kind != kind {
        return Err(AppError::Validation(format!(
            "Category type must be {kind}"
        )));
    }

    let tx = Transaction::new(
        user_id,
        category.id,
        kind,
        payload.amount,
        description,
        occurred_at,
    );
    let created = queries::insert_transaction(&state.db, &tx).await?;

    let dto = queries::get_transaction_with_category(&state.db, user_id, created.id)
        .await?
        .map(TransactionDto::from)
        .ok_or_else(|| AppError::Internal("created transaction vanished".to_string()))?;

    Ok(ApiResponse::created(
        "Transaction created successfully",
        serde_json::json!({ "transaction": dto }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
}

fn parse_positive_int(field: &'static str, value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| AppError::Validation(format!("{field}: must be a positive integer")))
}

fn parse_amount(field: &'static str, value: &str) -> Result<BigDecimal, AppError> {
    let amount = BigDecimal::from_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{field}: must be a decimal number")))?;
    validation::validate_non_negative(field, &amount)?;

    Ok(amount)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationMeta {
    total: i64,
    page: i64,
    limit: i64,
    total_pages: i64,
    has_next_page: bool,
    has_prev_page: bool,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<ListTransactionsParams>,
) -> Result<ApiResponse, AppError> {
    let page = match params.page.as_deref() {
        Some(raw) => parse_positive_int("page", raw)?,
        None => 1,
    };
    let limit = match params.limit.as_deref() {
        Some(raw) => parse_positive_int("limit", raw)?.min(MAX_PAGE_SIZE),
        None => DEFAULT_PAGE_SIZE,
    };

    let filter = TransactionFilter {
        // Unrecognized kind tokens do not constrain the listing.
        kind: params.kind.as_deref().and_then(TransactionKind::parse),
        category_id: params
            .category
            .as_deref()
            .map(|raw| super::parse_uuid("category", raw))
            .transpose()?,
        start: params
            .start_date
            .as_deref()
            .map(|raw| validation::parse_date("startDate", raw))
            .transpose()?,
        end: params
            .end_date
            .as_deref()
            .map(|raw| validation::parse_date("endDate", raw))
            .transpose()?,
        min_amount: params
            .min_amount
            .as_deref()
            .map(|raw| parse_amount("minAmount", raw))
            .transpose()?,
        max_amount: params
            .max_amount
            .as_deref()
            .map(|raw| parse_amount("maxAmount", raw))
            .transpose()?,
    };

    let total = queries::count_transactions(&state.db, user_id, &filter).await?;
    let rows =
        queries::list_transactions(&state.db, user_id, &filter, limit, (page - 1) * limit).await?;
    let transactions: Vec<TransactionDto> = rows.into_iter().map(TransactionDto::from).collect();

    let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
    let pagination = PaginationMeta {
        total,
        page,
        limit,
        total_pages,
        has_next_page: page < total_pages,
        has_prev_page: page > 1 && total_pages > 0,
    };

    Ok(ApiResponse::ok(
        "Transactions retrieved successfully",
        serde_json::json!({ "transactions": transactions, "pagination": pagination }),
    ))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let dto = queries::get_transaction_with_category(&state.db, user_id, id)
        .await?
        .map(TransactionDto::from)
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    Ok(ApiResponse::ok(
        "Transaction retrieved successfully",
        serde_json::json!({ "transaction": dto }),
    ))
}

/// The transaction's kind is fixed; a category change must stay within it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionPayload {
    #[serde(default, with = "option_money")]
    pub amount: Option<BigDecimal>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub date: Option<String>,
}

// Serde adapter for an optional money field.
mod option_money {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "crate::money::as_json_number")] BigDecimal);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTransactionPayload>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let mut tx = queries::get_transaction(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    if let Some(category_id) = payload.category_id {
        if category_id != tx.category_id {
            let category = queries::get_active_category(&state.db, user_id, category_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

            if category.kind != tx.kind {
                return Err(AppError::Validation(format!(
                    "Category type must be {}",
                    tx.kind
                )));
            }

            tx.category_id = category.id;
        }
    }

    if let Some(amount) = payload.amount {
        validation::validate_non_negative("amount", &amount)?;
        tx.amount = amount;
    }

    if let Some(description) = payload.description {
        validation::validate_max_len(
            "description",
            &description,
            validation::DESCRIPTION_MAX_LEN,
        )?;
        tx.description = description;
    }

    if let Some(raw) = payload.date.as_deref() {
        tx.occurred_at = validation::parse_date("date", raw)?;
    }

    queries::update_transaction(&state.db, &tx).await?;

    let dto = queries::get_transaction_with_category(&state.db, user_id, tx.id)
        .await?
        .map(TransactionDto::from)
        .ok_or_else(|| AppError::Internal("updated transaction vanished".to_string()))?;

    Ok(ApiResponse::ok(
        "Transaction updated successfully",
        serde_json::json!({ "transaction": dto }),
    ))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let deleted = queries::delete_transaction(&state.db, user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Transaction not found".to_string()));
    }

    Ok(ApiResponse::ok(
        "Transaction deleted successfully",
        serde_json::Value::Null,
    ))
}
