use axum::{
    extract::{Path, Query, State},
    Extension,
};
use bigdecimal::BigDecimal;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::TransactionKind;
use crate::db::queries;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::handlers::CategoryRef;
use crate::middleware::auth::AuthUser;
use crate::money;
use crate::reports::{budget, window};
use crate::response::ApiResponse;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBudgetPayload {
    pub month: i64,
    pub year: i64,
    pub category_id: Uuid,
    #[serde(with = "money::as_json_number")]
    pub amount: BigDecimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetDto {
    id: Uuid,
    month: i32,
    year: i32,
    #[serde(with = "money::as_json_number")]
    amount: BigDecimal,
    category: CategoryRef,
}

/// Set-budget upserts against the store's (user, category, month, year)
/// uniqueness constraint; concurrent setters both land on the same row.
pub async fn set_budget(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    AppJson(payload): AppJson<SetBudgetPayload>,
) -> Result<ApiResponse, AppError> {
    let month = validation::validate_month("month", payload.month)?;
    let year = validation::validate_year("year", payload.year)?;
    validation::validate_non_negative("amount", &payload.amount)?;

    let category = queries::get_active_category(&state.db, user_id, payload.category_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if category.kind != TransactionKind::Expense {
        return Err(AppError::Validation(
            "Budget can only be set for expense categories".to_string(),
        ));
    }

    let saved =
        queries::upsert_budget(&state.db, user_id, category.id, month, year, &payload.amount)
            .await?;

    let dto = BudgetDto {
        id: saved.id,
        month: saved.month,
        year: saved.year,
        amount: saved.amount,
        category: CategoryRef {
            id: category.id,
            name: category.name,
            color: category.color,
        },
    };

    Ok(ApiResponse::ok(
        "Budget set successfully",
        serde_json::json!({ "budget": dto }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListBudgetsParams {
    pub month: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetStatusDto {
    id: Uuid,
    month: i32,
    year: i32,
    #[serde(with = "money::as_json_number")]
    amount: BigDecimal,
    #[serde(with = "money::as_json_number")]
    spent: BigDecimal,
    #[serde(with = "money::as_json_number")]
    remaining: BigDecimal,
    category: CategoryRef,
}

pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<ListBudgetsParams>,
) -> Result<ApiResponse, AppError> {
    let now = state.clock.now();
    let month = match params.month.as_deref() {
        Some(raw) => validation::parse_month("month", raw)?,
        None => now.month(),
    };
    let year = match params.year.as_deref() {
        Some(raw) => validation::parse_year("year", raw)?,
        None => now.year(),
    };

    let budgets = queries::list_budgets_with_category(&state.db, user_id, month, year).await?;

    let (from, until) = window::month_range(year, month);
    let actuals = budget::actuals_by_category(
        queries::expense_totals_by_category(&state.db, user_id, from, until).await?,
    );

    let statuses: Vec<BudgetStatusDto> = budgets
        .into_iter()
        .map(|row| {
            let spent = actuals
                .get(&row.category_id)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
            let remaining = &row.amount - &spent;

            BudgetStatusDto {
                id: row.id,
                month: row.month,
                year: row.year,
                amount: row.amount,
                spent,
                remaining,
                category: CategoryRef {
                    id: row.category_id,
                    name: row.category_name,
                    color: row.category_color,
                },
            }
        })
        .collect();

    Ok(ApiResponse::ok(
        "Budgets retrieved successfully",
        serde_json::json!({ "budgets": statuses, "month": month, "year": year }),
    ))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = super::parse_uuid("id", &id)?;
    let deleted = queries::delete_budget(&state.db, user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound("Budget not found".to_string()));
    }

    Ok(ApiResponse::ok(
        "Budget deleted successfully",
        serde_json::Value::Null,
    ))
}
