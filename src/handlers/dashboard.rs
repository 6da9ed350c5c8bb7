use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::TransactionKind;
use crate::db::queries;
use crate::error::AppError;
use crate::handlers::TransactionDto;
use crate::middleware::auth::AuthUser;
use crate::money;
use crate::reports::aggregation::{
    self, CategoryAnalysisEntry, CategoryBreakdown, MonthOverview, OverviewTotals, TrendPoint,
};
use crate::reports::budget::{self, BudgetComparison};
use crate::reports::window::{self, ResolvedPeriod, PERIOD_CUSTOM, PERIOD_MONTH};
use crate::response::ApiResponse;
use crate::validation;
use crate::AppState;

const RECENT_TRANSACTIONS: i64 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Totals {
    #[serde(with = "money::as_json_number")]
    income: BigDecimal,
    #[serde(with = "money::as_json_number")]
    expense: BigDecimal,
    #[serde(with = "money::as_json_number")]
    balance: BigDecimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodEcho {
    name: &'static str,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl From<&ResolvedPeriod> for PeriodEcho {
    fn from(resolved: &ResolvedPeriod) -> Self {
        Self {
            name: resolved.name,
            start_date: resolved.window.start,
            end_date: resolved.window.end,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryData {
    summary: Totals,
    period: PeriodEcho,
    category_breakdown: CategoryBreakdown,
    trends: BTreeMap<String, TrendPoint>,
    budget_comparison: Vec<BudgetComparison>,
    recent_transactions: Vec<TransactionDto>,
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<SummaryParams>,
) -> Result<ApiResponse, AppError> {
    // An explicit range needs both ends; a lone bound falls back to the
    // period token.
    let explicit = match (params.start_date.as_deref(), params.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((
            validation::parse_date("startDate", start)?,
            validation::parse_date("endDate", end)?,
        )),
        _ => None,
    };

    let resolved = window::resolve(params.period.as_deref(), explicit, state.clock.now());

    let income =
        queries::sum_by_kind(&state.db, user_id, &resolved.window, TransactionKind::Income).await?;
    let expense =
        queries::sum_by_kind(&state.db, user_id, &resolved.window, TransactionKind::Expense)
            .await?;
    let balance = &income - &expense;

    let category_breakdown = aggregation::split_breakdown(
        queries::sum_by_category(&state.db, user_id, &resolved.window, None).await?,
    );
    let trends =
        aggregation::daily_trends(queries::sum_by_day(&state.db, user_id, &resolved.window).await?);

    let budget_comparison = reconcile_month_budgets(&state, user_id, &resolved).await?;

    let recent_transactions: Vec<TransactionDto> =
        queries::recent_transactions(&state.db, user_id, RECENT_TRANSACTIONS)
            .await?
            .into_iter()
            .map(TransactionDto::from)
            .collect();

    let data = SummaryData {
        summary: Totals {
            income,
            expense,
            balance,
        },
        period: PeriodEcho::from(&resolved),
        category_breakdown,
        trends,
        budget_comparison,
        recent_transactions,
    };

    Ok(ApiResponse::ok(
        "Financial summary retrieved successfully",
        data,
    ))
}

/// Budgets are monthly, so reconciliation only applies when the window is
/// the current month or an explicit range; the range's start picks the
/// budget month.
async fn reconcile_month_budgets(
    state: &AppState,
    user_id: uuid::Uuid,
    resolved: &ResolvedPeriod,
) -> Result<Vec<BudgetComparison>, AppError> {
    let start = match (resolved.name, resolved.window.start) {
        (PERIOD_MONTH, Some(start)) | (PERIOD_CUSTOM, Some(start)) => start,
        _ => return Ok(Vec::new()),
    };

    let (month, year) = (start.month(), start.year());
    let budgets = queries::list_budgets_with_category(&state.db, user_id, month, year).await?;
    if budgets.is_empty() {
        return Ok(Vec::new());
    }

    let (from, until) = window::month_range(year, month);
    let actuals = budget::actuals_by_category(
        queries::expense_totals_by_category(&state.db, user_id, from, until).await?,
    );

    Ok(budget::reconcile(budgets, &actuals))
}

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
struct OverviewData {
    year: i32,
    overview: Vec<MonthOverview>,
    totals: OverviewTotals,
}

pub async fn monthly_overview(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<OverviewParams>,
) -> Result<ApiResponse, AppError> {
    let year = match params.year.as_deref() {
        Some(raw) => validation::parse_year("year", raw)?,
        None => state.clock.now().year(),
    };

    let (from, until) = window::year_range(year);
    let rows = queries::sum_by_month(&state.db, user_id, from, until).await?;

    let overview = aggregation::monthly_overview(rows);
    let totals = aggregation::overview_totals(&overview);

    Ok(ApiResponse::ok(
        "Monthly overview retrieved successfully",
        OverviewData {
            year,
            overview,
            totals,
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    pub period: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisData {
    period: &'static str,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(with = "money::as_json_number")]
    total_amount: BigDecimal,
    categories: Vec<CategoryAnalysisEntry>,
}

pub async fn category_analysis(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<AnalysisParams>,
) -> Result<ApiResponse, AppError> {
    // Absent or unrecognized type tokens analyze expenses.
    let kind = params
        .kind
        .as_deref()
        .and_then(TransactionKind::parse)
        .unwrap_or(TransactionKind::Expense);

    let resolved = window::resolve_analysis(params.period.as_deref(), state.clock.now());

    let rows = queries::sum_by_category(&state.db, user_id, &resolved.window, Some(kind)).await?;
    let (total_amount, categories) = aggregation::with_percentages(rows);

    Ok(ApiResponse::ok(
        "Category analysis retrieved successfully",
        AnalysisData {
            period: resolved.name,
            kind,
            total_amount,
            categories,
        },
    ))
}
