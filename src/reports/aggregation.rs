use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{CategoryTotalRow, DailyTotalRow, MonthlyTotalRow, TransactionKind};
use crate::money;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySlice {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "money::as_json_number")]
    pub total: BigDecimal,
    pub count: i64,
}

impl From<CategoryTotalRow> for CategorySlice {
    fn from(row: CategoryTotalRow) -> Self {
        Self {
            category_id: row.category_id,
            name: row.name,
            color: row.color,
            kind: row.kind,
            total: row.total,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryBreakdown {
    pub income: Vec<CategorySlice>,
    pub expense: Vec<CategorySlice>,
}

/// Splits the sorted per-category rows into income and expense arrays,
/// preserving the total-descending order within each.
pub fn split_breakdown(rows: Vec<CategoryTotalRow>) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();

    for row in rows {
        match row.kind {
            TransactionKind::Income => breakdown.income.push(row.into()),
            TransactionKind::Expense => breakdown.expense.push(row.into()),
        }
    }

    breakdown
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(with = "money::as_json_number")]
    pub income: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub expense: BigDecimal,
}

impl TrendPoint {
    fn new(date: String) -> Self {
        Self {
            date,
            income: BigDecimal::from(0),
            expense: BigDecimal::from(0),
        }
    }
}

/// Folds daily buckets into a date-keyed series. Dates with no activity at
/// all stay absent; a present date reports 0 for the kind with no rows.
pub fn daily_trends(rows: Vec<DailyTotalRow>) -> BTreeMap<String, TrendPoint> {
    let mut trends: BTreeMap<String, TrendPoint> = BTreeMap::new();

    for row in rows {
        let point = trends
            .entry(row.day.clone())
            .or_insert_with(|| TrendPoint::new(row.day.clone()));

        match row.kind {
            TransactionKind::Income => point.income = row.total,
            TransactionKind::Expense => point.expense = row.total,
        }
    }

    trends
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthOverview {
    pub month: u32,
    pub month_name: &'static str,
    #[serde(with = "money::as_json_number")]
    pub income: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub expense: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub balance: BigDecimal,
}

/// Exactly 12 entries, months 1-12 in order, zero-filled where the year has
/// no activity.
pub fn monthly_overview(rows: Vec<MonthlyTotalRow>) -> Vec<MonthOverview> {
    let mut incomes: [Option<BigDecimal>; 12] = Default::default();
    let mut expenses: [Option<BigDecimal>; 12] = Default::default();

    for row in rows {
        if !(1..=12).contains(&row.month) {
            continue;
        }
        let slot = (row.month - 1) as usize;
        match row.kind {
            TransactionKind::Income => incomes[slot] = Some(row.total),
            TransactionKind::Expense => expenses[slot] = Some(row.total),
        }
    }

    (0..12)
        .map(|slot| {
            let income = incomes[slot].take().unwrap_or_else(|| BigDecimal::from(0));
            let expense = expenses[slot].take().unwrap_or_else(|| BigDecimal::from(0));
            let balance = &income - &expense;

            MonthOverview {
                month: slot as u32 + 1,
                month_name: MONTH_NAMES[slot],
                income,
                expense,
                balance,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewTotals {
    #[serde(with = "money::as_json_number")]
    pub income: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub expense: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub balance: BigDecimal,
}

pub fn overview_totals(overview: &[MonthOverview]) -> OverviewTotals {
    let mut totals = OverviewTotals {
        income: BigDecimal::from(0),
        expense: BigDecimal::from(0),
        balance: BigDecimal::from(0),
    };

    for month in overview {
        totals.income = &totals.income + &month.income;
        totals.expense = &totals.expense + &month.expense;
        totals.balance = &totals.balance + &month.balance;
    }

    totals
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysisEntry {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(with = "money::as_json_number")]
    pub total: BigDecimal,
    pub count: i64,
    pub percentage: f64,
}

/// Attaches percentage-of-total to each category row. When the grand total
/// is zero every percentage is zero.
pub fn with_percentages(rows: Vec<CategoryTotalRow>) -> (BigDecimal, Vec<CategoryAnalysisEntry>) {
    let total_amount: BigDecimal = rows.iter().map(|row| &row.total).sum();
    let denominator = money::to_f64(&total_amount);

    let entries = rows
        .into_iter()
        .map(|row| {
            let percentage = if denominator > 0.0 {
                money::round2(money::to_f64(&row.total) / denominator * 100.0)
            } else {
                0.0
            };

            CategoryAnalysisEntry {
                category_id: row.category_id,
                name: row.name,
                color: row.color,
                total: row.total,
                count: row.count,
                percentage,
            }
        })
        .collect();

    (total_amount, entries)
}
