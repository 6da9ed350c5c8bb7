use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{BudgetWithCategory, CategoryExpenseRow};
use crate::money;

/// Per-category variance between a monthly budget and realized spend.
/// `remaining` goes negative on overrun; the sign is the signal, no extra
/// flag is raised.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetComparison {
    pub category_id: Uuid,
    pub category_name: String,
    pub color: String,
    #[serde(with = "money::as_json_number")]
    pub budgeted: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub actual: BigDecimal,
    #[serde(with = "money::as_json_number")]
    pub remaining: BigDecimal,
    pub percent_used: f64,
}

pub fn actuals_by_category(rows: Vec<CategoryExpenseRow>) -> HashMap<Uuid, BigDecimal> {
    rows.into_iter()
        .map(|row| (row.category_id, row.total))
        .collect()
}

/// Joins budget rows against actual expense totals. Categories with no
/// spend reconcile against an actual of 0.
pub fn reconcile(
    budgets: Vec<BudgetWithCategory>,
    actuals: &HashMap<Uuid, BigDecimal>,
) -> Vec<BudgetComparison> {
    budgets
        .into_iter()
        .map(|budget| {
            let actual = actuals
                .get(&budget.category_id)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
            let remaining = &budget.amount - &actual;
            let percent_used = percent_used(&actual, &budget.amount);

            BudgetComparison {
                category_id: budget.category_id,
                category_name: budget.category_name,
                color: budget.category_color,
                budgeted: budget.amount,
                actual,
                remaining,
                percent_used,
            }
        })
        .collect()
}

/// A zero budget reports 0% used rather than a non-finite ratio; spend
/// against a zero budget still shows up as negative `remaining`.
pub fn percent_used(actual: &BigDecimal, budgeted: &BigDecimal) -> f64 {
    let budgeted = money::to_f64(budgeted);
    if budgeted <= 0.0 {
        return 0.0;
    }

    money::round2(money::to_f64(actual) / budgeted * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn budget_row(category_id: Uuid, name: &str, amount: &str) -> BudgetWithCategory {
        BudgetWithCategory {
            id: Uuid::new_v4(),
            month: 6,
            year: 2025,
            amount: BigDecimal::from_str(amount).unwrap(),
            category_id,
            category_name: name.to_string(),
            category_color: "#cc3344".to_string(),
        }
    }

    #[test]
    fn reconciles_budget_against_actual() {
        let category_id = Uuid::new_v4();
        let budgets = vec![budget_row(category_id, "Groceries", "200")];
        let actuals = HashMap::from([(category_id, BigDecimal::from(50))]);

        let comparison = reconcile(budgets, &actuals);

        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison[0].budgeted, BigDecimal::from(200));
        assert_eq!(comparison[0].actual, BigDecimal::from(50));
        assert_eq!(comparison[0].remaining, BigDecimal::from(150));
        assert_eq!(comparison[0].percent_used, 25.0);
    }

    #[test]
    fn missing_actual_counts_as_zero() {
        let budgets = vec![budget_row(Uuid::new_v4(), "Transport", "80")];

        let comparison = reconcile(budgets, &HashMap::new());

        assert_eq!(comparison[0].actual, BigDecimal::from(0));
        assert_eq!(comparison[0].remaining, BigDecimal::from(80));
        assert_eq!(comparison[0].percent_used, 0.0);
    }

    #[test]
    fn overrun_goes_negative_without_fanfare() {
        let category_id = Uuid::new_v4();
        let budgets = vec![budget_row(category_id, "Dining", "100")];
        let actuals = HashMap::from([(category_id, BigDecimal::from(130))]);

        let comparison = reconcile(budgets, &actuals);

        assert_eq!(comparison[0].remaining, BigDecimal::from(-30));
        assert_eq!(comparison[0].percent_used, 130.0);
    }

    #[test]
    fn zero_budget_reports_zero_percent_used() {
        let category_id = Uuid::new_v4();
        let budgets = vec![budget_row(category_id, "Misc", "0")];
        let actuals = HashMap::from([(category_id, BigDecimal::from(0))]);

        let comparison = reconcile(budgets, &actuals);

        assert_eq!(comparison[0].percent_used, 0.0);
        assert!(comparison[0].percent_used.is_finite());
    }

    #[test]
    fn spend_against_zero_budget_still_signals_overrun() {
        let category_id = Uuid::new_v4();
        let budgets = vec![budget_row(category_id, "Misc", "0")];
        let actuals = HashMap::from([(category_id, BigDecimal::from(25))]);

        let comparison = reconcile(budgets, &actuals);

        assert_eq!(comparison[0].percent_used, 0.0);
        assert_eq!(comparison[0].remaining, BigDecimal::from(-25));
    }

    #[test]
    fn percent_used_rounds_to_two_places() {
        assert_eq!(
            percent_used(&BigDecimal::from(1), &BigDecimal::from(3)),
            33.33
        );
    }

    #[test]
    fn actuals_map_keys_by_category() {
        let category_id = Uuid::new_v4();
        let rows = vec![CategoryExpenseRow {
            category_id,
            total: BigDecimal::from(42),
        }];

        let map = actuals_by_category(rows);
        assert_eq!(map[&category_id], BigDecimal::from(42));
    }
}
