use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Income/expense discriminator shared by categories and transactions.
/// Stored as TEXT; encode/decode delegate to `&str` so the column stays a
/// plain string in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<sqlx::Postgres> for TransactionKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TransactionKind {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Self::parse(raw).ok_or_else(|| format!("unknown transaction kind: {raw}").into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for TransactionKind {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(user_id: Uuid, name: String, kind: TransactionKind, color: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            color,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    pub amount: BigDecimal,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: Uuid,
        category_id: Uuid,
        kind: TransactionKind,
        amount: BigDecimal,
        description: String,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            kind,
            amount,
            description,
            occurred_at,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction joined with its category, for listings and the recent feed.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionWithCategory {
    pub id: Uuid,
    pub amount: BigDecimal,
    pub description: String,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_color: String,
}

/// Budget joined with its category, the reconciliation input.
#[derive(Debug, Clone, FromRow)]
pub struct BudgetWithCategory {
    pub id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: BigDecimal,
    pub category_id: Uuid,
    pub category_name: String,
    pub category_color: String,
}

// Typed grouped-result records returned by the aggregation queries.

/// One category's share of a grouped sum.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotalRow {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub kind: TransactionKind,
    pub total: BigDecimal,
    pub count: i64,
}

/// One (calendar date, kind) bucket. `day` is `YYYY-MM-DD` in UTC.
#[derive(Debug, Clone, FromRow)]
pub struct DailyTotalRow {
    pub day: String,
    pub kind: TransactionKind,
    pub total: BigDecimal,
}

/// One (month-of-year, kind) bucket within a single year.
#[derive(Debug, Clone, FromRow)]
pub struct MonthlyTotalRow {
    pub month: i32,
    pub kind: TransactionKind,
    pub total: BigDecimal,
}

/// Expense total for one category, keyed for reconciliation lookups.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryExpenseRow {
    pub category_id: Uuid,
    pub total: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_text() {
        assert_eq!(TransactionKind::parse("income"), Some(TransactionKind::Income));
        assert_eq!(TransactionKind::parse("expense"), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::parse("transfer"), None);
        assert_eq!(TransactionKind::Income.as_str(), "income");
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            r#""expense""#
        );
        assert_eq!(
            serde_json::from_str::<TransactionKind>(r#""income""#).unwrap(),
            TransactionKind::Income
        );
    }

    #[test]
    fn new_transaction_keeps_its_fields() {
        let user_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let tx = Transaction::new(
            user_id,
            category_id,
            TransactionKind::Expense,
            BigDecimal::from_str("42.10").unwrap(),
            "coffee beans".to_string(),
            Utc::now(),
        );

        assert_eq!(tx.user_id, user_id);
        assert_eq!(tx.category_id, category_id);
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, BigDecimal::from_str("42.10").unwrap());
    }

    #[test]
    fn new_category_starts_active() {
        let category = Category::new(
            Uuid::new_v4(),
            "Groceries".to_string(),
            TransactionKind::Expense,
            "#00ff00".to_string(),
        );

        assert!(category.is_active);
    }
}
