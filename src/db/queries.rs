use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::db::models::{
    Budget, BudgetWithCategory, Category, CategoryExpenseRow, CategoryTotalRow, DailyTotalRow,
    MonthlyTotalRow, Transaction, TransactionKind, TransactionWithCategory,
};
use crate::reports::window::Window;

/// Postgres unique-constraint violation, surfaced to handlers so duplicate
/// names and budget upsert races map to client errors.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// --- Category Queries ---

pub async fn insert_category(pool: &PgPool, category: &Category) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, user_id, name, kind, color, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(category.id)
    .bind(category.user_id)
    .bind(&category.name)
    .bind(category.kind)
    .bind(&category.color)
    .bind(category.is_active)
    .bind(category.created_at)
    .bind(category.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn get_category(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_active_category(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE id = $1 AND user_id = $2 AND is_active",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_category_by_name(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    kind: TransactionKind,
) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE user_id = $1 AND name = $2 AND kind = $3",
    )
    .bind(user_id)
    .bind(name)
    .bind(kind)
    .fetch_optional(pool)
    .await
}

pub async fn list_active_categories(
    pool: &PgPool,
    user_id: Uuid,
    kind: Option<TransactionKind>,
) -> Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT * FROM categories
        WHERE user_id = $1
          AND is_active
          AND ($2::text IS NULL OR kind = $2)
        ORDER BY name
        "#,
    )
    .bind(user_id)
    .bind(kind.map(|k| k.as_str()))
    .fetch_all(pool)
    .await
}

/// Name and color only; the kind column is immutable after creation.
pub async fn update_category(pool: &PgPool, category: &Category) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $3, color = $4, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(category.id)
    .bind(category.user_id)
    .bind(&category.name)
    .bind(&category.color)
    .fetch_one(pool)
    .await
}

/// Soft delete. Historical transactions keep a resolvable reference.
pub async fn deactivate_category(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE categories SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// --- Transaction Queries ---

pub async fn insert_transaction(pool: &PgPool, tx: &Transaction) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, user_id, category_id, kind, amount, description, occurred_at, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(tx.category_id)
    .bind(tx.kind)
    .bind(&tx.amount)
    .bind(&tx.description)
    .bind(tx.occurred_at)
    .bind(tx.created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_transaction(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const TRANSACTION_WITH_CATEGORY: &str = r#"
    SELECT t.id, t.amount, t.description, t.kind, t.occurred_at, t.created_at,
           c.id AS category_id, c.name AS category_name, c.color AS category_color
    FROM transactions t
    JOIN categories c ON c.id = t.category_id
"#;

pub async fn get_transaction_with_category(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<TransactionWithCategory>> {
    sqlx::query_as::<_, TransactionWithCategory>(&format!(
        "{TRANSACTION_WITH_CATEGORY} WHERE t.id = $1 AND t.user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Optional listing filters; absent fields do not constrain the query.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub min_amount: Option<BigDecimal>,
    pub max_amount: Option<BigDecimal>,
}

const TRANSACTION_FILTER: &str = r#"
    t.user_id = $1
    AND ($2::text IS NULL OR t.kind = $2)
    AND ($3::uuid IS NULL OR t.category_id = $3)
    AND ($4::timestamptz IS NULL OR t.occurred_at >= $4)
    AND ($5::timestamptz IS NULL OR t.occurred_at <= $5)
    AND ($6::numeric IS NULL OR t.amount >= $6)
    AND ($7::numeric IS NULL OR t.amount <= $7)
"#;

pub async fn list_transactions(
    pool: &PgPool,
    user_id: Uuid,
    filter: &TransactionFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<TransactionWithCategory>> {
    sqlx::query_as::<_, TransactionWithCategory>(&format!(
        "{TRANSACTION_WITH_CATEGORY} WHERE {TRANSACTION_FILTER} ORDER BY t.occurred_at DESC LIMIT $8 OFFSET $9"
    ))
    .bind(user_id)
    .bind(filter.kind.map(|k| k.as_str()))
    .bind(filter.category_id)
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.min_amount.as_ref())
    .bind(filter.max_amount.as_ref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_transactions(
    pool: &PgPool,
    user_id: Uuid,
    filter: &TransactionFilter,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM transactions t WHERE {TRANSACTION_FILTER}"
    ))
    .bind(user_id)
    .bind(filter.kind.map(|k| k.as_str()))
    .bind(filter.category_id)
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.min_amount.as_ref())
    .bind(filter.max_amount.as_ref())
    .fetch_one(pool)
    .await
}

pub async fn update_transaction(pool: &PgPool, tx: &Transaction) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE transactions
        SET amount = $3, description = $4, category_id = $5, occurred_at = $6
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(&tx.amount)
    .bind(&tx.description)
    .bind(tx.category_id)
    .bind(tx.occurred_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_transaction(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Most recent transactions across all time, for the dashboard feed.
pub async fn recent_transactions(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<TransactionWithCategory>> {
    sqlx::query_as::<_, TransactionWithCategory>(&format!(
        "{TRANSACTION_WITH_CATEGORY} WHERE t.user_id = $1 ORDER BY t.occurred_at DESC LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

// --- Aggregation Queries ---
//
// Grouping happens in SQL; each query returns typed grouped-result records.
// Window bounds are inclusive and optional (NULL = unbounded), matching the
// summary resolution policy. The month/year helpers below take explicit
// half-open ranges instead.

pub async fn sum_by_kind(
    pool: &PgPool,
    user_id: Uuid,
    window: &Window,
    kind: TransactionKind,
) -> Result<BigDecimal> {
    sqlx::query_scalar::<_, BigDecimal>(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM transactions
        WHERE user_id = $1
          AND kind = $2
          AND ($3::timestamptz IS NULL OR occurred_at >= $3)
          AND ($4::timestamptz IS NULL OR occurred_at <= $4)
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await
}

/// One row per category with at least one matching transaction, sorted by
/// total descending, ties broken by category id.
pub async fn sum_by_category(
    pool: &PgPool,
    user_id: Uuid,
    window: &Window,
    kind: Option<TransactionKind>,
) -> Result<Vec<CategoryTotalRow>> {
    sqlx::query_as::<_, CategoryTotalRow>(
        r#"
        SELECT t.category_id, c.name, c.color, t.kind,
               SUM(t.amount) AS total, COUNT(*) AS count
        FROM transactions t
        JOIN categories c ON c.id = t.category_id
        WHERE t.user_id = $1
          AND ($2::text IS NULL OR t.kind = $2)
          AND ($3::timestamptz IS NULL OR t.occurred_at >= $3)
          AND ($4::timestamptz IS NULL OR t.occurred_at <= $4)
        GROUP BY t.category_id, c.name, c.color, t.kind
        ORDER BY total DESC, t.category_id
        "#,
    )
    .bind(user_id)
    .bind(kind.map(|k| k.as_str()))
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await
}

/// Sparse daily buckets: only (date, kind) pairs with activity appear.
pub async fn sum_by_day(
    pool: &PgPool,
    user_id: Uuid,
    window: &Window,
) -> Result<Vec<DailyTotalRow>> {
    sqlx::query_as::<_, DailyTotalRow>(
        r#"
        SELECT to_char(occurred_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
               kind, SUM(amount) AS total
        FROM transactions
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR occurred_at >= $2)
          AND ($3::timestamptz IS NULL OR occurred_at <= $3)
        GROUP BY 1, 2
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await
}

/// Month-of-year buckets within `[from, until)`; months without activity are
/// absent here and zero-filled by the report layer.
pub async fn sum_by_month(
    pool: &PgPool,
    user_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<MonthlyTotalRow>> {
    sqlx::query_as::<_, MonthlyTotalRow>(
        r#"
        SELECT EXTRACT(MONTH FROM occurred_at AT TIME ZONE 'UTC')::int AS month,
               kind, SUM(amount) AS total
        FROM transactions
        WHERE user_id = $1 AND occurred_at >= $2 AND occurred_at < $3
        GROUP BY 1, 2
        ORDER BY 1
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await
}

/// Expense totals per category within `[from, until)`, the actual-spend side
/// of budget reconciliation.
pub async fn expense_totals_by_category(
    pool: &PgPool,
    user_id: Uuid,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<CategoryExpenseRow>> {
    sqlx::query_as::<_, CategoryExpenseRow>(
        r#"
        SELECT category_id, SUM(amount) AS total
        FROM transactions
        WHERE user_id = $1
          AND kind = 'expense'
          AND occurred_at >= $2
          AND occurred_at < $3
        GROUP BY category_id
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(pool)
    .await
}

// --- Budget Queries ---

/// Set-budget is an upsert against the (user, category, month, year)
/// uniqueness constraint, never a find-then-write.
pub async fn upsert_budget(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
    month: u32,
    year: i32,
    amount: &BigDecimal,
) -> Result<Budget> {
    sqlx::query_as::<_, Budget>(
        r#"
        INSERT INTO budgets (id, user_id, category_id, month, year, amount, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
        ON CONFLICT ON CONSTRAINT budgets_user_category_month_key
        DO UPDATE SET amount = EXCLUDED.amount, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(category_id)
    .bind(month as i32)
    .bind(year)
    .bind(amount)
    .fetch_one(pool)
    .await
}

pub async fn list_budgets_with_category(
    pool: &PgPool,
    user_id: Uuid,
    month: u32,
    year: i32,
) -> Result<Vec<BudgetWithCategory>> {
    sqlx::query_as::<_, BudgetWithCategory>(
        r#"
        SELECT b.id, b.month, b.year, b.amount,
               c.id AS category_id, c.name AS category_name, c.color AS category_color
        FROM budgets b
        JOIN categories c ON c.id = b.category_id
        WHERE b.user_id = $1 AND b.month = $2 AND b.year = $3
        ORDER BY c.name
        "#,
    )
    .bind(user_id)
    .bind(month as i32)
    .bind(year)
    .fetch_all(pool)
    .await
}

pub async fn delete_budget(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
