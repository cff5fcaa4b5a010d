use sqlx::PgPool;
use uuid::Uuid;

use crate::budget::{BudgetKey, PlannedBudget};
use crate::models::{BudgetCategory, BudgetItem};

pub async fn list_categories<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<BudgetCategory>, sqlx::Error> {
    sqlx::query_as::<_, BudgetCategory>("SELECT * FROM budget_categories ORDER BY sort_order, id")
        .fetch_all(executor)
        .await
}

pub async fn list_keys(pool: &PgPool, project_id: Uuid) -> Result<Vec<BudgetKey>, sqlx::Error> {
    sqlx::query_as::<_, BudgetKey>(
        "SELECT b.project_year, b.organization_id, o.name AS organization_name
         FROM project_budgets b
         JOIN organizations o ON o.id = b.organization_id
         WHERE b.project_id = $1
         ORDER BY b.project_year, o.name",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn list_items(pool: &PgPool, project_id: Uuid) -> Result<Vec<BudgetItem>, sqlx::Error> {
    sqlx::query_as::<_, BudgetItem>(
        "SELECT b.project_year, b.organization_id, o.name AS organization_name,
                c.code AS category_code, i.fund_type, i.amount
         FROM budget_items i
         JOIN project_budgets b ON b.id = i.budget_id
         JOIN organizations o ON o.id = b.organization_id
         JOIN budget_categories c ON c.id = i.category_id
         WHERE b.project_id = $1
         ORDER BY b.project_year, o.name, c.sort_order, i.fund_type",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Inserts or refreshes the totals of the (project, year, organization) row.
pub async fn upsert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    budget: &PlannedBudget,
) -> Result<Uuid, sqlx::Error> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO project_budgets
            (project_id, project_year, organization_id, cash_amount, inkind_amount, total_amount)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (project_id, project_year, organization_id) DO UPDATE
         SET cash_amount = EXCLUDED.cash_amount,
             inkind_amount = EXCLUDED.inkind_amount,
             total_amount = EXCLUDED.total_amount,
             updated_at = now()
         RETURNING id",
    )
    .bind(project_id)
    .bind(budget.project_year)
    .bind(budget.organization_id)
    .bind(budget.cash_amount)
    .bind(budget.inkind_amount)
    .bind(budget.total_amount)
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}

pub async fn delete_items<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    budget_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM budget_items WHERE budget_id = $1")
        .bind(budget_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert_item<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    budget_id: Uuid,
    category_id: i32,
    fund_type: &str,
    amount: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO budget_items (budget_id, category_id, fund_type, amount)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(budget_id)
    .bind(category_id)
    .bind(fund_type)
    .bind(amount)
    .execute(executor)
    .await?;
    Ok(())
}

/// Removes the project's budget rows whose (year, organization) pair is not kept.
pub async fn delete_except<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    keep_years: &[i32],
    keep_organizations: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM project_budgets b
         WHERE b.project_id = $1
           AND NOT EXISTS (
               SELECT 1 FROM unnest($2::int[], $3::uuid[]) AS keep(project_year, organization_id)
               WHERE keep.project_year = b.project_year
                 AND keep.organization_id = b.organization_id
           )",
    )
    .bind(project_id)
    .bind(keep_years)
    .bind(keep_organizations)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_items(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM budget_items i
         JOIN project_budgets b ON b.id = i.budget_id
         WHERE b.project_id = $1",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
