use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Project, ACTIVE};

#[derive(Debug, Default)]
pub struct ProjectFilter {
    pub status: Option<String>,
    pub keyword: Option<String>,
    /// Calendar year the project must be running in.
    pub year: Option<i32>,
}

/// Column values for create and full update.
#[derive(Debug)]
pub struct ProjectFields {
    pub project_code: String,
    pub title: String,
    pub description: Option<String>,
    pub manager_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_years: i32,
    pub status: String,
}

pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
    let keyword = filter.keyword.as_ref().map(|k| format!("%{k}%"));
    sqlx::query_as::<_, Project>(
        "SELECT * FROM project_planning
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::text IS NULL OR project_code ILIKE $2 OR title ILIKE $2 OR manager_name ILIKE $2)
           AND ($3::int IS NULL OR (EXTRACT(YEAR FROM start_date) <= $3 AND EXTRACT(YEAR FROM end_date) >= $3))
         ORDER BY created_at DESC",
    )
    .bind(filter.status.as_deref())
    .bind(keyword)
    .bind(filter.year)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    fields: &ProjectFields,
    created_by: Uuid,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO project_planning
            (project_code, title, description, manager_name, start_date, end_date, total_years, status, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(&fields.project_code)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.manager_name)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.total_years)
    .bind(&fields.status)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM project_planning WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Row-locks the project until the surrounding transaction ends.
pub async fn lock<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM project_planning WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Live year-scoped rows (budgets, members, KPIs, milestones) in years after `total_years`.
pub async fn count_rows_after_year<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    total_years: i32,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM project_budgets
                 WHERE project_id = $1 AND project_year > $2)
              + (SELECT COUNT(*) FROM project_consortium_members
                 WHERE project_id = $1 AND project_year > $2 AND is_flag = $3)
              + (SELECT COUNT(*) FROM project_kpi_results
                 WHERE project_id = $1 AND project_year > $2 AND is_flag = $3)
              + (SELECT COUNT(*) FROM project_milestones
                 WHERE project_id = $1 AND project_year > $2)",
    )
    .bind(id)
    .bind(total_years)
    .bind(ACTIVE)
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    fields: &ProjectFields,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE project_planning
         SET project_code = $2, title = $3, description = $4, manager_name = $5,
             start_date = $6, end_date = $7, total_years = $8, status = $9, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&fields.project_code)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.manager_name)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.total_years)
    .bind(&fields.status)
    .fetch_one(executor)
    .await
}

pub async fn set_total_budget<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    total_budget: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE project_planning SET total_budget = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(total_budget)
        .execute(executor)
        .await?;
    Ok(())
}

/// Hard delete; dependent rows go with it through `ON DELETE CASCADE`.
pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM project_planning WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
