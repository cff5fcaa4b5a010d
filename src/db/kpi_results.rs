use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{KpiResult, ACTIVE, DELETED};

#[derive(Debug)]
pub struct KpiFields {
    pub project_year: i32,
    pub kpi_category: String,
    pub kpi_name: String,
    pub unit: Option<String>,
    pub target_value: f64,
    pub actual_value: Option<f64>,
    pub achievement_rate: Option<f64>,
    pub evidence: Option<String>,
    pub note: Option<String>,
}

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    year: Option<i32>,
) -> Result<Vec<KpiResult>, sqlx::Error> {
    sqlx::query_as::<_, KpiResult>(
        "SELECT * FROM project_kpi_results
         WHERE project_id = $1 AND is_flag = $2 AND ($3::int IS NULL OR project_year = $3)
         ORDER BY project_year, kpi_category, kpi_name",
    )
    .bind(project_id)
    .bind(ACTIVE)
    .bind(year)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<KpiResult>, sqlx::Error> {
    sqlx::query_as::<_, KpiResult>("SELECT * FROM project_kpi_results WHERE id = $1 AND is_flag = $2")
        .bind(id)
        .bind(ACTIVE)
        .fetch_optional(pool)
        .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    fields: &KpiFields,
) -> Result<KpiResult, sqlx::Error> {
    sqlx::query_as::<_, KpiResult>(
        "INSERT INTO project_kpi_results
             (project_id, project_year, kpi_category, kpi_name, unit, target_value, actual_value,
              achievement_rate, evidence, note)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(project_id)
    .bind(fields.project_year)
    .bind(&fields.kpi_category)
    .bind(&fields.kpi_name)
    .bind(&fields.unit)
    .bind(fields.target_value)
    .bind(fields.actual_value)
    .bind(fields.achievement_rate)
    .bind(&fields.evidence)
    .bind(&fields.note)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    fields: &KpiFields,
) -> Result<KpiResult, sqlx::Error> {
    sqlx::query_as::<_, KpiResult>(
        "UPDATE project_kpi_results
         SET project_year = $2, kpi_category = $3, kpi_name = $4, unit = $5, target_value = $6,
             actual_value = $7, achievement_rate = $8, evidence = $9, note = $10, updated_at = now()
         WHERE id = $1 AND is_flag = $11 RETURNING *",
    )
    .bind(id)
    .bind(fields.project_year)
    .bind(&fields.kpi_category)
    .bind(&fields.kpi_name)
    .bind(&fields.unit)
    .bind(fields.target_value)
    .bind(fields.actual_value)
    .bind(fields.achievement_rate)
    .bind(&fields.evidence)
    .bind(&fields.note)
    .bind(ACTIVE)
    .fetch_one(executor)
    .await
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE project_kpi_results SET is_flag = $2, updated_at = now() WHERE id = $1 AND is_flag = $3",
    )
    .bind(id)
    .bind(DELETED)
    .bind(ACTIVE)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
