use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Milestone;

#[derive(Debug)]
pub struct MilestoneFields {
    pub project_year: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: String,
    pub completed_at: Option<NaiveDate>,
}

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    year: Option<i32>,
) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(
        "SELECT * FROM project_milestones
         WHERE project_id = $1 AND ($2::int IS NULL OR project_year = $2)
         ORDER BY due_date, title",
    )
    .bind(project_id)
    .bind(year)
    .fetch_all(pool)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    fields: &MilestoneFields,
) -> Result<Milestone, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(
        "INSERT INTO project_milestones
             (project_id, project_year, title, description, due_date, status, completed_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(project_id)
    .bind(fields.project_year)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.due_date)
    .bind(&fields.status)
    .bind(fields.completed_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>("SELECT * FROM project_milestones WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    fields: &MilestoneFields,
) -> Result<Milestone, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(
        "UPDATE project_milestones
         SET project_year = $2, title = $3, description = $4, due_date = $5, status = $6,
             completed_at = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(fields.project_year)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.due_date)
    .bind(&fields.status)
    .bind(fields.completed_at)
    .fetch_one(executor)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM project_milestones WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
