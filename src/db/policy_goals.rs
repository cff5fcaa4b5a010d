use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PolicyGoal;

#[derive(Debug)]
pub struct GoalFields {
    pub goal_type: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

pub async fn list(pool: &PgPool, project_id: Uuid) -> Result<Vec<PolicyGoal>, sqlx::Error> {
    sqlx::query_as::<_, PolicyGoal>(
        "SELECT * FROM project_policy_goals WHERE project_id = $1 ORDER BY sort_order, created_at",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    fields: &GoalFields,
) -> Result<PolicyGoal, sqlx::Error> {
    sqlx::query_as::<_, PolicyGoal>(
        "INSERT INTO project_policy_goals (project_id, goal_type, title, description, sort_order)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(project_id)
    .bind(&fields.goal_type)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.sort_order)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, fields: &GoalFields) -> Result<PolicyGoal, sqlx::Error> {
    sqlx::query_as::<_, PolicyGoal>(
        "UPDATE project_policy_goals
         SET goal_type = $2, title = $3, description = $4, sort_order = $5, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&fields.goal_type)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.sort_order)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM project_policy_goals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
