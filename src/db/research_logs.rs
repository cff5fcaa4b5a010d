use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ResearchLog, ACTIVE, DELETED};

#[derive(Debug)]
pub struct LogFields {
    pub log_date: NaiveDate,
    pub title: String,
    pub content: String,
    pub attachment_path: Option<String>,
    pub attachment_name: Option<String>,
}

const SELECT_WITH_AUTHOR: &str = "SELECT l.*, u.name AS author_name
     FROM research_logs l
     LEFT JOIN users u ON u.id = l.author_id";

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    keyword: Option<&str>,
) -> Result<Vec<ResearchLog>, sqlx::Error> {
    let keyword = keyword.map(|k| format!("%{k}%"));
    sqlx::query_as::<_, ResearchLog>(&format!(
        "{SELECT_WITH_AUTHOR}
         WHERE l.project_id = $1 AND l.is_flag = $2
           AND ($3::text IS NULL OR l.title ILIKE $3 OR l.content ILIKE $3)
         ORDER BY l.log_date DESC, l.created_at DESC"
    ))
    .bind(project_id)
    .bind(ACTIVE)
    .bind(keyword)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ResearchLog>, sqlx::Error> {
    sqlx::query_as::<_, ResearchLog>(&format!(
        "{SELECT_WITH_AUTHOR} WHERE l.id = $1 AND l.is_flag = $2"
    ))
    .bind(id)
    .bind(ACTIVE)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    author_id: Uuid,
    fields: &LogFields,
) -> Result<ResearchLog, sqlx::Error> {
    sqlx::query_as::<_, ResearchLog>(
        "WITH l AS (
             INSERT INTO research_logs
                 (project_id, log_date, title, content, author_id, attachment_path, attachment_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *
         )
         SELECT l.*, u.name AS author_name FROM l LEFT JOIN users u ON u.id = l.author_id",
    )
    .bind(project_id)
    .bind(fields.log_date)
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(author_id)
    .bind(&fields.attachment_path)
    .bind(&fields.attachment_name)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, fields: &LogFields) -> Result<ResearchLog, sqlx::Error> {
    sqlx::query_as::<_, ResearchLog>(
        "WITH l AS (
             UPDATE research_logs
             SET log_date = $2, title = $3, content = $4, attachment_path = $5,
                 attachment_name = $6, updated_at = now()
             WHERE id = $1 AND is_flag = $7
             RETURNING *
         )
         SELECT l.*, u.name AS author_name FROM l LEFT JOIN users u ON u.id = l.author_id",
    )
    .bind(id)
    .bind(fields.log_date)
    .bind(&fields.title)
    .bind(&fields.content)
    .bind(&fields.attachment_path)
    .bind(&fields.attachment_name)
    .bind(ACTIVE)
    .fetch_one(pool)
    .await
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE research_logs SET is_flag = $2, updated_at = now() WHERE id = $1 AND is_flag = $3",
    )
    .bind(id)
    .bind(DELETED)
    .bind(ACTIVE)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Stored attachment paths of every log in the project, soft-deleted ones included.
pub async fn attachment_paths<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT attachment_path FROM research_logs
         WHERE project_id = $1 AND attachment_path IS NOT NULL",
    )
    .bind(project_id)
    .fetch_all(executor)
    .await
}
