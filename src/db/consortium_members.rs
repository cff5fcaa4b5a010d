use sqlx::PgPool;
use uuid::Uuid;

use crate::models::consortium_member::LEAD;
use crate::models::{ConsortiumMember, ACTIVE, DELETED};

#[derive(Debug)]
pub struct MemberFields {
    pub organization_id: Uuid,
    pub project_year: i32,
    pub role: String,
    pub member_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub responsibility: Option<String>,
}

const SELECT_WITH_ORG: &str = "SELECT m.*, o.name AS organization_name
     FROM project_consortium_members m
     JOIN organizations o ON o.id = m.organization_id";

pub async fn list(
    pool: &PgPool,
    project_id: Uuid,
    year: Option<i32>,
) -> Result<Vec<ConsortiumMember>, sqlx::Error> {
    sqlx::query_as::<_, ConsortiumMember>(&format!(
        "{SELECT_WITH_ORG}
         WHERE m.project_id = $1 AND m.is_flag = $2 AND ($3::int IS NULL OR m.project_year = $3)
         ORDER BY m.project_year, (m.role = '{LEAD}') DESC, o.name, m.member_name"
    ))
    .bind(project_id)
    .bind(ACTIVE)
    .bind(year)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ConsortiumMember>, sqlx::Error> {
    sqlx::query_as::<_, ConsortiumMember>(&format!(
        "{SELECT_WITH_ORG} WHERE m.id = $1 AND m.is_flag = $2"
    ))
    .bind(id)
    .bind(ACTIVE)
    .fetch_optional(pool)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    fields: &MemberFields,
) -> Result<ConsortiumMember, sqlx::Error> {
    sqlx::query_as::<_, ConsortiumMember>(
        "WITH m AS (
             INSERT INTO project_consortium_members
                 (project_id, organization_id, project_year, role, member_name, position, email, phone, responsibility)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *
         )
         SELECT m.*, o.name AS organization_name FROM m JOIN organizations o ON o.id = m.organization_id",
    )
    .bind(project_id)
    .bind(fields.organization_id)
    .bind(fields.project_year)
    .bind(&fields.role)
    .bind(&fields.member_name)
    .bind(&fields.position)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.responsibility)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    fields: &MemberFields,
) -> Result<ConsortiumMember, sqlx::Error> {
    sqlx::query_as::<_, ConsortiumMember>(
        "WITH m AS (
             UPDATE project_consortium_members
             SET organization_id = $2, project_year = $3, role = $4, member_name = $5,
                 position = $6, email = $7, phone = $8, responsibility = $9, updated_at = now()
             WHERE id = $1 AND is_flag = $10
             RETURNING *
         )
         SELECT m.*, o.name AS organization_name FROM m JOIN organizations o ON o.id = m.organization_id",
    )
    .bind(id)
    .bind(fields.organization_id)
    .bind(fields.project_year)
    .bind(&fields.role)
    .bind(&fields.member_name)
    .bind(&fields.position)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(&fields.responsibility)
    .bind(ACTIVE)
    .fetch_one(executor)
    .await
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE project_consortium_members SET is_flag = $2, updated_at = now()
         WHERE id = $1 AND is_flag = $3",
    )
    .bind(id)
    .bind(DELETED)
    .bind(ACTIVE)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Organization of an active lead in the project-year other than `organization_id`,
/// ignoring the member `exclude` (the one being edited).
pub async fn find_other_lead<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    project_year: i32,
    organization_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT organization_id FROM project_consortium_members
         WHERE project_id = $1 AND project_year = $2 AND role = $3 AND is_flag = $4
           AND organization_id <> $5 AND ($6::uuid IS NULL OR id <> $6)
         LIMIT 1",
    )
    .bind(project_id)
    .bind(project_year)
    .bind(LEAD)
    .bind(ACTIVE)
    .bind(organization_id)
    .bind(exclude)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|r| r.0))
}

pub async fn count_active_in_year<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    project_year: i32,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM project_consortium_members
         WHERE project_id = $1 AND project_year = $2 AND is_flag = $3",
    )
    .bind(project_id)
    .bind(project_year)
    .bind(ACTIVE)
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}

pub async fn soft_delete_year<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    project_year: i32,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE project_consortium_members SET is_flag = $3, updated_at = now()
         WHERE project_id = $1 AND project_year = $2 AND is_flag = $4",
    )
    .bind(project_id)
    .bind(project_year)
    .bind(DELETED)
    .bind(ACTIVE)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Inserts an active copy of every active `source_year` member into `target_year`.
pub async fn copy_year<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: Uuid,
    source_year: i32,
    target_year: i32,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO project_consortium_members
             (project_id, organization_id, project_year, role, member_name, position, email, phone,
              responsibility, is_flag)
         SELECT project_id, organization_id, $3, role, member_name, position, email, phone,
                responsibility, $4
         FROM project_consortium_members
         WHERE project_id = $1 AND project_year = $2 AND is_flag = $4
         ORDER BY created_at",
    )
    .bind(project_id)
    .bind(source_year)
    .bind(target_year)
    .bind(ACTIVE)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
