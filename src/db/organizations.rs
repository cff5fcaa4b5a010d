use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Organization, ACTIVE, DELETED};

#[derive(Debug)]
pub struct OrganizationFields {
    pub name: String,
    pub business_number: Option<String>,
    pub org_type: String,
    pub representative: Option<String>,
    pub address: Option<String>,
}

pub async fn list(pool: &PgPool, keyword: Option<&str>) -> Result<Vec<Organization>, sqlx::Error> {
    let keyword = keyword.map(|k| format!("%{k}%"));
    sqlx::query_as::<_, Organization>(
        "SELECT * FROM organizations
         WHERE is_flag = $1 AND ($2::text IS NULL OR name ILIKE $2 OR business_number ILIKE $2)
         ORDER BY name",
    )
    .bind(ACTIVE)
    .bind(keyword)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    fields: &OrganizationFields,
) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        "INSERT INTO organizations (name, business_number, org_type, representative, address)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&fields.name)
    .bind(&fields.business_number)
    .bind(&fields.org_type)
    .bind(&fields.representative)
    .bind(&fields.address)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1 AND is_flag = $2")
        .bind(id)
        .bind(ACTIVE)
        .fetch_optional(executor)
        .await
}

/// How many of `ids` name active organizations.
pub async fn count_active<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    ids: &[Uuid],
) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM organizations WHERE id = ANY($1) AND is_flag = $2")
            .bind(ids)
            .bind(ACTIVE)
            .fetch_one(executor)
            .await?;
    Ok(row.0)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    fields: &OrganizationFields,
) -> Result<Organization, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        "UPDATE organizations
         SET name = $2, business_number = $3, org_type = $4, representative = $5, address = $6,
             updated_at = now()
         WHERE id = $1 AND is_flag = $7 RETURNING *",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.business_number)
    .bind(&fields.org_type)
    .bind(&fields.representative)
    .bind(&fields.address)
    .bind(ACTIVE)
    .fetch_one(pool)
    .await
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE organizations SET is_flag = $2, updated_at = now() WHERE id = $1 AND is_flag = $3",
    )
    .bind(id)
    .bind(DELETED)
    .bind(ACTIVE)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
