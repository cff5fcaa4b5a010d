use std::collections::BTreeSet;

use axum::extract::State;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::consortium_members::MemberFields;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::consortium_member::{LEAD, ROLES};
use crate::models::ConsortiumMember;
use crate::response::{self, ApiResult};
use crate::routes::projects;
use crate::state::SharedState;
use crate::validate::{self, Missing};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub project_id: Option<Uuid>,
    pub year: Option<i32>,
}

/// Body of both POST (create) and PUT (update, `id` required).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub project_year: Option<i32>,
    pub role: Option<String>,
    pub member_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub responsibility: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub project_id: Option<Uuid>,
    pub source_year: Option<i32>,
    pub target_years: Option<Vec<i32>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResult {
    pub source_year: i32,
    pub target_years: Vec<i32>,
    /// Rows inserted across all target years.
    pub copied: u64,
    /// Previously active target-year rows that were soft-deleted.
    pub replaced: u64,
}

fn not_found() -> AppError {
    AppError::NotFound("참여기관 정보를 찾을 수 없습니다.".to_string())
}

/// Validates the member fields shared by create and update.
/// `missing` must already hold the caller's own required checks.
fn member_fields(mut missing: Missing, req: MemberRequest) -> Result<MemberFields, AppError> {
    let organization_id = missing.value("organizationId", req.organization_id);
    let project_year = missing.value("projectYear", req.project_year);
    let member_name = missing.text("memberName", req.member_name);
    missing.finish()?;

    let role = validate::trimmed(req.role).unwrap_or_else(|| "participant".to_string());
    validate::one_of("role", &role, ROLES)?;

    let email = validate::trimmed(req.email);
    if let Some(ref email) = email {
        validate::email(email)?;
    }

    Ok(MemberFields {
        organization_id,
        project_year,
        role,
        member_name,
        position: validate::trimmed(req.position),
        email,
        phone: validate::trimmed(req.phone),
        responsibility: validate::trimmed(req.responsibility),
    })
}

/// Checks that the organization is usable and that at most one organization
/// leads the project-year. `conn` must hold the project row lock.
async fn check_membership(
    conn: &mut PgConnection,
    project_id: Uuid,
    total_years: i32,
    fields: &MemberFields,
    editing: Option<Uuid>,
) -> Result<(), AppError> {
    validate::project_year(fields.project_year, total_years)?;

    if db::organizations::find_by_id(&mut *conn, fields.organization_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(
            "존재하지 않거나 삭제된 기관입니다.".to_string(),
        ));
    }

    if fields.role == LEAD
        && db::consortium_members::find_other_lead(
            &mut *conn,
            project_id,
            fields.project_year,
            fields.organization_id,
            editing,
        )
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "{}차년도에 이미 다른 주관기관이 지정되어 있습니다.",
            fields.project_year
        )));
    }

    Ok(())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<ConsortiumMember>> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    let members = db::consortium_members::list(&state.pool, project_id, q.year).await?;
    Ok(response::ok(members))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(mut req): ApiJson<MemberRequest>,
) -> ApiResult<ConsortiumMember> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id.take());
    let fields = member_fields(missing, req)?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, project_id).await?;
    check_membership(&mut tx, project.id, project.total_years, &fields, None).await?;
    let member = db::consortium_members::create(&mut *tx, project.id, &fields).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        &auth,
        "consortium_member.created",
        "consortium_member",
        Some(member.id),
        None,
    )
    .await;

    Ok(response::ok_with_message(member, "참여기관이 등록되었습니다."))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(mut req): ApiJson<MemberRequest>,
) -> ApiResult<ConsortiumMember> {
    let mut missing = Missing::new();
    let id = missing.value("id", req.id.take());
    let fields = member_fields(missing, req)?;

    let existing = db::consortium_members::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, existing.project_id).await?;
    check_membership(&mut tx, project.id, project.total_years, &fields, Some(id)).await?;
    let member = db::consortium_members::update(&mut *tx, id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => not_found(),
            _ => AppError::Database(e),
        })?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        &auth,
        "consortium_member.updated",
        "consortium_member",
        Some(id),
        None,
    )
    .await;

    Ok(response::ok_with_message(member, "참여기관 정보가 수정되었습니다."))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<DeleteQuery>,
) -> ApiResult<()> {
    let mut missing = Missing::new();
    let id = missing.value("id", q.id);
    missing.finish()?;

    if !db::consortium_members::soft_delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(
        &state.pool,
        &auth,
        "consortium_member.deleted",
        "consortium_member",
        Some(id),
        None,
    )
    .await;

    Ok(response::message("참여기관이 삭제되었습니다."))
}

/// Copies the active members of `sourceYear` into each of `targetYears`,
/// replacing whatever those years held. Runs in one transaction.
pub async fn copy_years(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<CopyRequest>,
) -> ApiResult<CopyResult> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id);
    let source_year = missing.value("sourceYear", req.source_year);
    let target_years = missing.value("targetYears", req.target_years);
    missing.finish()?;

    let target_years: Vec<i32> = target_years
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if target_years.is_empty() {
        return Err(AppError::BadRequest(
            "복사할 대상 연차를 선택해 주세요.".to_string(),
        ));
    }
    if target_years.contains(&source_year) {
        return Err(AppError::BadRequest(
            "원본 연차와 대상 연차가 같을 수 없습니다.".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    let project = projects::lock(&mut tx, project_id).await?;
    validate::project_year(source_year, project.total_years)?;
    for &year in &target_years {
        validate::project_year(year, project.total_years)?;
    }

    let source_count =
        db::consortium_members::count_active_in_year(&mut *tx, project.id, source_year).await?;
    if source_count == 0 {
        return Err(AppError::BadRequest(format!(
            "{source_year}차년도에 복사할 참여기관 정보가 없습니다."
        )));
    }

    let mut copied = 0;
    let mut replaced = 0;
    for &target_year in &target_years {
        replaced +=
            db::consortium_members::soft_delete_year(&mut *tx, project.id, target_year).await?;
        copied +=
            db::consortium_members::copy_year(&mut *tx, project.id, source_year, target_year)
                .await?;
    }

    tx.commit().await?;

    tracing::info!(
        project_id = %project.id,
        source_year,
        ?target_years,
        copied,
        replaced,
        "Consortium members copied between years"
    );
    audit::log_event(
        &state.pool,
        &auth,
        "consortium_member.copied",
        "project",
        Some(project.id),
        Some(serde_json::json!({
            "sourceYear": source_year,
            "targetYears": target_years,
            "copied": copied,
        })),
    )
    .await;

    Ok(response::ok_with_message(
        CopyResult {
            source_year,
            target_years,
            copied,
            replaced,
        },
        "참여기관 정보가 복사되었습니다.",
    ))
}
