use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::projects::{ProjectFields, ProjectFilter};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::project::{self, STATUSES};
use crate::models::{AuditEvent, Project};
use crate::response::{self, ApiResult};
use crate::state::SharedState;
use crate::upload;
use crate::validate::{self, Missing};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub project_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub manager_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub keyword: Option<String>,
    pub year: Option<i32>,
}

impl ProjectRequest {
    fn into_fields(self) -> Result<ProjectFields, AppError> {
        let mut missing = Missing::new();
        let project_code = missing.text("projectCode", self.project_code);
        let title = missing.text("title", self.title);
        let start_date = missing.value("startDate", self.start_date);
        let end_date = missing.value("endDate", self.end_date);
        missing.finish()?;

        validate::project_code(&project_code)?;
        if end_date < start_date {
            return Err(AppError::BadRequest(
                "종료일은 시작일보다 빠를 수 없습니다.".to_string(),
            ));
        }

        let status = validate::trimmed(self.status).unwrap_or_else(|| "planning".to_string());
        validate::one_of("status", &status, STATUSES)?;

        Ok(ProjectFields {
            project_code,
            title,
            description: validate::trimmed(self.description),
            manager_name: validate::trimmed(self.manager_name),
            start_date,
            end_date,
            total_years: project::total_years(start_date, end_date),
            status,
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("과제를 찾을 수 없습니다.".to_string())
}

/// Loads a project or fails with 404. Shared by every project-scoped route.
pub async fn load(state: &SharedState, id: Uuid) -> Result<Project, AppError> {
    db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)
}

/// Locks a project row inside `conn`'s transaction or fails with 404.
pub async fn lock(conn: &mut sqlx::PgConnection, id: Uuid) -> Result<Project, AppError> {
    db::projects::lock(conn, id).await?.ok_or_else(not_found)
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<Project>> {
    let filter = ProjectFilter {
        status: validate::trimmed(q.status),
        keyword: validate::trimmed(q.keyword),
        year: q.year,
    };
    let projects = db::projects::list(&state.pool, &filter).await?;
    Ok(response::ok(projects))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<Project> {
    let fields = req.into_fields()?;

    let project = db::projects::create(&state.pool, &fields, auth.user_id)
        .await
        .map_err(|e| AppError::unique_or_db(e, "이미 등록된 과제번호입니다."))?;

    audit::log_event(
        &state.pool,
        &auth,
        "project.created",
        "project",
        Some(project.id),
        Some(serde_json::json!({ "projectCode": project.project_code })),
    )
    .await;

    Ok(response::ok_with_message(project, "과제가 등록되었습니다."))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Project> {
    Ok(response::ok(load(&state, id).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<Project> {
    let fields = req.into_fields()?;

    let mut tx = state.pool.begin().await?;

    let current = lock(&mut tx, id).await?;
    if fields.total_years < current.total_years {
        let stranded =
            db::projects::count_rows_after_year(&mut *tx, id, fields.total_years).await?;
        if stranded > 0 {
            return Err(AppError::Conflict(format!(
                "{}차년도 이후의 예산·참여기관·성과지표·마일스톤 정보가 남아 있어 기간을 줄일 수 없습니다.",
                fields.total_years
            )));
        }
    }

    let project = db::projects::update(&mut *tx, id, &fields)
        .await
        .map_err(|e| AppError::unique_or_db(e, "이미 등록된 과제번호입니다."))?;

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        &auth,
        "project.updated",
        "project",
        Some(project.id),
        Some(serde_json::json!({
            "totalYears": project.total_years,
            "previousTotalYears": current.total_years,
        })),
    )
    .await;

    Ok(response::ok_with_message(project, "과제가 수정되었습니다."))
}

/// Admin-only hard delete. Budgets, items, members, KPIs, goals, milestones
/// and logs are removed by the foreign keys; log attachments are unlinked
/// after the commit.
pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;

    let mut tx = state.pool.begin().await?;
    lock(&mut tx, id).await?;
    let attachments = db::research_logs::attachment_paths(&mut *tx, id).await?;
    db::projects::delete(&mut *tx, id).await?;
    tx.commit().await?;

    for path in &attachments {
        upload::remove(&state.config.upload_dir, path).await;
    }

    tracing::info!(project_id = %id, attachments = attachments.len(), "Project deleted");
    audit::log_event(&state.pool, &auth, "project.deleted", "project", Some(id), None).await;

    Ok(response::message("과제가 삭제되었습니다."))
}

/// Audit trail of one project.
pub async fn history(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<AuditEvent>> {
    let events = db::audit::list_for_resource(&state.pool, "project", id).await?;
    Ok(response::ok(events))
}
