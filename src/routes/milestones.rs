use axum::extract::{Path, State};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::milestones::MilestoneFields;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::milestone::{completion_date, STATUSES};
use crate::models::Milestone;
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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRequest {
    pub project_id: Option<Uuid>,
    pub project_year: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub completed_at: Option<NaiveDate>,
}

impl MilestoneRequest {
    /// `previous` is the completion date of the stored milestone being edited.
    fn into_fields(
        self,
        mut missing: Missing,
        previous: Option<NaiveDate>,
    ) -> Result<MilestoneFields, AppError> {
        let project_year = missing.value("projectYear", self.project_year);
        let title = missing.text("title", self.title);
        let due_date = missing.value("dueDate", self.due_date);
        missing.finish()?;

        let status = validate::trimmed(self.status).unwrap_or_else(|| "pending".to_string());
        validate::one_of("status", &status, STATUSES)?;

        Ok(MilestoneFields {
            project_year,
            title,
            description: validate::trimmed(self.description),
            due_date,
            completed_at: completion_date(
                &status,
                self.completed_at,
                previous,
                Local::now().date_naive(),
            ),
            status,
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("마일스톤을 찾을 수 없습니다.".to_string())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<Milestone>> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    Ok(response::ok(db::milestones::list(&state.pool, project_id, q.year).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(mut req): ApiJson<MilestoneRequest>,
) -> ApiResult<Milestone> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id.take());
    let fields = req.into_fields(missing, None)?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, project_id).await?;
    validate::project_year(fields.project_year, project.total_years)?;
    let milestone = db::milestones::create(&mut *tx, project.id, &fields).await?;
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "milestone.created", "milestone", Some(milestone.id), None)
        .await;

    Ok(response::ok_with_message(milestone, "마일스톤이 등록되었습니다."))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<MilestoneRequest>,
) -> ApiResult<Milestone> {
    let existing = db::milestones::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    let fields = req.into_fields(Missing::new(), existing.kept_completion())?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, existing.project_id).await?;
    validate::project_year(fields.project_year, project.total_years)?;
    let milestone = db::milestones::update(&mut *tx, id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => not_found(),
            _ => AppError::Database(e),
        })?;
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "milestone.updated", "milestone", Some(id), None).await;

    Ok(response::ok_with_message(milestone, "마일스톤이 수정되었습니다."))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !db::milestones::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(&state.pool, &auth, "milestone.deleted", "milestone", Some(id), None).await;

    Ok(response::message("마일스톤이 삭제되었습니다."))
}
