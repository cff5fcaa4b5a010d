use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::kpi_results::KpiFields;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::kpi_result::achievement_rate;
use crate::models::KpiResult;
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
pub struct KpiRequest {
    pub project_id: Option<Uuid>,
    pub project_year: Option<i32>,
    pub kpi_category: Option<String>,
    pub kpi_name: Option<String>,
    pub unit: Option<String>,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub evidence: Option<String>,
    pub note: Option<String>,
}

impl KpiRequest {
    fn into_fields(self, mut missing: Missing) -> Result<KpiFields, AppError> {
        let project_year = missing.value("projectYear", self.project_year);
        let kpi_category = missing.text("kpiCategory", self.kpi_category);
        let kpi_name = missing.text("kpiName", self.kpi_name);
        let target_value = missing.value("targetValue", self.target_value);
        missing.finish()?;

        if target_value < 0.0 || self.actual_value.is_some_and(|v| v < 0.0) {
            return Err(AppError::BadRequest(
                "목표값과 실적값은 0 이상이어야 합니다.".to_string(),
            ));
        }

        Ok(KpiFields {
            project_year,
            kpi_category,
            kpi_name,
            unit: validate::trimmed(self.unit),
            target_value,
            actual_value: self.actual_value,
            achievement_rate: achievement_rate(target_value, self.actual_value),
            evidence: validate::trimmed(self.evidence),
            note: validate::trimmed(self.note),
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("성과지표를 찾을 수 없습니다.".to_string())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<KpiResult>> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    let results = db::kpi_results::list(&state.pool, project_id, q.year).await?;
    Ok(response::ok(results))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(mut req): ApiJson<KpiRequest>,
) -> ApiResult<KpiResult> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id.take());
    let fields = req.into_fields(missing)?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, project_id).await?;
    validate::project_year(fields.project_year, project.total_years)?;
    let result = db::kpi_results::create(&mut *tx, project.id, &fields).await?;
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "kpi_result.created", "kpi_result", Some(result.id), None)
        .await;

    Ok(response::ok_with_message(result, "성과지표가 등록되었습니다."))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<KpiResult> {
    let result = db::kpi_results::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(response::ok(result))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<KpiRequest>,
) -> ApiResult<KpiResult> {
    let fields = req.into_fields(Missing::new())?;

    let existing = db::kpi_results::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, existing.project_id).await?;
    validate::project_year(fields.project_year, project.total_years)?;
    let result = db::kpi_results::update(&mut *tx, id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => not_found(),
            _ => AppError::Database(e),
        })?;
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "kpi_result.updated", "kpi_result", Some(id), None).await;

    Ok(response::ok_with_message(result, "성과지표가 수정되었습니다."))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !db::kpi_results::soft_delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(&state.pool, &auth, "kpi_result.deleted", "kpi_result", Some(id), None).await;

    Ok(response::message("성과지표가 삭제되었습니다."))
}
