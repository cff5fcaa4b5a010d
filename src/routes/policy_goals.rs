use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::policy_goals::GoalFields;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::PolicyGoal;
use crate::response::{self, ApiResult};
use crate::routes::projects;
use crate::state::SharedState;
use crate::validate::{self, Missing};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub project_id: Option<Uuid>,
    pub goal_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl GoalRequest {
    fn into_fields(self, mut missing: Missing) -> Result<GoalFields, AppError> {
        let title = missing.text("title", self.title);
        missing.finish()?;
        Ok(GoalFields {
            goal_type: validate::trimmed(self.goal_type),
            title,
            description: validate::trimmed(self.description),
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("정책목표를 찾을 수 없습니다.".to_string())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<PolicyGoal>> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    Ok(response::ok(db::policy_goals::list(&state.pool, project_id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(mut req): ApiJson<GoalRequest>,
) -> ApiResult<PolicyGoal> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id.take());
    let fields = req.into_fields(missing)?;

    let project = projects::load(&state, project_id).await?;
    let goal = db::policy_goals::create(&state.pool, project.id, &fields).await?;

    audit::log_event(&state.pool, &auth, "policy_goal.created", "policy_goal", Some(goal.id), None)
        .await;

    Ok(response::ok_with_message(goal, "정책목표가 등록되었습니다."))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<GoalRequest>,
) -> ApiResult<PolicyGoal> {
    let fields = req.into_fields(Missing::new())?;

    let goal = db::policy_goals::update(&state.pool, id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => not_found(),
            _ => AppError::Database(e),
        })?;

    audit::log_event(&state.pool, &auth, "policy_goal.updated", "policy_goal", Some(id), None).await;

    Ok(response::ok_with_message(goal, "정책목표가 수정되었습니다."))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !db::policy_goals::delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(&state.pool, &auth, "policy_goal.deleted", "policy_goal", Some(id), None).await;

    Ok(response::message("정책목표가 삭제되었습니다."))
}
