use axum::extract::{Path, State};
use axum::http::HeaderMap;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::research_logs::LogFields;
use crate::error::AppError;
use crate::extract::ApiQuery;
use crate::forms::{self, FormPayload};
use crate::middleware::audit;
use crate::models::ResearchLog;
use crate::response::{self, ApiResult};
use crate::routes::projects;
use crate::state::SharedState;
use crate::upload::{self, StoredFile};
use crate::validate::{self, Missing};

const FILE_FIELD: &str = "file";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub project_id: Option<Uuid>,
    pub keyword: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRequest {
    pub project_id: Option<Uuid>,
    pub log_date: Option<NaiveDate>,
    pub title: Option<String>,
    pub content: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("연구일지를 찾을 수 없습니다.".to_string())
}

async fn store_attachment(
    state: &SharedState,
    payload: &mut FormPayload,
) -> Result<Option<StoredFile>, AppError> {
    match payload.take_file(FILE_FIELD) {
        Some(file) => Ok(Some(upload::store(&state.config.upload_dir, &file).await?)),
        None => Ok(None),
    }
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<ResearchLog>> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    let keyword = validate::trimmed(q.keyword);
    let logs = db::research_logs::list(&state.pool, project_id, keyword.as_deref()).await?;
    Ok(response::ok(logs))
}

/// Accepts JSON or multipart; a multipart `file` part becomes the attachment.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<ResearchLog> {
    let mut payload = forms::parse(&headers, body).await?;
    let req: LogRequest = payload.fields_as()?;

    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id);
    let log_date = missing.value("logDate", req.log_date);
    let title = missing.text("title", req.title);
    let content = missing.text("content", req.content);
    missing.finish()?;

    let project = projects::load(&state, project_id).await?;
    let stored = store_attachment(&state, &mut payload).await?;

    let fields = LogFields {
        log_date,
        title,
        content,
        attachment_path: stored.as_ref().map(|s| s.public_path.clone()),
        attachment_name: stored.as_ref().map(|s| s.original_name.clone()),
    };

    let log = match db::research_logs::create(&state.pool, project.id, auth.user_id, &fields).await
    {
        Ok(log) => log,
        Err(e) => {
            if let Some(stored) = stored {
                upload::remove(&state.config.upload_dir, &stored.public_path).await;
            }
            return Err(e.into());
        }
    };

    audit::log_event(&state.pool, &auth, "research_log.created", "research_log", Some(log.id), None)
        .await;

    Ok(response::ok_with_message(log, "연구일지가 등록되었습니다."))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ResearchLog> {
    let log = db::research_logs::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(response::ok(log))
}

/// A new `file` replaces the attachment; `removeAttachment` clears it.
/// Omitted fields keep their stored values.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<ResearchLog> {
    let mut payload = forms::parse(&headers, body).await?;
    let req: LogRequest = payload.fields_as()?;
    let remove_attachment = forms::truthy(payload.fields.get("removeAttachment"));

    let existing = db::research_logs::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;

    let stored = store_attachment(&state, &mut payload).await?;

    let (attachment_path, attachment_name) = match (&stored, remove_attachment) {
        (Some(s), _) => (Some(s.public_path.clone()), Some(s.original_name.clone())),
        (None, true) => (None, None),
        (None, false) => (existing.attachment_path.clone(), existing.attachment_name.clone()),
    };

    let fields = LogFields {
        log_date: req.log_date.unwrap_or(existing.log_date),
        title: validate::trimmed(req.title).unwrap_or(existing.title),
        content: validate::trimmed(req.content).unwrap_or(existing.content),
        attachment_path,
        attachment_name,
    };

    let log = match db::research_logs::update(&state.pool, id, &fields).await {
        Ok(log) => log,
        Err(e) => {
            if let Some(stored) = stored {
                upload::remove(&state.config.upload_dir, &stored.public_path).await;
            }
            return Err(match e {
                sqlx::Error::RowNotFound => not_found(),
                _ => AppError::Database(e),
            });
        }
    };

    if let Some(old) = existing.attachment_path {
        if log.attachment_path.as_deref() != Some(old.as_str()) {
            upload::remove(&state.config.upload_dir, &old).await;
        }
    }

    audit::log_event(&state.pool, &auth, "research_log.updated", "research_log", Some(id), None)
        .await;

    Ok(response::ok_with_message(log, "연구일지가 수정되었습니다."))
}

/// Soft delete; the attachment stays on disk with the row.
pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !db::research_logs::soft_delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(&state.pool, &auth, "research_log.deleted", "research_log", Some(id), None)
        .await;

    Ok(response::message("연구일지가 삭제되었습니다."))
}
