use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::organizations::OrganizationFields;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::organization::ORG_TYPES;
use crate::models::Organization;
use crate::response::{self, ApiResult};
use crate::state::SharedState;
use crate::validate::{self, Missing};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequest {
    pub name: Option<String>,
    pub business_number: Option<String>,
    pub org_type: Option<String>,
    pub representative: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub keyword: Option<String>,
}

impl OrganizationRequest {
    fn into_fields(self) -> Result<OrganizationFields, AppError> {
        let mut missing = Missing::new();
        let name = missing.text("name", self.name);
        missing.finish()?;

        let org_type = validate::trimmed(self.org_type).unwrap_or_else(|| "other".to_string());
        validate::one_of("orgType", &org_type, ORG_TYPES)?;

        Ok(OrganizationFields {
            name,
            business_number: validate::trimmed(self.business_number),
            org_type,
            representative: validate::trimmed(self.representative),
            address: validate::trimmed(self.address),
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("기관을 찾을 수 없습니다.".to_string())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Vec<Organization>> {
    let keyword = validate::trimmed(q.keyword);
    let organizations = db::organizations::list(&state.pool, keyword.as_deref()).await?;
    Ok(response::ok(organizations))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<OrganizationRequest>,
) -> ApiResult<Organization> {
    let fields = req.into_fields()?;
    let organization = db::organizations::create(&state.pool, &fields).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "organization.created",
        "organization",
        Some(organization.id),
        None,
    )
    .await;

    Ok(response::ok_with_message(organization, "기관이 등록되었습니다."))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Organization> {
    let organization = db::organizations::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(response::ok(organization))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<OrganizationRequest>,
) -> ApiResult<Organization> {
    let fields = req.into_fields()?;
    let organization = db::organizations::update(&state.pool, id, &fields)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => not_found(),
            _ => AppError::Database(e),
        })?;

    audit::log_event(
        &state.pool,
        &auth,
        "organization.updated",
        "organization",
        Some(id),
        None,
    )
    .await;

    Ok(response::ok_with_message(organization, "기관 정보가 수정되었습니다."))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if !db::organizations::soft_delete(&state.pool, id).await? {
        return Err(not_found());
    }

    audit::log_event(
        &state.pool,
        &auth,
        "organization.deleted",
        "organization",
        Some(id),
        None,
    )
    .await;

    Ok(response::message("기관이 삭제되었습니다."))
}
