use std::collections::{BTreeSet, HashMap, HashSet};

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::budget::{self, BudgetDetails, BudgetDetailsRequest};
use crate::db;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::audit;
use crate::models::BudgetCategory;
use crate::response::{self, ApiResult};
use crate::routes::projects;
use crate::state::SharedState;
use crate::validate::Missing;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsQuery {
    pub project_id: Option<Uuid>,
}

pub async fn categories(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Vec<BudgetCategory>> {
    let categories = db::budgets::list_categories(&state.pool).await?;
    Ok(response::ok(categories))
}

pub async fn load_details(state: &SharedState, project_id: Uuid) -> Result<BudgetDetails, AppError> {
    let keys = db::budgets::list_keys(&state.pool, project_id).await?;
    let items = db::budgets::list_items(&state.pool, project_id).await?;
    budget::summarize(project_id, &keys, &items)
}

pub async fn get_details(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(q): ApiQuery<DetailsQuery>,
) -> ApiResult<BudgetDetails> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", q.project_id);
    missing.finish()?;

    let project = projects::load(&state, project_id).await?;
    Ok(response::ok(load_details(&state, project.id).await?))
}

/// Replaces the project's budget with the submitted year/organization/category
/// amounts in one transaction holding the project row lock, then returns the
/// stored result.
pub async fn save_details(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<BudgetDetailsRequest>,
) -> ApiResult<BudgetDetails> {
    let mut missing = Missing::new();
    let project_id = missing.value("projectId", req.project_id);
    let years = missing.value("years", req.years);
    missing.finish()?;

    let categories = db::budgets::list_categories(&state.pool).await?;
    let codes: HashSet<String> = categories.iter().map(|c| c.code.clone()).collect();
    let category_ids: HashMap<&str, i32> =
        categories.iter().map(|c| (c.code.as_str(), c.id)).collect();

    let mut tx = state.pool.begin().await?;
    let project = projects::lock(&mut tx, project_id).await?;

    let planned = budget::plan(&years, project.total_years, &codes)?;
    let grand_total = budget::grand_total(&planned)?;

    let organization_ids: Vec<Uuid> = planned
        .iter()
        .map(|b| b.organization_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let found = db::organizations::count_active(&mut *tx, &organization_ids).await?;
    if found != organization_ids.len() as i64 {
        return Err(AppError::BadRequest(
            "존재하지 않거나 삭제된 기관이 포함되어 있습니다.".to_string(),
        ));
    }

    for planned_budget in &planned {
        let budget_id = db::budgets::upsert(&mut *tx, project.id, planned_budget).await?;
        db::budgets::delete_items(&mut *tx, budget_id).await?;

        for item in &planned_budget.items {
            let category_id = *category_ids
                .get(item.category_code.as_str())
                .ok_or_else(|| AppError::Internal(format!("Unknown category {}", item.category_code)))?;
            db::budgets::insert_item(
                &mut *tx,
                budget_id,
                category_id,
                item.fund_type.as_str(),
                item.amount,
            )
            .await?;
        }
    }

    let keep_years: Vec<i32> = planned.iter().map(|b| b.project_year).collect();
    let keep_organizations: Vec<Uuid> = planned.iter().map(|b| b.organization_id).collect();
    let removed =
        db::budgets::delete_except(&mut *tx, project.id, &keep_years, &keep_organizations).await?;

    db::projects::set_total_budget(&mut *tx, project.id, grand_total).await?;

    tx.commit().await?;

    tracing::info!(
        project_id = %project.id,
        budgets = planned.len(),
        removed,
        grand_total,
        "Budget details saved"
    );
    audit::log_event(
        &state.pool,
        &auth,
        "budget.saved",
        "project",
        Some(project.id),
        Some(serde_json::json!({ "grandTotal": grand_total, "removed": removed })),
    )
    .await;

    let details = load_details(&state, project.id).await?;
    Ok(response::ok_with_message(details, "예산이 저장되었습니다."))
}
