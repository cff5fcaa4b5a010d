use askama::Template;
use axum::extract::{Path, State};
use axum::response::Html;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::projects::ProjectFilter;
use crate::error::AppError;
use crate::models::Project;
use crate::routes::{budgets, projects};
use crate::state::SharedState;
use crate::views::{render, text_or_dash, won};

struct ProjectRow {
    id: String,
    project_code: String,
    title: String,
    manager_name: String,
    period: String,
    status: String,
    total_budget: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.to_string(),
            project_code: p.project_code.clone(),
            title: p.title.clone(),
            manager_name: text_or_dash(&p.manager_name),
            period: format!("{} ~ {}", p.start_date, p.end_date),
            status: status_label(&p.status).to_string(),
            total_budget: won(p.total_budget),
        }
    }
}

/// The API representation of a row, handed to the page's edit forms.
fn record<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(format!("Row encode failed: {e}")))
}

fn status_label(status: &str) -> &str {
    match status {
        "planning" => "기획",
        "active" => "진행",
        "completed" => "완료",
        "suspended" => "중단",
        other => other,
    }
}

#[derive(Template)]
#[template(path = "projects/list.html")]
struct ProjectListTemplate {
    user_name: String,
    projects: Vec<ProjectRow>,
}

struct BudgetRow {
    year: i32,
    organization: String,
    cash: String,
    inkind: String,
    total: String,
}

struct MemberRow {
    id: String,
    record: String,
    year: i32,
    organization: String,
    role: String,
    name: String,
    position: String,
    email: String,
}

struct KpiRow {
    id: String,
    record: String,
    year: i32,
    category: String,
    name: String,
    target: String,
    actual: String,
    rate: String,
}

struct MilestoneRow {
    id: String,
    record: String,
    year: i32,
    title: String,
    due_date: String,
    status: String,
}

struct LogRow {
    id: String,
    record: String,
    date: String,
    title: String,
    author: String,
    attachment_path: String,
    attachment_name: String,
}

struct GoalRow {
    id: String,
    record: String,
    title: String,
    description: String,
}

#[derive(Template)]
#[template(path = "projects/detail.html")]
struct ProjectDetailTemplate {
    user_name: String,
    is_admin: bool,
    project: ProjectRow,
    project_record: String,
    description: String,
    total_years: i32,
    years: Vec<i32>,
    organizations: Vec<(String, String)>,
    categories: Vec<(String, String)>,
    budgets: Vec<BudgetRow>,
    grand_total: String,
    goals: Vec<GoalRow>,
    members: Vec<MemberRow>,
    kpis: Vec<KpiRow>,
    milestones: Vec<MilestoneRow>,
    logs: Vec<LogRow>,
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

async fn user_name(state: &SharedState, auth: &AuthUser) -> Result<String, AppError> {
    Ok(db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_default())
}

pub async fn list_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Html<String>, AppError> {
    let projects = db::projects::list(&state.pool, &ProjectFilter::default()).await?;

    render(&ProjectListTemplate {
        user_name: user_name(&state, &auth).await?,
        projects: projects.iter().map(ProjectRow::from).collect(),
    })
}

pub async fn detail_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let project = projects::load(&state, id).await?;

    let details = budgets::load_details(&state, project.id).await?;
    let budgets = details
        .years
        .iter()
        .flat_map(|(&year, orgs)| {
            orgs.values().map(move |org| BudgetRow {
                year,
                organization: org.organization_name.clone(),
                cash: won(org.cash_total),
                inkind: won(org.inkind_total),
                total: won(org.total),
            })
        })
        .collect();

    let goals = db::policy_goals::list(&state.pool, project.id)
        .await?
        .into_iter()
        .map(|g| -> Result<GoalRow, AppError> {
            Ok(GoalRow {
                id: g.id.to_string(),
                record: record(&g)?,
                title: g.title,
                description: g.description.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let members = db::consortium_members::list(&state.pool, project.id, None)
        .await?
        .into_iter()
        .map(|m| -> Result<MemberRow, AppError> {
            Ok(MemberRow {
                id: m.id.to_string(),
                record: record(&m)?,
                year: m.project_year,
                organization: m.organization_name,
                role: match m.role.as_str() {
                    "lead" => "주관",
                    "joint" => "공동",
                    _ => "참여",
                }
                .to_string(),
                name: m.member_name,
                position: text_or_dash(&m.position),
                email: text_or_dash(&m.email),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let kpis = db::kpi_results::list(&state.pool, project.id, None)
        .await?
        .into_iter()
        .map(|k| -> Result<KpiRow, AppError> {
            Ok(KpiRow {
                id: k.id.to_string(),
                record: record(&k)?,
                year: k.project_year,
                category: k.kpi_category,
                name: k.kpi_name,
                target: number(k.target_value),
                actual: k.actual_value.map(number).unwrap_or_else(|| "-".to_string()),
                rate: k
                    .achievement_rate
                    .map(|r| format!("{r:.1}%"))
                    .unwrap_or_else(|| "-".to_string()),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let milestones = db::milestones::list(&state.pool, project.id, None)
        .await?
        .into_iter()
        .map(|m| -> Result<MilestoneRow, AppError> {
            Ok(MilestoneRow {
                id: m.id.to_string(),
                record: record(&m)?,
                year: m.project_year,
                title: m.title,
                due_date: m.due_date.to_string(),
                status: match m.status.as_str() {
                    "pending" => "대기",
                    "in_progress" => "진행중",
                    "completed" => "완료",
                    "delayed" => "지연",
                    other => other,
                }
                .to_string(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let logs = db::research_logs::list(&state.pool, project.id, None)
        .await?
        .into_iter()
        .map(|l| -> Result<LogRow, AppError> {
            Ok(LogRow {
                id: l.id.to_string(),
                record: record(&l)?,
                date: l.log_date.to_string(),
                title: l.title,
                author: text_or_dash(&l.author_name),
                attachment_path: l.attachment_path.unwrap_or_default(),
                attachment_name: l.attachment_name.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let organizations = db::organizations::list(&state.pool, None)
        .await?
        .into_iter()
        .map(|o| (o.id.to_string(), o.name))
        .collect();

    let categories = db::budgets::list_categories(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.code, c.name))
        .collect();

    render(&ProjectDetailTemplate {
        user_name: user_name(&state, &auth).await?,
        is_admin: auth.is_admin(),
        description: text_or_dash(&project.description),
        total_years: project.total_years,
        years: (1..=project.total_years).collect(),
        organizations,
        categories,
        project_record: record(&project)?,
        project: ProjectRow::from(&project),
        budgets,
        grand_total: won(details.grand_total),
        goals,
        members,
        kpis,
        milestones,
        logs,
    })
}
