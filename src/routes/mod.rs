pub mod auth;
pub mod budgets;
pub mod consortium_members;
pub mod kpi_results;
pub mod milestones;
pub mod organizations;
pub mod policy_goals;
pub mod projects;
pub mod research_logs;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Project planning
        .route(
            "/api/project-planning",
            get(projects::list).post(projects::create),
        )
        .route(
            "/api/project-planning/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/api/project-planning/{id}/history", get(projects::history))
        // Organizations
        .route(
            "/api/organizations",
            get(organizations::list).post(organizations::create),
        )
        .route(
            "/api/organizations/{id}",
            get(organizations::get)
                .put(organizations::update)
                .delete(organizations::delete),
        )
        // Budgets
        .route("/api/budget-categories", get(budgets::categories))
        .route(
            "/api/budget-details",
            get(budgets::get_details).post(budgets::save_details),
        )
        // Consortium members
        .route(
            "/api/project-consortium-members",
            get(consortium_members::list)
                .post(consortium_members::create)
                .put(consortium_members::update)
                .delete(consortium_members::delete)
                .patch(consortium_members::copy_years),
        )
        // KPI results
        .route(
            "/api/kpi/results",
            get(kpi_results::list).post(kpi_results::create),
        )
        .route(
            "/api/kpi/results/{id}",
            get(kpi_results::get)
                .put(kpi_results::update)
                .delete(kpi_results::delete),
        )
        // Policy goals
        .route(
            "/api/policy-goals",
            get(policy_goals::list).post(policy_goals::create),
        )
        .route(
            "/api/policy-goals/{id}",
            put(policy_goals::update).delete(policy_goals::delete),
        )
        // Milestones
        .route(
            "/api/milestones",
            get(milestones::list).post(milestones::create),
        )
        .route(
            "/api/milestones/{id}",
            put(milestones::update).delete(milestones::delete),
        )
        // Research logs
        .route(
            "/api/research-logs",
            get(research_logs::list).post(research_logs::create),
        )
        .route(
            "/api/research-logs/{id}",
            get(research_logs::get)
                .put(research_logs::update)
                .delete(research_logs::delete),
        )
}
