pub mod audit;
pub mod budgets;
pub mod consortium_members;
pub mod kpi_results;
pub mod milestones;
pub mod organizations;
pub mod policy_goals;
pub mod projects;
pub mod refresh_tokens;
pub mod research_logs;
pub mod users;
