pub mod audit_event;
pub mod budget;
pub mod consortium_member;
pub mod kpi_result;
pub mod milestone;
pub mod organization;
pub mod policy_goal;
pub mod project;
pub mod research_log;
pub mod user;

pub use audit_event::AuditEvent;
pub use budget::{BudgetCategory, BudgetItem};
pub use consortium_member::ConsortiumMember;
pub use kpi_result::KpiResult;
pub use milestone::Milestone;
pub use organization::Organization;
pub use policy_goal::PolicyGoal;
pub use project::Project;
pub use research_log::ResearchLog;
pub use user::{RefreshToken, User};

/// `is_flag` value of a live row.
pub const ACTIVE: i16 = 1;
/// `is_flag` value of a soft-deleted row.
pub const DELETED: i16 = 0;
