//! Specflow Plan
//!
//! Turns a set of required roles into an [`ExecutionPlan`]: an ordered list of
//! steps, one per role, with dependency edges and scheduling phases.
//!
//! Key properties:
//! - Steps are in topological order w.r.t. the role catalog (no forward
//!   references in `depends_on`)
//! - The order is a pure function of the role *set* (input order is ignored)
//! - Ties are broken by canonical pipeline priority

mod error;
mod graph;
mod plan;
mod planner;

pub use error::PlanError;
pub use graph::RoleGraph;
pub use plan::{ExecutionPlan, ExecutionStep, Phase, StepId};
pub use planner::ExecutionPlanner;
