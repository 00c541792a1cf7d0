//! Specflow Engine
//!
//! This crate runs an [`ExecutionPlan`](specflow_plan::ExecutionPlan) to
//! completion and consolidates the step outputs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowEngine                         │
//! │  - run(plan, executor, context_sharing, cancel)             │
//! │  - steps run one at a time, in plan order                   │
//! │  - shared context is a left-to-right fold over outputs      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StepExecutor                           │
//! │  - TemplateExecutor: renders role documents                 │
//! │  - ScriptedExecutor: deterministic test double              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ResultConsolidator                       │
//! │  - consolidate(results) → summary text                      │
//! │  - overall_status(results) → completed / partial / failed   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Parallel" plans have no dependency edges, but the engine still executes
//! them one step at a time so that context accumulation stays deterministic.

mod consolidate;
mod context;
mod engine;
mod error;
mod events;
mod executor;
mod result;
mod template;

pub use consolidate::{NO_SUCCESSFUL_RESULTS, consolidate, overall_status};
pub use context::SharedContext;
pub use engine::{EngineConfig, WorkflowEngine};
pub use error::StepError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use executor::{RecordedCall, ScriptedExecutor, StepExecutor, StepOutcome};
pub use result::{OverallStatus, StepResult, StepStatus, WorkflowResult};
pub use template::TemplateExecutor;
