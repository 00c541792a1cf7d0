//! Specflow Orchestrator
//!
//! The single entry point the surrounding tool layer calls. An
//! [`OrchestrationRequest`] goes through:
//!
//! 1. role parsing and input checks
//! 2. classification ([`TaskClassifier`](specflow_classifier::TaskClassifier))
//! 3. planning and optional truncation
//! 4. execution ([`WorkflowEngine`](specflow_engine::WorkflowEngine))
//! 5. document persistence when a project path is given
//!
//! and comes back as an [`OrchestrationOutcome`].

mod error;
mod orchestrator;
mod request;

pub use error::OrchestrationError;
pub use orchestrator::Orchestrator;
pub use request::{DocumentRecord, OrchestrationOutcome, OrchestrationRequest};
