//! Execution events and notifiers.
//!
//! Events are emitted while a run progresses so callers can stream progress,
//! persist it, or ignore it.

use serde::{Deserialize, Serialize};
use specflow_plan::StepId;
use specflow_roles::RoleId;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::result::{OverallStatus, StepStatus};

/// Events emitted during a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// The run moved from pending to running.
  WorkflowStarted { run_id: Uuid, total_steps: usize },

  /// A step was handed to the executor.
  StepStarted {
    run_id: Uuid,
    step_id: StepId,
    role: RoleId,
  },

  /// A step resolved (successfully or not).
  StepFinished {
    run_id: Uuid,
    step_id: StepId,
    role: RoleId,
    status: StepStatus,
    error: Option<String>,
  },

  /// Every step resolved.
  WorkflowFinished {
    run_id: Uuid,
    status: OverallStatus,
    total_duration_ms: u64,
  },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` synchronously between steps, so implementations
/// should not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded: at most two events per step, and a slow consumer must never
  // stall the run.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
