//! Execution planner.
//!
//! The planner resolves roles through an injected [`RoleCatalog`], orders them
//! with a priority-ordered Kahn's algorithm, and shapes the steps according to
//! the requested [`ExecutionMode`].

use std::collections::{BTreeMap, BTreeSet};

use specflow_config::ExecutionMode;
use specflow_roles::{RoleCatalog, RoleId};
use tracing::{info, instrument};

use crate::error::PlanError;
use crate::graph::RoleGraph;
use crate::plan::{ExecutionPlan, ExecutionStep, Phase, StepId};

/// Builds execution plans from role sets.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanner {
  catalog: RoleCatalog,
}

impl ExecutionPlanner {
  pub fn new(catalog: RoleCatalog) -> Self {
    Self { catalog }
  }

  pub fn catalog(&self) -> &RoleCatalog {
    &self.catalog
  }

  /// Build a plan for `required_roles`.
  ///
  /// Duplicate roles and input ordering are ignored. A role whose strict
  /// upstream is not required is still scheduled; its `absent_upstream`
  /// names the missing roles.
  #[instrument(name = "build_plan", skip_all, fields(mode = %mode))]
  pub fn build_plan(
    &self,
    task_text: &str,
    required_roles: impl IntoIterator<Item = RoleId>,
    mode: ExecutionMode,
  ) -> Result<ExecutionPlan, PlanError> {
    let selected: BTreeSet<RoleId> = required_roles.into_iter().collect();
    if selected.is_empty() {
      return Err(PlanError::EmptyRoleSet);
    }

    // Fails with UnknownRole before any ordering work.
    self.catalog.roles_for(&selected)?;

    let graph = RoleGraph::new(&self.catalog, &selected)?;
    let order = graph.topological_order()?;

    let steps: Vec<ExecutionStep> = order
      .iter()
      .enumerate()
      .map(|(index, role)| {
        let id: StepId = index + 1;
        let depends_on = match mode {
          ExecutionMode::Parallel => BTreeSet::new(),
          ExecutionMode::Sequential | ExecutionMode::Smart if index == 0 => BTreeSet::new(),
          ExecutionMode::Sequential | ExecutionMode::Smart => BTreeSet::from([id - 1]),
        };

        ExecutionStep {
          id,
          role: *role,
          depends_on,
          upstream_roles: graph.upstream(*role),
          input_context: task_text.to_string(),
          absent_upstream: graph.absent_upstream(*role),
        }
      })
      .collect();

    let phases = match mode {
      ExecutionMode::Sequential => steps
        .iter()
        .enumerate()
        .map(|(index, step)| Phase {
          index,
          step_ids: vec![step.id],
        })
        .collect(),
      ExecutionMode::Parallel => vec![Phase {
        index: 0,
        step_ids: steps.iter().map(|s| s.id).collect(),
      }],
      ExecutionMode::Smart => {
        // Depth tiers need not be contiguous in step order.
        let ids: BTreeMap<RoleId, StepId> = steps.iter().map(|s| (s.role, s.id)).collect();
        graph
          .layers()?
          .iter()
          .enumerate()
          .map(|(index, layer)| {
            let mut step_ids: Vec<StepId> =
              layer.iter().filter_map(|role| ids.get(role).copied()).collect();
            step_ids.sort_unstable();
            Phase { index, step_ids }
          })
          .collect()
      }
    };

    let plan = ExecutionPlan {
      task_text: task_text.to_string(),
      mode,
      steps,
      phases,
    };
    plan.validate()?;

    info!(
      steps = plan.steps.len(),
      phases = plan.phases.len(),
      roles = ?plan.roles(),
      "plan_built"
    );

    Ok(plan)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use specflow_roles::{RoleDescriptor, RoleError};

  const TASK: &str = "build a user authentication system with JWT";

  fn planner() -> ExecutionPlanner {
    ExecutionPlanner::new(RoleCatalog::builtin())
  }

  #[test]
  fn test_requirements_and_design_sequential() {
    let plan = planner()
      .build_plan(
        TASK,
        [RoleId::Requirements, RoleId::Design],
        ExecutionMode::Sequential,
      )
      .unwrap();

    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.steps[0].role, RoleId::Requirements);
    assert_eq!(plan.steps[1].role, RoleId::Design);
    assert!(plan.steps[0].depends_on.is_empty());
    assert_eq!(plan.steps[1].depends_on, BTreeSet::from([plan.steps[0].id]));
    assert_eq!(plan.phases.len(), 2);
    assert_eq!(
      plan.steps[1].upstream_roles,
      BTreeSet::from([RoleId::Requirements])
    );
  }

  #[test]
  fn test_empty_role_set_fails() {
    let result = planner().build_plan(TASK, Vec::<RoleId>::new(), ExecutionMode::Smart);
    assert_eq!(result, Err(PlanError::EmptyRoleSet));
  }

  #[test]
  fn test_order_ignores_input_order() {
    let forward = planner()
      .build_plan(TASK, RoleId::ALL, ExecutionMode::Sequential)
      .unwrap();
    let mut reversed_roles = RoleId::ALL;
    reversed_roles.reverse();
    let reversed = planner()
      .build_plan(TASK, reversed_roles, ExecutionMode::Sequential)
      .unwrap();

    assert_eq!(forward, reversed);
    assert_eq!(forward.roles(), RoleId::ALL.to_vec());
  }

  #[test]
  fn test_parallel_has_no_edges() {
    let plan = planner()
      .build_plan(TASK, RoleId::CORE, ExecutionMode::Parallel)
      .unwrap();

    assert_eq!(plan.steps.len(), 5);
    assert!(plan.steps.iter().all(|s| s.depends_on.is_empty()));
    assert_eq!(plan.phases.len(), 1);
    assert_eq!(plan.phases[0].step_ids, vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn test_smart_merges_independent_roles() {
    let plan = planner()
      .build_plan(
        TASK,
        [RoleId::Testing, RoleId::Requirements, RoleId::Coding],
        ExecutionMode::Smart,
      )
      .unwrap();

    // requirements and coding share no data dependency (design is absent)
    assert_eq!(
      plan.roles(),
      vec![RoleId::Requirements, RoleId::Coding, RoleId::Testing]
    );
    assert_eq!(plan.phases.len(), 2);
    assert_eq!(plan.phases[0].step_ids, vec![1, 2]);
    assert_eq!(plan.phases[1].step_ids, vec![3]);

    // smart still chains dependencies linearly
    assert_eq!(plan.steps[1].depends_on, BTreeSet::from([1]));
    assert_eq!(plan.steps[2].depends_on, BTreeSet::from([2]));
  }

  #[test]
  fn test_shallow_role_waits_for_higher_priority_chain() {
    let plan = planner()
      .build_plan(
        TASK,
        [RoleId::TaskManagement, RoleId::Requirements, RoleId::Testing],
        ExecutionMode::Smart,
      )
      .unwrap();

    assert_eq!(
      plan.roles(),
      vec![RoleId::TaskManagement, RoleId::Requirements, RoleId::Testing]
    );
    // testing shares the first depth tier with task-management
    assert_eq!(plan.phases.len(), 2);
    assert_eq!(plan.phases[0].step_ids, vec![1, 3]);
    assert_eq!(plan.phases[1].step_ids, vec![2]);
    assert_eq!(plan.steps[2].depends_on, BTreeSet::from([2]));
  }

  #[test]
  fn test_sequential_order_with_gap_in_chain() {
    let plan = planner()
      .build_plan(
        TASK,
        [RoleId::Testing, RoleId::Design, RoleId::Requirements],
        ExecutionMode::Sequential,
      )
      .unwrap();

    assert_eq!(
      plan.roles(),
      vec![RoleId::Requirements, RoleId::Design, RoleId::Testing]
    );
  }

  #[test]
  fn test_absent_upstream_falls_back_to_task_text() {
    let plan = planner()
      .build_plan(TASK, [RoleId::Coding], ExecutionMode::Sequential)
      .unwrap();

    let step = &plan.steps[0];
    assert_eq!(step.absent_upstream, BTreeSet::from([RoleId::Design]));
    assert_eq!(step.input_context, TASK);
    assert!(step.upstream_roles.is_empty());
  }

  #[test]
  fn test_unknown_role_in_custom_catalog() {
    let catalog = RoleCatalog::from_descriptors(vec![RoleDescriptor::new(
      RoleId::Requirements,
      "requirements only",
      &[],
      &[],
    )])
    .unwrap();

    let result = ExecutionPlanner::new(catalog).build_plan(
      TASK,
      [RoleId::Requirements, RoleId::Testing],
      ExecutionMode::Sequential,
    );
    assert_eq!(
      result,
      Err(PlanError::Role(RoleError::UnknownRole("testing".to_string())))
    );
  }
}
