//! Exhaustive ordering checks over every role subset.

use std::collections::{BTreeMap, BTreeSet};

use specflow_config::ExecutionMode;
use specflow_plan::{ExecutionPlanner, PlanError};
use specflow_roles::{RoleCatalog, RoleId};

const MODES: [ExecutionMode; 3] = [
  ExecutionMode::Sequential,
  ExecutionMode::Parallel,
  ExecutionMode::Smart,
];

/// Every subset of the six roles, including the empty one.
fn all_subsets() -> Vec<Vec<RoleId>> {
  (0u32..(1u32 << RoleId::ALL.len()))
    .map(|mask| {
      RoleId::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1u32 << *i) != 0)
        .map(|(_, role)| *role)
        .collect()
    })
    .collect()
}

#[test]
fn test_every_plan_respects_role_dependencies() {
  let catalog = RoleCatalog::builtin();
  let planner = ExecutionPlanner::new(catalog.clone());

  for roles in all_subsets().into_iter().filter(|r| !r.is_empty()) {
    for mode in MODES {
      let plan = planner.build_plan("task", roles.clone(), mode).unwrap();

      assert_eq!(plan.steps.len(), roles.len());
      plan.validate().unwrap();

      // Every selected upstream role is scheduled before its dependents.
      let position: BTreeMap<RoleId, usize> = plan
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.role, i))
        .collect();
      for step in &plan.steps {
        for upstream in catalog.dependencies_of(step.role).unwrap() {
          if let Some(up_pos) = position.get(&upstream) {
            assert!(
              *up_pos < position[&step.role],
              "{upstream} must precede {} in {roles:?} ({mode})",
              step.role
            );
          }
        }
      }

      // No step depends on a later step.
      for (index, step) in plan.steps.iter().enumerate() {
        let earlier: BTreeSet<usize> = plan.steps[..index].iter().map(|s| s.id).collect();
        assert!(step.depends_on.is_subset(&earlier));
      }
    }
  }
}

#[test]
fn test_empty_subset_fails_in_every_mode() {
  let planner = ExecutionPlanner::new(RoleCatalog::builtin());
  for mode in MODES {
    assert_eq!(
      planner.build_plan("task", Vec::<RoleId>::new(), mode),
      Err(PlanError::EmptyRoleSet)
    );
  }
}

#[test]
fn test_every_plan_follows_canonical_order() {
  let planner = ExecutionPlanner::new(RoleCatalog::builtin());

  for roles in all_subsets().into_iter().filter(|r| !r.is_empty()) {
    for mode in MODES {
      let plan = planner.build_plan("task", roles.clone(), mode).unwrap();
      assert_eq!(plan.roles(), roles, "{mode}");
    }
  }
}

#[test]
fn test_smart_phases_group_by_depth() {
  let catalog = RoleCatalog::builtin();
  let planner = ExecutionPlanner::new(catalog.clone());

  for roles in all_subsets().into_iter().filter(|r| !r.is_empty()) {
    let plan = planner
      .build_plan("task", roles, ExecutionMode::Smart)
      .unwrap();

    let phase_of: BTreeMap<usize, usize> = plan
      .phases
      .iter()
      .flat_map(|p| p.step_ids.iter().map(move |id| (*id, p.index)))
      .collect();
    assert_eq!(phase_of.len(), plan.steps.len());

    for phase in &plan.phases {
      assert!(phase.step_ids.windows(2).all(|w| w[0] < w[1]));
    }

    // Every selected upstream role sits in an earlier phase.
    for step in &plan.steps {
      for upstream in &step.upstream_roles {
        let up = plan.step_for_role(*upstream).unwrap();
        assert!(phase_of[&up.id] < phase_of[&step.id]);
      }
    }
  }
}
