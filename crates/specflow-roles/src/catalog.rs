use std::collections::{BTreeMap, BTreeSet};

use crate::error::RoleError;
use crate::role::{RoleDescriptor, RoleId};

/// Read-only registry of known roles.
///
/// Built once and shared by reference; there are no mutation methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
  roles: BTreeMap<RoleId, RoleDescriptor>,
}

impl RoleCatalog {
  /// The built-in role table.
  ///
  /// ```text
  /// task-management -> requirements -> design -> coding -> testing
  /// spec-coordination <- every other selected role
  /// ```
  pub fn builtin() -> Self {
    let descriptors = vec![
      RoleDescriptor::new(
        RoleId::TaskManagement,
        "Break the work into tracked, prioritized tasks with owners and milestones",
        &["task-breakdown", "estimation", "milestones"],
        &[],
      ),
      RoleDescriptor::new(
        RoleId::Requirements,
        "Capture user stories, functional requirements and acceptance criteria",
        &["user-stories", "acceptance-criteria", "scope"],
        &[RoleId::TaskManagement],
      ),
      RoleDescriptor::new(
        RoleId::Design,
        "Describe the architecture, components, interfaces and data model",
        &["architecture", "interfaces", "data-model"],
        &[RoleId::Requirements],
      ),
      RoleDescriptor::new(
        RoleId::Coding,
        "Lay out the implementation plan, module structure and coding conventions",
        &["implementation", "module-layout", "conventions"],
        &[RoleId::Design],
      ),
      RoleDescriptor::new(
        RoleId::Testing,
        "Define the test strategy, test cases and quality gates",
        &["test-strategy", "test-cases", "quality-gates"],
        &[RoleId::Coding],
      ),
      RoleDescriptor::new(
        RoleId::SpecCoordination,
        "Reconcile the other documents into one consistent specification",
        &["consistency-review", "traceability", "summary"],
        &[
          RoleId::TaskManagement,
          RoleId::Requirements,
          RoleId::Design,
          RoleId::Coding,
          RoleId::Testing,
        ],
      )
      .aggregating(),
    ];

    Self {
      roles: descriptors.into_iter().map(|d| (d.id, d)).collect(),
    }
  }

  /// Build a custom catalog.
  ///
  /// Rejects duplicate ids, dependencies on roles missing from the table, and
  /// dependency cycles.
  pub fn from_descriptors(
    descriptors: impl IntoIterator<Item = RoleDescriptor>,
  ) -> Result<Self, RoleError> {
    let mut roles = BTreeMap::new();
    for descriptor in descriptors {
      let id = descriptor.id;
      if roles.insert(id, descriptor).is_some() {
        return Err(RoleError::DuplicateRole(id.to_string()));
      }
    }

    for descriptor in roles.values() {
      for upstream in &descriptor.upstream_dependencies {
        if !roles.contains_key(upstream) {
          return Err(RoleError::UnknownRole(upstream.to_string()));
        }
      }
    }

    detect_cycle(&roles)?;

    Ok(Self { roles })
  }

  /// Look up a single role.
  pub fn get(&self, id: RoleId) -> Result<&RoleDescriptor, RoleError> {
    self
      .roles
      .get(&id)
      .ok_or_else(|| RoleError::UnknownRole(id.to_string()))
  }

  /// Resolve a set of ids to descriptors, in canonical pipeline order.
  pub fn roles_for<'a>(
    &self,
    ids: impl IntoIterator<Item = &'a RoleId>,
  ) -> Result<Vec<RoleDescriptor>, RoleError> {
    let unique: BTreeSet<RoleId> = ids.into_iter().copied().collect();
    unique
      .into_iter()
      .map(|id| self.get(id).cloned())
      .collect()
  }

  /// Upstream dependencies of a role.
  pub fn dependencies_of(&self, id: RoleId) -> Result<BTreeSet<RoleId>, RoleError> {
    Ok(self.get(id)?.upstream_dependencies.clone())
  }

  /// Whether the catalog knows the role.
  pub fn contains(&self, id: RoleId) -> bool {
    self.roles.contains_key(&id)
  }

  /// All roles, in canonical pipeline order.
  pub fn iter(&self) -> impl Iterator<Item = &RoleDescriptor> {
    self.roles.values()
  }

  pub fn len(&self) -> usize {
    self.roles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.roles.is_empty()
  }
}

impl Default for RoleCatalog {
  fn default() -> Self {
    Self::builtin()
  }
}

/// Check for cycles using DFS with three-color marking.
fn detect_cycle(roles: &BTreeMap<RoleId, RoleDescriptor>) -> Result<(), RoleError> {
  #[derive(Clone, Copy, PartialEq)]
  enum Mark {
    Unvisited,
    InProgress,
    Done,
  }

  fn visit(
    id: RoleId,
    roles: &BTreeMap<RoleId, RoleDescriptor>,
    marks: &mut BTreeMap<RoleId, Mark>,
  ) -> Result<(), RoleError> {
    marks.insert(id, Mark::InProgress);

    if let Some(descriptor) = roles.get(&id) {
      for &upstream in &descriptor.upstream_dependencies {
        match marks.get(&upstream).copied().unwrap_or(Mark::Unvisited) {
          // Back edge
          Mark::InProgress => return Err(RoleError::CycleDetected(upstream.to_string())),
          Mark::Unvisited => visit(upstream, roles, marks)?,
          Mark::Done => {}
        }
      }
    }

    marks.insert(id, Mark::Done);
    Ok(())
  }

  let mut marks: BTreeMap<RoleId, Mark> = roles.keys().map(|id| (*id, Mark::Unvisited)).collect();
  for &id in roles.keys() {
    if marks.get(&id) == Some(&Mark::Unvisited) {
      visit(id, roles, &mut marks)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_has_all_roles() {
    let catalog = RoleCatalog::builtin();
    assert_eq!(catalog.len(), 6);
    for id in RoleId::ALL {
      assert!(catalog.contains(id), "missing {id}");
    }
  }

  #[test]
  fn test_builtin_dependency_chain() {
    let catalog = RoleCatalog::builtin();
    assert!(catalog.dependencies_of(RoleId::TaskManagement).unwrap().is_empty());
    assert_eq!(
      catalog.dependencies_of(RoleId::Design).unwrap(),
      BTreeSet::from([RoleId::Requirements])
    );
    assert_eq!(
      catalog.dependencies_of(RoleId::Testing).unwrap(),
      BTreeSet::from([RoleId::Coding])
    );

    let coordination = catalog.get(RoleId::SpecCoordination).unwrap();
    assert!(coordination.aggregates_selected);
    assert_eq!(coordination.upstream_dependencies.len(), 5);
  }

  #[test]
  fn test_roles_for_returns_canonical_order() {
    let catalog = RoleCatalog::builtin();
    let roles = catalog
      .roles_for(&[RoleId::Testing, RoleId::Requirements, RoleId::Testing])
      .unwrap();

    let ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![RoleId::Requirements, RoleId::Testing]);
  }

  #[test]
  fn test_roles_for_unknown_role() {
    let catalog = RoleCatalog::from_descriptors(vec![RoleDescriptor::new(
      RoleId::Requirements,
      "requirements only",
      &[],
      &[],
    )])
    .unwrap();

    let result = catalog.roles_for(&[RoleId::Requirements, RoleId::Design]);
    assert_eq!(result, Err(RoleError::UnknownRole("design".to_string())));
  }

  #[test]
  fn test_from_descriptors_rejects_duplicates() {
    let result = RoleCatalog::from_descriptors(vec![
      RoleDescriptor::new(RoleId::Design, "a", &[], &[]),
      RoleDescriptor::new(RoleId::Design, "b", &[], &[]),
    ]);
    assert_eq!(result, Err(RoleError::DuplicateRole("design".to_string())));
  }

  #[test]
  fn test_from_descriptors_rejects_missing_dependency() {
    let result = RoleCatalog::from_descriptors(vec![RoleDescriptor::new(
      RoleId::Design,
      "design",
      &[],
      &[RoleId::Requirements],
    )]);
    assert_eq!(
      result,
      Err(RoleError::UnknownRole("requirements".to_string()))
    );
  }

  #[test]
  fn test_from_descriptors_rejects_cycle() {
    let result = RoleCatalog::from_descriptors(vec![
      RoleDescriptor::new(RoleId::Design, "design", &[], &[RoleId::Coding]),
      RoleDescriptor::new(RoleId::Coding, "coding", &[], &[RoleId::Design]),
    ]);
    assert!(matches!(result, Err(RoleError::CycleDetected(_))));
  }
}
