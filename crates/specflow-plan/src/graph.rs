use std::collections::{BTreeMap, BTreeSet};

use specflow_roles::{RoleCatalog, RoleError, RoleId};

/// Role dependency graph restricted to a set of selected roles.
#[derive(Debug, Clone)]
pub struct RoleGraph {
  /// Adjacency list: role -> downstream roles.
  adjacency: BTreeMap<RoleId, BTreeSet<RoleId>>,
  /// Reverse adjacency: role -> upstream roles.
  reverse_adjacency: BTreeMap<RoleId, BTreeSet<RoleId>>,
  /// Strict upstream roles that were not selected.
  absent_upstream: BTreeMap<RoleId, BTreeSet<RoleId>>,
}

impl RoleGraph {
  /// Build the graph for `selected` using the catalog's dependency table.
  pub fn new(catalog: &RoleCatalog, selected: &BTreeSet<RoleId>) -> Result<Self, RoleError> {
    let mut adjacency: BTreeMap<RoleId, BTreeSet<RoleId>> = BTreeMap::new();
    let mut reverse_adjacency: BTreeMap<RoleId, BTreeSet<RoleId>> = BTreeMap::new();
    let mut absent_upstream: BTreeMap<RoleId, BTreeSet<RoleId>> = BTreeMap::new();

    // Initialize all nodes
    for &role in selected {
      adjacency.entry(role).or_default();
      reverse_adjacency.entry(role).or_default();
      absent_upstream.entry(role).or_default();
    }

    for &role in selected {
      let descriptor = catalog.get(role)?;
      for &upstream in &descriptor.upstream_dependencies {
        if selected.contains(&upstream) {
          adjacency.entry(upstream).or_default().insert(role);
          reverse_adjacency.entry(role).or_default().insert(upstream);
        } else if !descriptor.aggregates_selected {
          absent_upstream.entry(role).or_default().insert(upstream);
        }
      }
    }

    Ok(Self {
      adjacency,
      reverse_adjacency,
      absent_upstream,
    })
  }

  /// Roles in the graph.
  pub fn roles(&self) -> impl Iterator<Item = RoleId> + '_ {
    self.adjacency.keys().copied()
  }

  /// Roles with no selected upstream.
  pub fn entry_points(&self) -> Vec<RoleId> {
    self
      .reverse_adjacency
      .iter()
      .filter(|(_, upstream)| upstream.is_empty())
      .map(|(role, _)| *role)
      .collect()
  }

  /// Selected roles that depend on `role`.
  pub fn downstream(&self, role: RoleId) -> BTreeSet<RoleId> {
    self.adjacency.get(&role).cloned().unwrap_or_default()
  }

  /// Selected roles `role` depends on.
  pub fn upstream(&self, role: RoleId) -> BTreeSet<RoleId> {
    self.reverse_adjacency.get(&role).cloned().unwrap_or_default()
  }

  /// Strict upstream roles of `role` that were not selected.
  pub fn absent_upstream(&self, role: RoleId) -> BTreeSet<RoleId> {
    self.absent_upstream.get(&role).cloned().unwrap_or_default()
  }

  /// Kahn's algorithm with a priority-ordered ready set.
  ///
  /// One role is placed at a time: the ready role with the lowest canonical
  /// priority goes next, whatever depth it sits at.
  pub fn topological_order(&self) -> Result<Vec<RoleId>, RoleError> {
    let mut in_degree: BTreeMap<RoleId, usize> = self
      .reverse_adjacency
      .iter()
      .map(|(role, upstream)| (*role, upstream.len()))
      .collect();

    let mut ready: BTreeSet<(usize, RoleId)> = in_degree
      .iter()
      .filter(|(_, degree)| **degree == 0)
      .map(|(role, _)| (role.priority(), *role))
      .collect();

    let mut order = Vec::with_capacity(in_degree.len());

    while let Some((_, role)) = ready.pop_first() {
      order.push(role);
      for downstream in self.downstream(role) {
        if let Some(degree) = in_degree.get_mut(&downstream) {
          *degree -= 1;
          if *degree == 0 {
            ready.insert((downstream.priority(), downstream));
          }
        }
      }
    }

    if order.len() != in_degree.len() {
      // Unplaced roles are on a cycle. A validated catalog never gets here.
      let stuck = in_degree
        .iter()
        .find(|(_, degree)| **degree > 0)
        .map(|(role, _)| role.to_string())
        .unwrap_or_default();
      return Err(RoleError::CycleDetected(stuck));
    }

    Ok(order)
  }

  /// Roles grouped by dependency depth.
  ///
  /// A role with no selected upstream has depth 0; any other role sits one
  /// past its deepest upstream. Each layer is sorted by canonical priority.
  pub fn layers(&self) -> Result<Vec<Vec<RoleId>>, RoleError> {
    let mut depth: BTreeMap<RoleId, usize> = BTreeMap::new();
    let mut layers: Vec<Vec<RoleId>> = Vec::new();

    for role in self.topological_order()? {
      let level = self
        .upstream(role)
        .iter()
        .filter_map(|up| depth.get(up))
        .map(|d| d + 1)
        .max()
        .unwrap_or(0);
      depth.insert(role, level);

      if layers.len() <= level {
        layers.resize_with(level + 1, Vec::new);
      }
      layers[level].push(role);
    }

    for layer in &mut layers {
      layer.sort_by_key(|role| role.priority());
    }

    Ok(layers)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn select(roles: &[RoleId]) -> BTreeSet<RoleId> {
    roles.iter().copied().collect()
  }

  #[test]
  fn test_full_pipeline_is_a_chain() {
    let catalog = RoleCatalog::builtin();
    let graph = RoleGraph::new(&catalog, &select(&RoleId::ALL)).unwrap();

    assert_eq!(graph.entry_points(), vec![RoleId::TaskManagement]);
    assert_eq!(graph.topological_order().unwrap(), RoleId::ALL.to_vec());
    assert_eq!(graph.layers().unwrap().len(), 6);
    assert_eq!(graph.upstream(RoleId::SpecCoordination).len(), 5);
  }

  #[test]
  fn test_missing_upstream_is_recorded() {
    let catalog = RoleCatalog::builtin();
    let graph = RoleGraph::new(&catalog, &select(&[RoleId::Requirements, RoleId::Coding])).unwrap();

    assert_eq!(
      graph.absent_upstream(RoleId::Coding),
      BTreeSet::from([RoleId::Design])
    );
    assert_eq!(
      graph.absent_upstream(RoleId::Requirements),
      BTreeSet::from([RoleId::TaskManagement])
    );
    assert_eq!(
      graph.layers().unwrap(),
      vec![vec![RoleId::Requirements, RoleId::Coding]]
    );
  }

  #[test]
  fn test_coordination_never_has_absent_upstream() {
    let catalog = RoleCatalog::builtin();
    let graph = RoleGraph::new(
      &catalog,
      &select(&[RoleId::Design, RoleId::SpecCoordination]),
    )
    .unwrap();

    assert!(graph.absent_upstream(RoleId::SpecCoordination).is_empty());
    assert_eq!(
      graph.upstream(RoleId::SpecCoordination),
      BTreeSet::from([RoleId::Design])
    );
  }

  #[test]
  fn test_order_breaks_ties_across_depths() {
    let catalog = RoleCatalog::builtin();
    let graph = RoleGraph::new(
      &catalog,
      &select(&[RoleId::Testing, RoleId::TaskManagement, RoleId::Requirements]),
    )
    .unwrap();

    // testing has no selected upstream but still waits behind requirements
    assert_eq!(
      graph.topological_order().unwrap(),
      vec![RoleId::TaskManagement, RoleId::Requirements, RoleId::Testing]
    );
    assert_eq!(
      graph.layers().unwrap(),
      vec![
        vec![RoleId::TaskManagement, RoleId::Testing],
        vec![RoleId::Requirements]
      ]
    );
  }

  #[test]
  fn test_order_with_gap_in_chain() {
    let catalog = RoleCatalog::builtin();
    let graph = RoleGraph::new(
      &catalog,
      &select(&[RoleId::Design, RoleId::Testing, RoleId::Requirements]),
    )
    .unwrap();

    assert_eq!(
      graph.topological_order().unwrap(),
      vec![RoleId::Requirements, RoleId::Design, RoleId::Testing]
    );
  }
}
