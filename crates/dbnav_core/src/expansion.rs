use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexSet;

use crate::flatten::Adjacency;
use crate::node::NodeId;

/// Result of reconciling one batch of expand/collapse requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The reconciled expanded set, in insertion order.
    pub expanded: IndexSet<NodeId>,

    /// Ids that were not expanded before this batch and are now, in the order
    /// they were added. Includes ids brought back from collapse memory.
    pub newly_revealed: Vec<NodeId>,

    /// The subset of `newly_revealed` that came from collapse memory rather
    /// than from the request itself.
    pub restored: HashSet<NodeId>,
}

impl ToggleOutcome {
    pub fn is_restored(&self, id: &NodeId) -> bool {
        self.restored.contains(id)
    }

    pub fn revealed_anything(&self) -> bool {
        !self.newly_revealed.is_empty()
    }
}

/// Expansion state of one navigator tree.
///
/// Holds the expanded ids and, for every collapsed node, which of its
/// descendants were open at the moment it closed. Both survive tree rebuilds;
/// only the adjacency passed to [`ExpansionState::apply_toggle`] changes.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: IndexSet<NodeId>,
    memory: HashMap<NodeId, IndexSet<NodeId>>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> &IndexSet<NodeId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Descendants remembered for a collapsed node, if it has a pending entry.
    pub fn remembered(&self, id: NodeId) -> Option<&IndexSet<NodeId>> {
        self.memory.get(&id)
    }

    /// Forgets all expansion state, including collapse memory.
    pub fn clear(&mut self) {
        self.expanded.clear();
        self.memory.clear();
    }

    /// Reconciles the complete set of ids the UI now reports as open.
    ///
    /// Ids that disappeared from the set are collapsed: their expanded
    /// descendants are remembered and every descendant is closed, whatever the
    /// request claimed. Open ids with remembered descendants get them back,
    /// cascading through restored ids that have entries of their own.
    ///
    /// Ids unknown to `adjacency` have no descendants and are kept as given.
    pub fn apply_toggle<I>(&mut self, adjacency: &Adjacency, requested: I) -> ToggleOutcome
    where
        I: IntoIterator<Item = NodeId>,
    {
        let requested: IndexSet<NodeId> = requested.into_iter().collect();
        let previous = std::mem::take(&mut self.expanded);
        let mut working = requested.clone();

        for &closing in &previous {
            if requested.contains(&closing) {
                continue;
            }

            let descendants = adjacency.descendants(closing);
            let still_open: IndexSet<NodeId> = descendants
                .iter()
                .filter(|id| previous.contains(*id))
                .copied()
                .collect();

            for id in &descendants {
                working.shift_remove(id);
            }

            self.memory.insert(closing, still_open);
        }

        // The worklist picks up restored ids, so their own entries are
        // consumed in this same pass.
        let mut restored = HashSet::new();
        let mut worklist: VecDeque<NodeId> = working.iter().copied().collect();

        while let Some(id) = worklist.pop_front() {
            let Some(remembered) = self.memory.remove(&id) else {
                continue;
            };

            for child in remembered {
                if working.insert(child) {
                    if !previous.contains(&child) {
                        restored.insert(child);
                    }
                    worklist.push_back(child);
                }
            }
        }

        let newly_revealed: Vec<NodeId> = working
            .iter()
            .filter(|id| !previous.contains(*id))
            .copied()
            .collect();

        log::debug!(
            "Reconciled expansion: {} -> {} expanded, {} revealed ({} restored), {} remembered",
            previous.len(),
            working.len(),
            newly_revealed.len(),
            restored.len(),
            self.memory.len()
        );

        self.expanded = working;

        ToggleOutcome {
            expanded: self.expanded.clone(),
            newly_revealed,
            restored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::node::TreeNode;

    fn id(n: usize) -> NodeId {
        NodeId::new(n)
    }

    fn ids(ns: &[usize]) -> Vec<NodeId> {
        ns.iter().copied().map(NodeId::new).collect()
    }

    fn set(ns: &[usize]) -> IndexSet<NodeId> {
        ids(ns).into_iter().collect()
    }

    /// A(0) -> B(1) -> C(2) -> D(3)
    fn chain() -> Vec<TreeNode<()>> {
        vec![TreeNode::branch(
            "A",
            (),
            vec![TreeNode::branch(
                "B",
                (),
                vec![TreeNode::branch("C", (), vec![TreeNode::branch("D", (), Vec::new())])],
            )],
        )]
    }

    #[test]
    fn test_expand_reports_revealed_ids_in_order() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();

        let outcome = state.apply_toggle(flat.adjacency(), ids(&[0, 1]));

        assert_eq!(outcome.expanded, set(&[0, 1]));
        assert_eq!(outcome.newly_revealed, ids(&[0, 1]));
        assert!(outcome.restored.is_empty());
    }

    #[test]
    fn test_noop_toggle_is_idempotent() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));

        let current: Vec<_> = state.expanded().iter().copied().collect();
        let outcome = state.apply_toggle(flat.adjacency(), current);

        assert_eq!(outcome.expanded, set(&[0, 1, 2]));
        assert!(outcome.newly_revealed.is_empty());
        assert!(!outcome.revealed_anything());
    }

    #[test]
    fn test_collapse_then_reopen_restores_subtree() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));

        let collapsed = state.apply_toggle(flat.adjacency(), ids(&[0]));
        assert_eq!(collapsed.expanded, set(&[0]));
        assert_eq!(state.remembered(id(1)), Some(&set(&[2])));

        let reopened = state.apply_toggle(flat.adjacency(), ids(&[0, 1]));
        assert_eq!(reopened.expanded, set(&[0, 1, 2]));
        assert_eq!(reopened.newly_revealed, ids(&[1, 2]));
        assert!(reopened.is_restored(&id(2)));
        assert!(!reopened.is_restored(&id(1)));
        assert!(state.remembered(id(1)).is_none());
    }

    #[test]
    fn test_collapse_removes_descendants_claimed_open() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));

        // The batch closes A but still lists B and C.
        let outcome = state.apply_toggle(flat.adjacency(), ids(&[1, 2]));

        assert!(outcome.expanded.is_empty());
        assert_eq!(state.remembered(id(0)), Some(&set(&[1, 2])));
    }

    #[test]
    fn test_deep_collapse_restores_every_level() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2, 3]));

        state.apply_toggle(flat.adjacency(), Vec::new());
        assert!(state.expanded().is_empty());

        let outcome = state.apply_toggle(flat.adjacency(), ids(&[0]));
        assert_eq!(outcome.expanded, set(&[0, 1, 2, 3]));
        assert_eq!(outcome.newly_revealed, ids(&[0, 1, 2, 3]));
    }

    #[test]
    fn test_independent_collapse_is_not_resurrected_by_ancestor() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2, 3]));

        // Close C on its own, then close and reopen A.
        state.apply_toggle(flat.adjacency(), ids(&[0, 1]));
        state.apply_toggle(flat.adjacency(), Vec::new());
        let reopened_a = state.apply_toggle(flat.adjacency(), ids(&[0]));

        assert_eq!(reopened_a.expanded, set(&[0, 1]));
        assert_eq!(state.remembered(id(2)), Some(&set(&[3])));

        let reopened_c = state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));
        assert_eq!(reopened_c.expanded, set(&[0, 1, 2, 3]));
        assert_eq!(reopened_c.newly_revealed, ids(&[2, 3]));
    }

    #[test]
    fn test_repeated_cycles_keep_restoring() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));

        for _ in 0..3 {
            state.apply_toggle(flat.adjacency(), ids(&[0]));
            let outcome = state.apply_toggle(flat.adjacency(), ids(&[0, 1]));
            assert_eq!(outcome.expanded, set(&[0, 1, 2]));
        }
    }

    #[test]
    fn test_unknown_ids_pass_through() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();

        let outcome = state.apply_toggle(flat.adjacency(), ids(&[0, 42]));
        assert_eq!(outcome.expanded, set(&[0, 42]));

        let outcome = state.apply_toggle(flat.adjacency(), ids(&[0]));
        assert_eq!(outcome.expanded, set(&[0]));
        assert_eq!(state.remembered(id(42)), Some(&IndexSet::new()));
    }

    #[test]
    fn test_clear_forgets_memory() {
        let nodes = chain();
        let flat = flatten(&nodes);
        let mut state = ExpansionState::new();
        state.apply_toggle(flat.adjacency(), ids(&[0, 1, 2]));
        state.apply_toggle(flat.adjacency(), ids(&[0]));

        state.clear();

        assert!(state.expanded().is_empty());
        assert!(state.remembered(id(1)).is_none());

        let outcome = state.apply_toggle(flat.adjacency(), ids(&[0, 1]));
        assert_eq!(outcome.expanded, set(&[0, 1]));
    }
}
