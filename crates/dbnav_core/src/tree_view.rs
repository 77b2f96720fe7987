use indexmap::IndexSet;

use crate::config::{DEFAULT_INDENT, NavigatorConfig};
use crate::expansion::{ExpansionState, ToggleOutcome};
use crate::flatten::FlatTree;
use crate::node::{NodeId, TreeNode};

/// A node that became expanded, handed to the caller so it can start loading
/// the node's children.
#[derive(Debug)]
pub struct RevealEvent<'a, P> {
    pub id: NodeId,
    pub node: &'a TreeNode<P>,
    pub depth: usize,

    /// The node came back from collapse memory instead of being opened by the
    /// user directly.
    pub restored: bool,
}

impl<P> Clone for RevealEvent<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RevealEvent<'_, P> {}

/// One rendered line of the navigator.
#[derive(Debug)]
pub struct VisibleRow<'a, P> {
    pub id: NodeId,
    pub node: &'a TreeNode<P>,
    pub depth: usize,

    /// `depth * indent`.
    pub indent: usize,

    pub expandable: bool,
    pub expanded: bool,
    pub disabled: bool,

    /// Expanded branch with no children: the renderer shows its empty state.
    pub show_empty_state: bool,
}

impl<'a, P> VisibleRow<'a, P> {
    pub fn name(&self) -> &'a str {
        &self.node.name
    }
}

/// Expansion state plus the interactions a navigator widget needs.
///
/// The caller keeps one `TreeView` per tree for as long as the widget lives and
/// passes the freshly flattened tree into every call.
#[derive(Debug, Clone)]
pub struct TreeView {
    state: ExpansionState,
    indent: usize,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl TreeView {
    pub fn new(indent: usize) -> Self {
        Self {
            state: ExpansionState::new(),
            indent,
        }
    }

    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(config.indent)
    }

    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.state.is_expanded(id)
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.state.expanded().iter().copied()
    }

    /// Forgets all expansion state.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// Applies the complete set of ids the UI reports as open.
    ///
    /// Requests for nodes the current tree knows to be leaves are dropped.
    /// Every newly revealed node found in `flat` is passed to `on_reveal`
    /// once; revealed ids that no longer resolve are skipped.
    pub fn handle_expand<'a, P, I, F>(
        &mut self,
        flat: &FlatTree<'a, P>,
        requested: I,
        mut on_reveal: F,
    ) -> ToggleOutcome
    where
        I: IntoIterator<Item = NodeId>,
        F: FnMut(RevealEvent<'a, P>),
    {
        let requested: Vec<NodeId> = requested
            .into_iter()
            .filter(|id| match flat.get(*id) {
                Some(node) if !node.has_children_field => {
                    log::debug!("Ignoring expand request for leaf {}", id);
                    false
                }
                _ => true,
            })
            .collect();

        let outcome = self.state.apply_toggle(flat.adjacency(), requested);

        for &id in &outcome.newly_revealed {
            let Some(flat_node) = flat.get(id) else {
                log::debug!("Revealed {} is not part of the current tree", id);
                continue;
            };

            on_reveal(RevealEvent {
                id,
                node: flat_node.node,
                depth: flat_node.depth,
                restored: outcome.is_restored(&id),
            });
        }

        outcome
    }

    /// Flips a single node, as a click on its trigger would.
    pub fn toggle<'a, P, F>(&mut self, flat: &FlatTree<'a, P>, id: NodeId, on_reveal: F) -> ToggleOutcome
    where
        F: FnMut(RevealEvent<'a, P>),
    {
        let open = !self.state.is_expanded(id);
        self.set_expanded(flat, id, open, on_reveal)
    }

    pub fn expand<'a, P, F>(&mut self, flat: &FlatTree<'a, P>, id: NodeId, on_reveal: F) -> ToggleOutcome
    where
        F: FnMut(RevealEvent<'a, P>),
    {
        self.set_expanded(flat, id, true, on_reveal)
    }

    pub fn collapse<'a, P>(&mut self, flat: &FlatTree<'a, P>, id: NodeId) -> ToggleOutcome {
        // Collapsing never reveals anything.
        self.set_expanded(flat, id, false, |_| {})
    }

    fn set_expanded<'a, P, F>(
        &mut self,
        flat: &FlatTree<'a, P>,
        id: NodeId,
        open: bool,
        on_reveal: F,
    ) -> ToggleOutcome
    where
        F: FnMut(RevealEvent<'a, P>),
    {
        let mut requested: IndexSet<NodeId> = self.state.expanded().clone();
        if open {
            requested.insert(id);
        } else {
            requested.shift_remove(&id);
        }

        self.handle_expand(flat, requested, on_reveal)
    }

    /// The rows to render, in order.
    pub fn rows<'a, P>(&self, flat: &FlatTree<'a, P>) -> Vec<VisibleRow<'a, P>> {
        flat.visible(|parent| self.state.is_expanded(parent))
            .map(|flat_node| {
                let expanded = self.state.is_expanded(flat_node.id);
                VisibleRow {
                    id: flat_node.id,
                    node: flat_node.node,
                    depth: flat_node.depth,
                    indent: flat_node.depth * self.indent,
                    expandable: flat_node.has_children_field,
                    expanded,
                    disabled: flat_node.node.disabled,
                    show_empty_state: flat_node.is_empty_branch && expanded,
                }
            })
            .collect()
    }
}
