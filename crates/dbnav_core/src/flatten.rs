use std::collections::HashMap;

use indexmap::IndexSet;

use crate::node::{NodeId, ROOT_PARENT, TreeNode};

/// A node of the nested tree, positioned in the flat render order.
#[derive(Debug)]
pub struct FlatNode<'a, P> {
    pub id: NodeId,

    /// 0 for top-level nodes.
    pub depth: usize,

    /// `None` means the node hangs off the synthetic root.
    pub parent_id: Option<NodeId>,

    /// Whether the source node carried a children list at all.
    pub has_children_field: bool,

    /// A children list is present and empty.
    pub is_empty_branch: bool,

    /// The node this record was derived from, for payload access.
    pub node: &'a TreeNode<P>,
}

impl<P> Clone for FlatNode<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for FlatNode<'_, P> {}

impl<'a, P> FlatNode<'a, P> {
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn payload(&self) -> &'a P {
        &self.node.payload
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Parent id as shown to a UI: the node id, or `ROOT` for top-level nodes.
    pub fn parent_label(&self) -> String {
        match self.parent_id {
            Some(id) => id.to_string(),
            None => ROOT_PARENT.to_string(),
        }
    }
}

/// Parent to ordered direct children, derived once per flatten pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    roots: Vec<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    pub(crate) fn push(&mut self, parent_id: Option<NodeId>, child: NodeId) {
        match parent_id {
            Some(parent) => self.children.entry(parent).or_default().push(child),
            None => self.roots.push(child),
        }
    }

    /// Top-level node ids, in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct children of `id`, in order. Empty for leaves, empty branches and
    /// ids this adjacency has never seen.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gets all descendant ids of `id` (children, grandchildren, etc.) in
    /// pre-order. `id` itself is not included.
    pub fn descendants(&self, id: NodeId) -> IndexSet<NodeId> {
        let mut descendants = IndexSet::new();
        let mut to_visit: Vec<NodeId> = self.children_of(id).iter().rev().copied().collect();

        while let Some(next) = to_visit.pop() {
            descendants.insert(next);
            to_visit.extend(self.children_of(next).iter().rev());
        }

        descendants
    }
}

/// Output of [`flatten`]: the pre-order node list plus its adjacency.
#[derive(Debug)]
pub struct FlatTree<'a, P> {
    nodes: Vec<FlatNode<'a, P>>,
    adjacency: Adjacency,
}

impl<'a, P> FlatTree<'a, P> {
    pub fn nodes(&self) -> &[FlatNode<'a, P>] {
        &self.nodes
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds a node by id. Ids from an older flatten pass that no longer exist
    /// resolve to `None`.
    pub fn get(&self, id: NodeId) -> Option<&FlatNode<'a, P>> {
        // Ids are dense pre-order indices.
        self.nodes.get(id.index()).filter(|n| n.id == id)
    }

    /// Nodes that should be rendered: top-level nodes and nodes whose parent
    /// is expanded according to `is_expanded`.
    pub fn visible<'s, F>(&'s self, is_expanded: F) -> impl Iterator<Item = &'s FlatNode<'a, P>>
    where
        F: Fn(NodeId) -> bool + 's,
    {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.is_none_or(|parent| is_expanded(parent)))
    }
}

/// Flattens a nested tree in pre-order, assigning sequential ids.
pub fn flatten<P>(nodes: &[TreeNode<P>]) -> FlatTree<'_, P> {
    let mut tree = FlatTree {
        nodes: Vec::new(),
        adjacency: Adjacency::default(),
    };

    walk(nodes, 0, None, &mut tree);
    tree
}

fn walk<'a, P>(
    nodes: &'a [TreeNode<P>],
    depth: usize,
    parent_id: Option<NodeId>,
    tree: &mut FlatTree<'a, P>,
) {
    for node in nodes {
        let id = NodeId::new(tree.nodes.len());

        tree.nodes.push(FlatNode {
            id,
            depth,
            parent_id,
            has_children_field: node.is_branch(),
            is_empty_branch: node.is_empty_branch(),
            node,
        });
        tree.adjacency.push(parent_id, id);

        if let Some(children) = &node.children {
            walk(children, depth + 1, Some(id), tree);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeNode<u32>> {
        // prod -> (public -> (users, orders), audit -> ()), scratch
        vec![
            TreeNode::branch(
                "prod",
                1,
                vec![
                    TreeNode::branch(
                        "public",
                        2,
                        vec![TreeNode::leaf("users", 3), TreeNode::leaf("orders", 4)],
                    ),
                    TreeNode::branch("audit", 5, Vec::new()),
                ],
            ),
            TreeNode::leaf("scratch", 6),
        ]
    }

    fn id(n: usize) -> NodeId {
        NodeId::new(n)
    }

    #[test]
    fn test_preorder_ids_depths_and_parents() {
        let nodes = sample();
        let flat = flatten(&nodes);

        let triples: Vec<_> = flat
            .nodes()
            .iter()
            .map(|n| (n.name(), n.id, n.depth, n.parent_id))
            .collect();

        assert_eq!(
            triples,
            vec![
                ("prod", id(0), 0, None),
                ("public", id(1), 1, Some(id(0))),
                ("users", id(2), 2, Some(id(1))),
                ("orders", id(3), 2, Some(id(1))),
                ("audit", id(4), 1, Some(id(0))),
                ("scratch", id(5), 0, None),
            ]
        );
    }

    #[test]
    fn test_branch_flags() {
        let nodes = sample();
        let flat = flatten(&nodes);

        let public = flat.get(id(1)).unwrap();
        assert!(public.has_children_field);
        assert!(!public.is_empty_branch);

        let audit = flat.get(id(4)).unwrap();
        assert!(audit.has_children_field);
        assert!(audit.is_empty_branch);

        let scratch = flat.get(id(5)).unwrap();
        assert!(!scratch.has_children_field);
        assert!(!scratch.is_empty_branch);
    }

    #[test]
    fn test_payload_passes_through() {
        let nodes = sample();
        let flat = flatten(&nodes);

        let payloads: Vec<u32> = flat.nodes().iter().map(|n| *n.payload()).collect();
        assert_eq!(payloads, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_adjacency() {
        let nodes = sample();
        let flat = flatten(&nodes);
        let adjacency = flat.adjacency();

        assert_eq!(adjacency.roots(), &[id(0), id(5)]);
        assert_eq!(adjacency.children_of(id(0)), &[id(1), id(4)]);
        assert_eq!(adjacency.children_of(id(1)), &[id(2), id(3)]);
        assert!(adjacency.children_of(id(4)).is_empty());
        assert!(adjacency.children_of(id(99)).is_empty());
    }

    #[test]
    fn test_descendants_are_preorder() {
        let nodes = sample();
        let flat = flatten(&nodes);

        let descendants: Vec<_> = flat.adjacency().descendants(id(0)).into_iter().collect();
        assert_eq!(descendants, vec![id(1), id(2), id(3), id(4)]);

        assert!(flat.adjacency().descendants(id(5)).is_empty());
        assert!(flat.adjacency().descendants(id(99)).is_empty());
    }

    #[test]
    fn test_ids_are_stable_across_passes() {
        let first = sample();
        let second = sample();

        let a: Vec<_> = flatten(&first)
            .nodes()
            .iter()
            .map(|n| (n.id, n.depth, n.parent_id))
            .collect();
        let b: Vec<_> = flatten(&second)
            .nodes()
            .iter()
            .map(|n| (n.id, n.depth, n.parent_id))
            .collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_get_rejects_out_of_range_ids() {
        let nodes = sample();
        let flat = flatten(&nodes);

        assert!(flat.get(id(5)).is_some());
        assert!(flat.get(id(6)).is_none());
    }

    #[test]
    fn test_visible_follows_parent_expansion() {
        let nodes = sample();
        let flat = flatten(&nodes);

        let collapsed: Vec<_> = flat.visible(|_| false).map(|n| n.id).collect();
        assert_eq!(collapsed, vec![id(0), id(5)]);

        let expanded = [id(0)];
        let visible: Vec<_> = flat
            .visible(|parent| expanded.contains(&parent))
            .map(|n| n.id)
            .collect();
        assert_eq!(visible, vec![id(0), id(1), id(4), id(5)]);
    }

    #[test]
    fn test_parent_label() {
        let nodes = sample();
        let flat = flatten(&nodes);

        assert_eq!(flat.get(id(0)).unwrap().parent_label(), "ROOT");
        assert_eq!(flat.get(id(2)).unwrap().parent_label(), "node-1");
    }

    #[test]
    fn test_empty_input() {
        let nodes: Vec<TreeNode<()>> = Vec::new();
        let flat = flatten(&nodes);

        assert!(flat.is_empty());
        assert!(flat.adjacency().roots().is_empty());
    }
}
