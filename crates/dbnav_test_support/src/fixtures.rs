use dbnav_core::{Catalog, ConnectionInfo, DbKind, NodeId, TreeNode};

pub fn ids(ns: &[usize]) -> Vec<NodeId> {
    ns.iter().copied().map(NodeId::new).collect()
}

/// A single path of `depth` branches, named "level-0", "level-1", ...
/// The deepest branch has an empty children list. Ids run 0..depth.
pub fn chain(depth: usize) -> Vec<TreeNode<usize>> {
    let mut node: Option<TreeNode<usize>> = None;

    for level in (0..depth).rev() {
        let children = node.take().into_iter().collect();
        node = Some(TreeNode::branch(format!("level-{}", level), level, children));
    }

    node.into_iter().collect()
}

/// Two top-level branches with a mix of nested branches and leaves.
///
/// ```text
/// node-0 a
///   node-1 a1
///     node-2 a1x (leaf)
///     node-3 a1y
///       node-4 a1y-deep (leaf)
///   node-5 a2 (empty)
/// node-6 b
///   node-7 b1
///     node-8 b1x (leaf)
/// node-9 c (leaf)
/// ```
pub fn forest() -> Vec<TreeNode<&'static str>> {
    vec![
        TreeNode::branch(
            "a",
            "a",
            vec![
                TreeNode::branch(
                    "a1",
                    "a1",
                    vec![
                        TreeNode::leaf("a1x", "a1x"),
                        TreeNode::branch("a1y", "a1y", vec![TreeNode::leaf("a1y-deep", "a1y-deep")]),
                    ],
                ),
                TreeNode::branch("a2", "a2", Vec::new()),
            ],
        ),
        TreeNode::branch(
            "b",
            "b",
            vec![TreeNode::branch("b1", "b1", vec![TreeNode::leaf("b1x", "b1x")])],
        ),
        TreeNode::leaf("c", "c"),
    ]
}

pub fn postgres_connection(id: &str) -> ConnectionInfo {
    ConnectionInfo::new(id, format!("{} (postgres)", id), DbKind::Postgres)
}

pub fn sqlite_connection(id: &str) -> ConnectionInfo {
    ConnectionInfo::new(id, format!("{} (sqlite)", id), DbKind::Sqlite)
}

/// A postgres connection "pg" and a sqlite connection "lite", nothing loaded.
pub fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.set_connections(vec![postgres_connection("pg"), sqlite_connection("lite")]);
    catalog
}
