use std::fmt;
use std::str::FromStr;

const NODE_ID_PREFIX: &str = "node-";

/// Display form of the synthetic parent shared by all top-level nodes.
pub const ROOT_PARENT: &str = "ROOT";

/// Identity of a node within one flatten pass.
///
/// Ids are handed out in pre-order, so the same tree shape always produces the
/// same ids. The string form (`node-<n>`) is what a UI reports back when the
/// user opens or closes items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in pre-order traversal.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, self.0)
    }
}

/// Error returned when parsing a `NodeId` from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeIdError {
    pub input: String,
}

impl fmt::Display for ParseNodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid node id: {:?}", self.input)
    }
}

impl std::error::Error for ParseNodeIdError {}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNodeIdError {
            input: s.to_string(),
        };

        let digits = s.strip_prefix(NODE_ID_PREFIX).ok_or_else(err)?;

        // usize::from_str accepts a leading '+', which Display never produces.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        digits.parse().map(Self).map_err(|_| err())
    }
}

/// A node of the nested tree handed to the navigator.
///
/// `children` distinguishes a leaf (`None`, never expandable) from a branch
/// whose children are not known yet or are genuinely empty (`Some(vec![])`).
/// The payload is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<P> {
    /// Display label. Not used as identity.
    pub name: String,

    pub children: Option<Vec<TreeNode<P>>>,

    /// Render hint: the item is shown but cannot be activated.
    pub disabled: bool,

    pub payload: P,
}

impl<P> TreeNode<P> {
    /// Creates a leaf node.
    pub fn leaf(name: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            children: None,
            disabled: false,
            payload,
        }
    }

    /// Creates a branch node. An empty `children` vector still makes the node
    /// expandable.
    pub fn branch(name: impl Into<String>, payload: P, children: Vec<TreeNode<P>>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
            disabled: false,
            payload,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns `true` if a children list is present, even an empty one.
    pub fn is_branch(&self) -> bool {
        self.children.is_some()
    }

    /// Returns `true` for a branch whose children list is present but empty.
    pub fn is_empty_branch(&self) -> bool {
        self.children.as_ref().is_some_and(|c| c.is_empty())
    }
}
