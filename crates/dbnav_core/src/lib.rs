mod catalog;
mod config;
mod error;
mod expansion;
mod flatten;
mod node;
mod tree_view;

pub use catalog::{Catalog, CatalogItem, ConnectionInfo, DbKind, LoadRequest, TableInfo};
pub use config::{ConfigStore, DEFAULT_INDENT, LoadPolicy, NavigatorConfig};
pub use error::NavError;
pub use expansion::{ExpansionState, ToggleOutcome};
pub use flatten::{Adjacency, FlatNode, FlatTree, flatten};
pub use node::{NodeId, ParseNodeIdError, ROOT_PARENT, TreeNode};
pub use tree_view::{RevealEvent, TreeView, VisibleRow};
