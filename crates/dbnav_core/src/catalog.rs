use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::NavError;
use crate::config::LoadPolicy;
use crate::node::TreeNode;
use crate::tree_view::RevealEvent;

/// Database engine behind a connection, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DbKind {
    Postgres,
    Mysql,
    Sqlite,
    Other(String),
}

impl DbKind {
    /// Whether tables are grouped under schemas in the navigator.
    pub fn has_schemas(&self) -> bool {
        matches!(self, DbKind::Postgres)
    }
}

impl From<String> for DbKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => DbKind::Postgres,
            "mysql" => DbKind::Mysql,
            "sqlite" => DbKind::Sqlite,
            _ => DbKind::Other(value),
        }
    }
}

impl From<DbKind> for String {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => "postgres".to_string(),
            DbKind::Mysql => "mysql".to_string(),
            DbKind::Sqlite => "sqlite".to_string(),
            DbKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DbKind,
}

impl ConnectionInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DbKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,

    #[serde(default)]
    pub schema: Option<String>,
}

/// Payload attached to every navigator node built from a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogItem {
    Connection {
        connection_id: String,
    },
    Schema {
        connection_id: String,
        schema: String,
    },
    Table {
        connection_id: String,
        schema: Option<String>,
        name: String,
    },
}

/// Children the navigator wants fetched after a reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Schemas {
        connection_id: String,
    },
    Tables {
        connection_id: String,
        schema: Option<String>,
    },
}

impl fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadRequest::Schemas { connection_id } => write!(f, "schemas of {}", connection_id),
            LoadRequest::Tables {
                connection_id,
                schema: Some(schema),
            } => write!(f, "tables of {}.{}", connection_id, schema),
            LoadRequest::Tables {
                connection_id,
                schema: None,
            } => write!(f, "tables of {}", connection_id),
        }
    }
}

/// Connections, schemas and tables known to the navigator so far.
///
/// Schemas and tables arrive lazily, in response to reveal events; the catalog
/// only records what it has been given and rebuilds the navigator tree from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    connections: Vec<ConnectionInfo>,

    /// Connection id to schema names, in server order.
    #[serde(default)]
    schemas: HashMap<String, Vec<String>>,

    /// Connection id to tables, in load order.
    #[serde(default)]
    tables: HashMap<String, Vec<TableInfo>>,

    /// (connection id, schema) pairs whose tables have been loaded, even if
    /// the load returned nothing.
    #[serde(default)]
    loaded_tables: HashSet<(String, Option<String>)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a catalog snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, NavError> {
        serde_json::from_str(json).map_err(|e| NavError::InvalidCatalog(e.to_string()))
    }

    pub fn connections(&self) -> &[ConnectionInfo] {
        &self.connections
    }

    pub fn connection(&self, connection_id: &str) -> Option<&ConnectionInfo> {
        self.connections.iter().find(|c| c.id == connection_id)
    }

    /// Replaces the connection list, dropping schemas and tables of
    /// connections that no longer exist.
    pub fn set_connections(&mut self, connections: Vec<ConnectionInfo>) {
        let ids: HashSet<&str> = connections.iter().map(|c| c.id.as_str()).collect();

        self.schemas.retain(|id, _| ids.contains(id.as_str()));
        self.tables.retain(|id, _| ids.contains(id.as_str()));
        self.loaded_tables
            .retain(|(id, _)| ids.contains(id.as_str()));

        self.connections = connections;
    }

    pub fn remove_connection(&mut self, connection_id: &str) -> Option<ConnectionInfo> {
        let pos = self.connections.iter().position(|c| c.id == connection_id)?;
        let removed = self.connections.remove(pos);

        self.schemas.remove(connection_id);
        self.tables.remove(connection_id);
        self.loaded_tables.retain(|(id, _)| id != connection_id);

        Some(removed)
    }

    pub fn schemas(&self, connection_id: &str) -> &[String] {
        self.schemas
            .get(connection_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tables(&self, connection_id: &str) -> &[TableInfo] {
        self.tables
            .get(connection_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replaces the schema list of a connection.
    pub fn set_schemas(&mut self, connection_id: &str, schemas: Vec<String>) -> Result<(), NavError> {
        self.require_connection(connection_id)?;
        self.schemas.insert(connection_id.to_string(), schemas);
        Ok(())
    }

    /// Adds tables loaded for a connection (and schema), skipping tables
    /// already known under the same schema. Returns how many were added.
    pub fn merge_tables(
        &mut self,
        connection_id: &str,
        schema: Option<&str>,
        names: Vec<String>,
    ) -> Result<usize, NavError> {
        self.require_connection(connection_id)?;
        if let Some(schema) = schema {
            self.require_schema(connection_id, schema)?;
        }

        let schema = schema.map(str::to_string);
        let existing = self.tables.entry(connection_id.to_string()).or_default();

        let mut added = 0;
        for name in names {
            let known = existing
                .iter()
                .any(|t| t.name == name && t.schema == schema);
            if !known {
                existing.push(TableInfo {
                    name,
                    schema: schema.clone(),
                });
                added += 1;
            }
        }

        self.loaded_tables
            .insert((connection_id.to_string(), schema));

        Ok(added)
    }

    /// Stores the result of a finished [`LoadRequest`].
    pub fn complete(&mut self, request: &LoadRequest, names: Vec<String>) -> Result<(), NavError> {
        match request {
            LoadRequest::Schemas { connection_id } => self.set_schemas(connection_id, names),
            LoadRequest::Tables {
                connection_id,
                schema,
            } => self
                .merge_tables(connection_id, schema.as_deref(), names)
                .map(|_| ()),
        }
    }

    /// Whether the children a request would fetch are already present.
    pub fn is_loaded(&self, request: &LoadRequest) -> bool {
        match request {
            LoadRequest::Schemas { connection_id } => self.schemas.contains_key(connection_id),
            LoadRequest::Tables {
                connection_id,
                schema,
            } => {
                self.loaded_tables
                    .contains(&(connection_id.clone(), schema.clone()))
                    || self
                        .tables(connection_id)
                        .iter()
                        .any(|t| &t.schema == schema)
            }
        }
    }

    /// Builds the navigator tree.
    ///
    /// Connections with schemas (once loaded) group their tables by schema;
    /// otherwise schema-less tables hang directly under the connection.
    /// Branches with nothing loaded yet are empty but still expandable.
    pub fn tree_nodes(&self) -> Vec<TreeNode<CatalogItem>> {
        self.connections
            .iter()
            .map(|connection| {
                let schemas = self.schemas(&connection.id);
                let tables = self.tables(&connection.id);

                let children = if connection.kind.has_schemas() && !schemas.is_empty() {
                    schemas
                        .iter()
                        .map(|schema| {
                            let schema_tables = tables
                                .iter()
                                .filter(|t| t.schema.as_deref() == Some(schema.as_str()))
                                .map(|t| table_node(&connection.id, t))
                                .collect();

                            TreeNode::branch(
                                schema.clone(),
                                CatalogItem::Schema {
                                    connection_id: connection.id.clone(),
                                    schema: schema.clone(),
                                },
                                schema_tables,
                            )
                        })
                        .collect()
                } else {
                    tables
                        .iter()
                        .filter(|t| t.schema.is_none())
                        .map(|t| table_node(&connection.id, t))
                        .collect()
                };

                TreeNode::branch(
                    connection.name.clone(),
                    CatalogItem::Connection {
                        connection_id: connection.id.clone(),
                    },
                    children,
                )
            })
            .collect()
    }

    /// Decides what to fetch for a revealed navigator node.
    ///
    /// Revealing a connection loads its schemas when it has them and its tables
    /// otherwise; revealing a schema loads its tables. Tables have nothing to
    /// load.
    pub fn plan_load(
        &self,
        event: &RevealEvent<'_, CatalogItem>,
        policy: LoadPolicy,
    ) -> Result<Option<LoadRequest>, NavError> {
        if policy == LoadPolicy::SkipRestored && event.restored {
            return Ok(None);
        }

        let request = match &event.node.payload {
            CatalogItem::Connection { connection_id } => {
                let connection = self.require_connection(connection_id)?;
                if connection.kind.has_schemas() {
                    LoadRequest::Schemas {
                        connection_id: connection_id.clone(),
                    }
                } else {
                    LoadRequest::Tables {
                        connection_id: connection_id.clone(),
                        schema: None,
                    }
                }
            }
            CatalogItem::Schema {
                connection_id,
                schema,
            } => {
                self.require_connection(connection_id)?;
                self.require_schema(connection_id, schema)?;
                LoadRequest::Tables {
                    connection_id: connection_id.clone(),
                    schema: Some(schema.clone()),
                }
            }
            CatalogItem::Table { .. } => return Ok(None),
        };

        if policy == LoadPolicy::WhenMissing && self.is_loaded(&request) {
            return Ok(None);
        }

        Ok(Some(request))
    }

    fn require_connection(&self, connection_id: &str) -> Result<&ConnectionInfo, NavError> {
        self.connection(connection_id)
            .ok_or_else(|| NavError::UnknownConnection(connection_id.to_string()))
    }

    /// Schemas can only be checked once the connection's schema list is known.
    fn require_schema(&self, connection_id: &str, schema: &str) -> Result<(), NavError> {
        match self.schemas.get(connection_id) {
            Some(schemas) if !schemas.iter().any(|s| s == schema) => {
                Err(NavError::UnknownSchema {
                    connection: connection_id.to_string(),
                    schema: schema.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn table_node(connection_id: &str, table: &TableInfo) -> TreeNode<CatalogItem> {
    TreeNode::leaf(
        table.name.clone(),
        CatalogItem::Table {
            connection_id: connection_id.to_string(),
            schema: table.schema.clone(),
            name: table.name.clone(),
        },
    )
}
