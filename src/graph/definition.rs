use super::ParamValue;
use crate::error::{InputError, InterchangeError};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed, versioned unit of work inside a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub version: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
        version: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            version,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Returns the parameter only if it carries a non-empty value.
    pub fn filled_parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name).filter(|value| !value.is_empty())
    }
}

/// A directed edge between two nodes, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<String>,
}

impl Connection {
    pub fn new(from_node_id: impl Into<String>, to_node_id: impl Into<String>) -> Self {
        Self {
            from_node_id: from_node_id.into(),
            to_node_id: to_node_id.into(),
            from_port: None,
            to_port: None,
        }
    }

    pub fn with_ports(mut self, from_port: impl Into<String>, to_port: impl Into<String>) -> Self {
        self.from_port = Some(from_port.into());
        self.to_port = Some(to_port.into());
        self
    }
}

/// A named automation graph: nodes in presentation order plus the connections between them.
///
/// Cycles are allowed. Node ids are expected to be unique and every connection is expected
/// to reference existing nodes, but neither is enforced here; reporting and repairing those
/// defects is the job of the validator and the fixer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Shorthand for a connection between the default ports of two nodes.
    pub fn connect(self, from_node_id: &str, to_node_id: &str) -> Self {
        self.with_connection(Connection::new(from_node_id, to_node_id))
    }

    /// Parses the crate's native JSON representation.
    pub fn from_json(json: &str) -> Result<Self, InterchangeError> {
        serde_json::from_str(json).map_err(|e| InterchangeError::JsonParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, InterchangeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InterchangeError::SerializeError(e.to_string()))
    }

    /// Position of the first node carrying `node_id`.
    pub fn node_index(&self, node_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_ids(&self) -> AHashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Number of outgoing connections per source node id.
    pub fn out_degrees(&self) -> AHashMap<&str, usize> {
        let mut degrees: AHashMap<&str, usize> = AHashMap::new();
        for connection in &self.connections {
            *degrees.entry(connection.from_node_id.as_str()).or_insert(0) += 1;
        }
        degrees
    }

    /// Maximum out-degree over all nodes, 0 for a graph without connections.
    pub fn max_branching_factor(&self) -> usize {
        self.out_degrees().values().copied().max().unwrap_or(0)
    }

    /// Rejects inputs the engine cannot reason about at all.
    pub fn check_well_formed(&self) -> Result<(), InputError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(InputError::EmptyNodeId { index });
            }
            if node.node_type.trim().is_empty() {
                return Err(InputError::EmptyNodeType {
                    node_id: node.id.clone(),
                });
            }
        }
        for (index, connection) in self.connections.iter().enumerate() {
            if connection.from_node_id.trim().is_empty() || connection.to_node_id.trim().is_empty()
            {
                return Err(InputError::EmptyConnectionEndpoint { index });
            }
        }
        Ok(())
    }
}
