//! The JSON interchange format understood by the external automation engine.
//!
//! ```json
//! {
//!   "name": "Webhook to Slack",
//!   "nodes": [{ "id": "n1", "name": "Webhook", "type": "webhookTrigger",
//!               "typeVersion": 2, "position": [0, 300], "parameters": {} }],
//!   "connections": {
//!     "Webhook": { "main": [[{ "node": "Slack", "type": "main", "index": 0 }]] }
//!   }
//! }
//! ```
//!
//! Connections are keyed by node *name*, then by output port type, then by output
//! index. Ports in the graph model use the `"<type>-<index>"` spelling, so `"main-1"`
//! is the second `main` output; an absent port is `main`, index 0.

use crate::error::{ConversionError, InterchangeError};
use crate::graph::{Connection, IntoWorkflow, Node, ParamValue, Workflow};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

const DEFAULT_PORT: &str = "main";
/// Highest port index read from a `"<type>-<index>"` port; larger suffixes are part of the type.
pub const MAX_PORT_INDEX: usize = 64;
const NODE_SPACING: f64 = 220.0;
const CANVAS_ROW: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchangeWorkflow {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<InterchangeNode>,
    #[serde(default)]
    pub connections: BTreeMap<String, BTreeMap<String, Vec<Vec<InterchangeTarget>>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchangeNode {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub type_version: f64,
    #[serde(default)]
    pub position: [f64; 2],
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub port_type: String,
    pub index: usize,
}

/// Splits a model port into its type and index.
///
/// A suffix that is not a number up to [`MAX_PORT_INDEX`] is kept as part of the type.
pub fn parse_port(port: Option<&str>) -> (&str, usize) {
    let Some(port) = port else {
        return (DEFAULT_PORT, 0);
    };
    match port.rsplit_once('-') {
        Some((kind, index)) if !kind.is_empty() => match index.parse::<usize>() {
            Ok(index) if index <= MAX_PORT_INDEX => (kind, index),
            _ => (port, 0),
        },
        _ => (port, 0),
    }
}

/// Inverse of [`parse_port`]; the default port is represented by `None`.
pub fn format_port(port_type: &str, index: usize) -> Option<String> {
    match (port_type, index) {
        (DEFAULT_PORT, 0) => None,
        (kind, 0) => Some(kind.to_string()),
        (kind, index) => Some(format!("{}-{}", kind, index)),
    }
}

/// Converts a workflow to the interchange shape.
///
/// Connections whose endpoints are not nodes of the workflow are exported under the raw
/// id, which is what the external engine would see for an unrepaired graph.
pub fn to_interchange(workflow: &Workflow) -> InterchangeWorkflow {
    let mut names: AHashMap<&str, &str> = AHashMap::new();
    for node in &workflow.nodes {
        names.entry(node.id.as_str()).or_insert(node.name.as_str());
    }
    let name_of = |id: &str| names.get(id).copied().unwrap_or(id).to_string();

    let nodes = workflow
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| InterchangeNode {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            type_version: f64::from(node.version),
            position: [index as f64 * NODE_SPACING, CANVAS_ROW],
            parameters: node.parameters.clone(),
        })
        .collect();

    let mut connections: BTreeMap<String, BTreeMap<String, Vec<Vec<InterchangeTarget>>>> =
        BTreeMap::new();
    for connection in &workflow.connections {
        let (output_type, output_index) = parse_port(connection.from_port.as_deref());
        let (input_type, input_index) = parse_port(connection.to_port.as_deref());
        let outputs = connections
            .entry(name_of(&connection.from_node_id))
            .or_default()
            .entry(output_type.to_string())
            .or_default();
        if outputs.len() <= output_index {
            outputs.resize_with(output_index + 1, Vec::new);
        }
        outputs[output_index].push(InterchangeTarget {
            node: name_of(&connection.to_node_id),
            port_type: input_type.to_string(),
            index: input_index,
        });
    }

    InterchangeWorkflow {
        name: workflow.name.clone(),
        nodes,
        connections,
    }
}

impl IntoWorkflow for InterchangeWorkflow {
    fn into_workflow(self) -> Result<Workflow, ConversionError> {
        let mut ids: AHashMap<String, String> = AHashMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for raw in self.nodes {
            let version = raw.type_version;
            if version.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&version) {
                return Err(ConversionError::ValidationError(format!(
                    "node '{}' has type version {}, expected a whole number between 0 and {}",
                    raw.name,
                    version,
                    u32::MAX
                )));
            }
            let id = if raw.id.is_empty() {
                raw.name.clone()
            } else {
                raw.id
            };
            ids.entry(raw.name.clone()).or_insert_with(|| id.clone());
            nodes.push(Node {
                id,
                name: raw.name,
                node_type: raw.node_type,
                version: version as u32,
                parameters: raw.parameters,
            });
        }

        // Names that match no node are kept verbatim so validation reports them as dangling.
        let resolve = |name: &str| ids.get(name).cloned().unwrap_or_else(|| name.to_string());
        let mut connections = Vec::new();
        for (source, ports) in &self.connections {
            let from_node_id = resolve(source);
            for (output_type, outputs) in ports {
                for (output_index, targets) in outputs.iter().enumerate() {
                    for target in targets {
                        connections.push(Connection {
                            from_node_id: from_node_id.clone(),
                            to_node_id: resolve(&target.node),
                            from_port: format_port(output_type, output_index),
                            to_port: format_port(&target.port_type, target.index),
                        });
                    }
                }
            }
        }

        Ok(Workflow {
            id: String::new(),
            name: self.name,
            description: String::new(),
            nodes,
            connections,
        })
    }
}

/// Serializes a workflow to interchange JSON. Output is byte-stable for equal inputs.
pub fn export_json(workflow: &Workflow) -> Result<String, InterchangeError> {
    serde_json::to_string_pretty(&to_interchange(workflow))
        .map_err(|e| InterchangeError::SerializeError(e.to_string()))
}

pub fn export_to_file(workflow: &Workflow, path: &str) -> Result<(), InterchangeError> {
    let json = export_json(workflow)?;
    fs::write(path, json).map_err(|e| InterchangeError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Parses interchange JSON into a workflow.
pub fn import_json(json: &str) -> Result<Workflow, InterchangeError> {
    let raw: InterchangeWorkflow =
        serde_json::from_str(json).map_err(|e| InterchangeError::JsonParseError(e.to_string()))?;
    Ok(raw.into_workflow()?)
}

/// Parses either the interchange format or the crate's native format.
///
/// The two are told apart by the shape of `connections`: an object keyed by node name
/// is interchange, an array of connections is native.
pub fn load_workflow(json: &str) -> Result<Workflow, InterchangeError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| InterchangeError::JsonParseError(e.to_string()))?;
    if value.get("connections").is_some_and(serde_json::Value::is_object) {
        let raw: InterchangeWorkflow = serde_json::from_value(value)
            .map_err(|e| InterchangeError::JsonParseError(e.to_string()))?;
        Ok(raw.into_workflow()?)
    } else {
        serde_json::from_value(value).map_err(|e| InterchangeError::JsonParseError(e.to_string()))
    }
}

pub fn load_workflow_file(path: &str) -> Result<Workflow, InterchangeError> {
    let content = fs::read_to_string(path).map_err(|e| InterchangeError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    load_workflow(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branching_workflow() -> Workflow {
        Workflow::new("wf", "Route")
            .with_node(Node::new("n1", "Hook", "webhookTrigger", 2).with_parameter("path", "/in"))
            .with_node(Node::new("n2", "Check", "if", 1))
            .with_node(Node::new("n3", "Yes", "set", 3))
            .with_node(Node::new("n4", "No", "set", 3))
            .connect("n1", "n2")
            .with_connection(Connection::new("n2", "n3").with_ports("main", "main"))
            .with_connection(Connection::new("n2", "n4").with_ports("main-1", "main"))
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(None), ("main", 0));
        assert_eq!(parse_port(Some("main-1")), ("main", 1));
        assert_eq!(parse_port(Some("ai_tool")), ("ai_tool", 0));
        assert_eq!(parse_port(Some("ai-tool")), ("ai-tool", 0));
        assert_eq!(parse_port(Some("-3")), ("-3", 0));
        assert_eq!(format_port("main", 0), None);
        assert_eq!(format_port("main", 1).as_deref(), Some("main-1"));
        assert_eq!(format_port("ai_tool", 0).as_deref(), Some("ai_tool"));
    }

    #[test]
    fn test_parse_port_bounds_the_index() {
        assert_eq!(parse_port(Some("main-64")), ("main", 64));
        assert_eq!(parse_port(Some("main-65")), ("main-65", 0));
        assert_eq!(parse_port(Some("main-4000000000")), ("main-4000000000", 0));
        assert_eq!(
            parse_port(Some("main-18446744073709551615")),
            ("main-18446744073709551615", 0)
        );
    }

    #[test]
    fn test_export_with_high_output_indices() {
        let workflow = Workflow::new("wf", "Switch")
            .with_node(Node::new("s", "Switch", "switch", 3))
            .with_node(Node::new("a", "A", "set", 3))
            .with_node(Node::new("b", "B", "set", 3))
            .with_connection(Connection::new("s", "a").with_ports("main-3", "main-1"))
            .with_connection(
                Connection::new("s", "b").with_ports("main-18446744073709551615", "main-1"),
            );

        let exported = to_interchange(&workflow);
        let switch = &exported.connections["Switch"];
        assert_eq!(switch["main"].len(), 4);
        assert!(switch["main"][..3].iter().all(Vec::is_empty));
        assert_eq!(switch["main"][3][0].node, "A");
        assert_eq!(switch["main-18446744073709551615"][0][0].node, "B");

        let restored = import_json(&export_json(&workflow).unwrap()).unwrap();
        assert!(restored.connections.contains(&workflow.connections[0]));
        assert!(restored.connections.contains(&workflow.connections[1]));
    }

    #[test]
    fn test_export_groups_by_name_port_and_index() {
        let exported = to_interchange(&branching_workflow());
        assert_eq!(exported.nodes.len(), 4);
        assert_eq!(exported.nodes[2].position, [440.0, 300.0]);

        let check = &exported.connections["Check"]["main"];
        assert_eq!(check.len(), 2);
        assert_eq!(check[0][0].node, "Yes");
        assert_eq!(check[1][0].node, "No");
        assert_eq!(exported.connections["Hook"]["main"][0][0].index, 0);
    }

    #[test]
    fn test_export_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&export_json(&branching_workflow()).unwrap()).unwrap();
        assert_eq!(json["name"], "Route");
        assert_eq!(json["nodes"][0]["typeVersion"], 2.0);
        assert_eq!(json["nodes"][0]["parameters"]["path"], "/in");
        assert_eq!(
            json["connections"]["Hook"]["main"][0][0],
            serde_json::json!({"node": "Check", "type": "main", "index": 0})
        );
    }

    #[test]
    fn test_import_resolves_names_to_ids() {
        let json = r#"{
            "name": "Imported",
            "nodes": [
                {"id": "a1", "name": "Hook", "type": "webhookTrigger", "typeVersion": 2,
                 "position": [0, 0], "parameters": {"path": "/x"}},
                {"name": "Reply", "type": "respond", "typeVersion": 1}
            ],
            "connections": {
                "Hook": {"main": [[{"node": "Reply", "type": "main", "index": 0},
                                   {"node": "Ghost", "type": "main", "index": 0}]]}
            }
        }"#;
        let workflow = import_json(json).unwrap();
        assert_eq!(workflow.nodes[1].id, "Reply");
        assert_eq!(workflow.connections.len(), 2);
        assert_eq!(workflow.connections[0], Connection::new("a1", "Reply"));
        assert_eq!(workflow.connections[1].to_node_id, "Ghost");
    }

    #[test]
    fn test_import_rejects_out_of_range_versions() {
        let too_large = r#"{"name": "x", "nodes": [{"name": "H", "type": "httpRequest", "typeVersion": 5e9}]}"#;
        assert!(matches!(
            import_json(too_large),
            Err(InterchangeError::Conversion(_))
        ));
        let negative = r#"{"name": "x", "nodes": [{"name": "H", "type": "httpRequest", "typeVersion": -1}]}"#;
        assert!(import_json(negative).is_err());

        let largest = r#"{"name": "x", "nodes": [{"name": "H", "type": "httpRequest", "typeVersion": 4294967295}]}"#;
        assert_eq!(import_json(largest).unwrap().nodes[0].version, u32::MAX);
    }

    #[test]
    fn test_import_rejects_fractional_versions() {
        let json = r#"{"name": "x", "nodes": [{"name": "H", "type": "httpRequest", "typeVersion": 4.2}]}"#;
        assert!(matches!(
            import_json(json),
            Err(InterchangeError::Conversion(_))
        ));
    }

    #[test]
    fn test_export_then_import_preserves_graph() {
        let original = branching_workflow();
        let restored = import_json(&export_json(&original).unwrap()).unwrap();
        assert_eq!(restored.nodes, original.nodes);
        assert_eq!(restored.connections.len(), original.connections.len());
        let normalize = |port: Option<&str>| {
            let (kind, index) = parse_port(port);
            format_port(kind, index)
        };
        for connection in &original.connections {
            let normalized = Connection {
                from_port: normalize(connection.from_port.as_deref()),
                to_port: normalize(connection.to_port.as_deref()),
                ..connection.clone()
            };
            assert!(restored.connections.contains(&normalized), "missing {:?}", normalized);
        }
    }

    #[test]
    fn test_load_workflow_detects_format() {
        let native = branching_workflow().to_json().unwrap();
        assert_eq!(load_workflow(&native).unwrap(), branching_workflow());

        let interchange = export_json(&branching_workflow()).unwrap();
        let loaded = load_workflow(&interchange).unwrap();
        assert_eq!(loaded.name, "Route");
        assert_eq!(loaded.nodes.len(), 4);
    }
}
