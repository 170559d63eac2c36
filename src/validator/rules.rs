use super::issue::{IssueCode, ValidationIssue};
use crate::graph::Workflow;
use crate::registry::NodeTypeRegistry;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// When a rule runs relative to the others.
///
/// Rules run grouped by category in declaration order; within a category they keep
/// the order in which they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleCategory {
    /// Whole-graph properties.
    Structural,
    /// Evaluated once per node, in node order.
    Node,
    /// Evaluated once per connection, in connection order.
    Connection,
}

/// Everything a rule may look at. Built once per validation pass.
pub struct RuleContext<'a> {
    pub workflow: &'a Workflow,
    pub registry: &'a dyn NodeTypeRegistry,
    /// Whether dangling connections may be repaired by deleting them.
    pub allow_connection_removal: bool,
    node_ids: AHashSet<&'a str>,
    incident: AHashMap<&'a str, usize>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        workflow: &'a Workflow,
        registry: &'a dyn NodeTypeRegistry,
        allow_connection_removal: bool,
    ) -> Self {
        let mut incident: AHashMap<&str, usize> = AHashMap::new();
        for connection in &workflow.connections {
            *incident.entry(connection.from_node_id.as_str()).or_insert(0) += 1;
            *incident.entry(connection.to_node_id.as_str()).or_insert(0) += 1;
        }
        Self {
            workflow,
            registry,
            allow_connection_removal,
            node_ids: workflow.node_ids(),
            incident,
        }
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.node_ids.contains(node_id)
    }

    /// Connections with `node_id` on either end; a self-loop counts twice.
    pub fn incident_connections(&self, node_id: &str) -> usize {
        self.incident.get(node_id).copied().unwrap_or(0)
    }
}

/// Defines the contract for a single validation rule.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;
    fn category(&self) -> RuleCategory;
    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>);
}

pub(super) fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(DuplicateNodeIdRule),
        Box::new(MissingTriggerRule),
        Box::new(NodeTypeRule),
        Box::new(RequiredParameterRule),
        Box::new(OrphanNodeRule),
        Box::new(DanglingConnectionRule),
    ]
}

struct DuplicateNodeIdRule;

impl ValidationRule for DuplicateNodeIdRule {
    fn name(&self) -> &str {
        "duplicate-node-id"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structural
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        let mut first_seen: AHashMap<&str, &str> = AHashMap::new();
        for (index, node) in ctx.workflow.nodes.iter().enumerate() {
            if let Some(first_name) = first_seen.get(node.id.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::DuplicateNodeId { node: index },
                        format!(
                            "Node id '{}' is already used by node '{}'",
                            node.id, first_name
                        ),
                    )
                    .at_node(&node.id, &node.name)
                    .with_fix("Rename the node to a unique id", true),
                );
            } else {
                first_seen.insert(&node.id, &node.name);
            }
        }
    }
}

struct MissingTriggerRule;

impl ValidationRule for MissingTriggerRule {
    fn name(&self) -> &str {
        "missing-trigger"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Structural
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        let has_trigger = ctx
            .workflow
            .nodes
            .iter()
            .any(|n| ctx.registry.is_trigger(&n.node_type));
        if !has_trigger {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::MissingTrigger,
                    "Workflow has no trigger node, so nothing will start it",
                )
                .with_fix("Add a trigger node as the entry point", false),
            );
        }
    }
}

struct NodeTypeRule;

impl ValidationRule for NodeTypeRule {
    fn name(&self) -> &str {
        "node-type"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Node
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        for (index, node) in ctx.workflow.nodes.iter().enumerate() {
            let migration = ctx.registry.migration(&node.node_type, node.version);
            let migration_hint = migration.map(|m| {
                format!("Migrate to '{}' version {}", m.to_type, m.to_version)
            });

            match ctx.registry.lookup(&node.node_type) {
                None => issues.push(
                    ValidationIssue::error(
                        IssueCode::UnknownNodeType {
                            node: index,
                            node_type: node.node_type.clone(),
                        },
                        format!("Unknown node type '{}'", node.node_type),
                    )
                    .at_node(&node.id, &node.name)
                    .with_fix(
                        migration_hint
                            .unwrap_or_else(|| "Replace the node with a known node type".into()),
                        migration.is_some(),
                    ),
                ),
                Some(definition) if node.version < definition.version => issues.push(
                    ValidationIssue::warning(
                        IssueCode::OutdatedNodeVersion {
                            node: index,
                            version: node.version,
                            current_version: definition.version,
                        },
                        format!(
                            "Node type '{}' version {} is outdated (current is {})",
                            node.node_type, node.version, definition.version
                        ),
                    )
                    .at_node(&node.id, &node.name)
                    .with_fix(
                        migration_hint.unwrap_or_else(|| {
                            format!("Upgrade the node to version {}", definition.version)
                        }),
                        migration.is_some(),
                    ),
                ),
                Some(_) => {}
            }
        }
    }
}

struct RequiredParameterRule;

impl ValidationRule for RequiredParameterRule {
    fn name(&self) -> &str {
        "required-parameter"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Node
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        for (index, node) in ctx.workflow.nodes.iter().enumerate() {
            // Unknown types are already reported; there is no schema to check against.
            let Some(definition) = ctx.registry.lookup(&node.node_type) else {
                continue;
            };
            for spec in definition.required_parameters() {
                if node.filled_parameter(&spec.name).is_some() {
                    continue;
                }
                let code = IssueCode::MissingParameter {
                    node: index,
                    parameter: spec.name.clone(),
                };
                let message = format!("Required parameter '{}' is missing", spec.name);
                let issue = match spec.usable_default() {
                    Some(default) => ValidationIssue::warning(code, message).with_fix(
                        format!("Set '{}' to its default {}", spec.name, default),
                        true,
                    ),
                    None => ValidationIssue::suggestion(code, message)
                        .with_fix(format!("Provide a value for '{}'", spec.name), false),
                };
                issues.push(issue.at_node(&node.id, &node.name));
            }
        }
    }
}

struct OrphanNodeRule;

impl ValidationRule for OrphanNodeRule {
    fn name(&self) -> &str {
        "orphan-node"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Node
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        for (index, node) in ctx.workflow.nodes.iter().enumerate() {
            if ctx.registry.is_boundary(&node.node_type) || ctx.incident_connections(&node.id) > 0
            {
                continue;
            }
            issues.push(
                ValidationIssue::suggestion(
                    IssueCode::OrphanNode { node: index },
                    "Node is not connected to any other node",
                )
                .at_node(&node.id, &node.name)
                .with_fix("Connect the node to the flow or remove it", false),
            );
        }
    }
}

struct DanglingConnectionRule;

impl ValidationRule for DanglingConnectionRule {
    fn name(&self) -> &str {
        "dangling-connection"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Connection
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
        for (index, connection) in ctx.workflow.connections.iter().enumerate() {
            let missing: Vec<&str> = [
                connection.from_node_id.as_str(),
                connection.to_node_id.as_str(),
            ]
            .into_iter()
            .filter(|id| !ctx.has_node(id))
            .unique()
            .collect();

            let Some(first_missing) = missing.first() else {
                continue;
            };
            issues.push(
                ValidationIssue::error(
                    IssueCode::DanglingConnection {
                        connection: index,
                        missing_node_id: first_missing.to_string(),
                    },
                    format!(
                        "Connection '{}' -> '{}' references missing node {}",
                        connection.from_node_id,
                        connection.to_node_id,
                        missing.iter().map(|id| format!("'{}'", id)).join(" and ")
                    ),
                )
                .with_fix("Remove the connection", ctx.allow_connection_removal),
            );
        }
    }
}
