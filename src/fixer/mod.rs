//! Deterministic repair of the fixable issue classes.
//!
//! Repairs run in a fixed order (duplicate ids, dangling connections, type/version
//! migration, default parameters) on a working copy of the workflow. Each pass re-checks
//! its issue against the working copy before changing anything, so an issue that an
//! earlier pass already made moot is dropped instead of being "fixed" twice.

use crate::graph::{Node, ParamValue, Workflow};
use crate::registry::NodeTypeRegistry;
use crate::validator::{IssueCode, ValidationIssue};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

mod log;

pub use log::{AppliedFix, FixAction};
use log::RepairLog;

/// Upper bound on chained migrations for a single node.
const MAX_MIGRATION_STEPS: usize = 32;

/// Result of a repair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixOutcome {
    pub repaired: Workflow,
    pub applied: Vec<AppliedFix>,
    /// Issues left open: everything not auto-fixable, plus fixable issues the registry
    /// could not support, downgraded to `auto_fixable = false`.
    pub remaining: Vec<ValidationIssue>,
}

pub struct AutoFixer<'r> {
    registry: &'r dyn NodeTypeRegistry,
}

impl<'r> AutoFixer<'r> {
    pub fn new(registry: &'r dyn NodeTypeRegistry) -> Self {
        Self { registry }
    }

    /// Repairs a copy of `workflow`. Never fails; unrepairable issues are returned as data.
    pub fn fix(&self, workflow: &Workflow, issues: &[ValidationIssue]) -> AutoFixOutcome {
        let mut working = workflow.clone();
        let mut log = RepairLog::new(issues.len());

        self.rename_duplicate_ids(&mut working, issues, &mut log);
        self.remove_dangling_connections(&mut working, issues, &mut log);
        self.migrate_nodes(&mut working, issues, &mut log);
        self.fill_default_parameters(&mut working, issues, &mut log);

        tracing::info!(applied = log.applied_count(), "Auto-fix finished");
        let (applied, remaining) = log.finish(issues);
        AutoFixOutcome {
            repaired: working,
            applied,
            remaining,
        }
    }

    fn rename_duplicate_ids(
        &self,
        working: &mut Workflow,
        issues: &[ValidationIssue],
        log: &mut RepairLog,
    ) {
        // Ids named by connections count as taken, so a rename never adopts an edge.
        let mut taken: AHashSet<String> = working
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .chain(
                working
                    .connections
                    .iter()
                    .flat_map(|c| [c.from_node_id.clone(), c.to_node_id.clone()]),
            )
            .collect();

        for (issue_idx, node_idx) in fixable(issues, |code| match code {
            IssueCode::DuplicateNodeId { node } => Some(*node),
            _ => None,
        }) {
            let Some(node) = working.nodes.get(node_idx) else {
                log.downgrade(issue_idx, "node position out of range");
                continue;
            };
            let shadowed = working.nodes[..node_idx].iter().any(|n| n.id == node.id);
            if !shadowed {
                log.resolved(issue_idx);
                continue;
            }

            let original = node.id.clone();
            let Some(renamed) = (2..=working.nodes.len() + taken.len() + 1)
                .map(|suffix| format!("{}_{}", original, suffix))
                .find(|candidate| !taken.contains(candidate))
            else {
                log.downgrade(issue_idx, "no free id suffix");
                continue;
            };
            taken.insert(renamed.clone());
            working.nodes[node_idx].id = renamed.clone();

            log.applied(
                issue_idx,
                AppliedFix::new(
                    FixAction::RenameNodeId {
                        node: node_idx,
                        from: original,
                        to: renamed.clone(),
                    },
                    Some(&renamed),
                ),
            );
        }
    }

    fn remove_dangling_connections(
        &self,
        working: &mut Workflow,
        issues: &[ValidationIssue],
        log: &mut RepairLog,
    ) {
        let mut doomed = BTreeSet::new();
        {
            let node_ids = working.node_ids();
            for (issue_idx, conn_idx) in fixable(issues, |code| match code {
                IssueCode::DanglingConnection { connection, .. } => Some(*connection),
                _ => None,
            }) {
                let Some(connection) = working.connections.get(conn_idx) else {
                    log.downgrade(issue_idx, "connection position out of range");
                    continue;
                };
                let dangling = !node_ids.contains(connection.from_node_id.as_str())
                    || !node_ids.contains(connection.to_node_id.as_str());
                if !dangling {
                    log.resolved(issue_idx);
                    continue;
                }
                if doomed.insert(conn_idx) {
                    log.applied(
                        issue_idx,
                        AppliedFix::new(
                            FixAction::RemoveConnection {
                                connection: connection.clone(),
                            },
                            None,
                        ),
                    );
                } else {
                    log.resolved(issue_idx);
                }
            }
        }

        if doomed.is_empty() {
            return;
        }
        let mut position = 0;
        working.connections.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
    }

    fn migrate_nodes(
        &self,
        working: &mut Workflow,
        issues: &[ValidationIssue],
        log: &mut RepairLog,
    ) {
        for (issue_idx, node_idx) in fixable(issues, |code| match code {
            IssueCode::UnknownNodeType { node, .. } | IssueCode::OutdatedNodeVersion { node, .. } => {
                Some(*node)
            }
            _ => None,
        }) {
            let Some(node) = working.nodes.get_mut(node_idx) else {
                log.downgrade(issue_idx, "node position out of range");
                continue;
            };
            if self.is_current(node) {
                log.resolved(issue_idx);
                continue;
            }
            let Some(migrated) = self.follow_migrations(node) else {
                log.downgrade(issue_idx, "registry has no migration path to a current version");
                continue;
            };

            let from_type = std::mem::replace(&mut node.node_type, migrated.node_type);
            let from_version = std::mem::replace(&mut node.version, migrated.version);
            node.parameters = migrated.parameters;
            let action = FixAction::MigrateNode {
                node: node_idx,
                from_type,
                from_version,
                to_type: node.node_type.clone(),
                to_version: node.version,
            };
            let node_id = node.id.clone();
            log.applied(issue_idx, AppliedFix::new(action, Some(&node_id)));

            // A migrated node lands on a new schema; bring it fully up to date so the next
            // validation pass finds nothing left to repair.
            let filled = self.fill_missing_defaults(node);
            for (parameter, value) in filled {
                log.record(AppliedFix::new(
                    FixAction::FillDefault {
                        node: node_idx,
                        parameter,
                        value,
                    },
                    Some(&node_id),
                ));
            }
        }
    }

    fn fill_default_parameters(
        &self,
        working: &mut Workflow,
        issues: &[ValidationIssue],
        log: &mut RepairLog,
    ) {
        for (issue_idx, (node_idx, parameter)) in fixable(issues, |code| match code {
            IssueCode::MissingParameter { node, parameter } => Some((*node, parameter)),
            _ => None,
        }) {
            let Some(node) = working.nodes.get_mut(node_idx) else {
                log.downgrade(issue_idx, "node position out of range");
                continue;
            };
            if node.filled_parameter(parameter).is_some() {
                log.resolved(issue_idx);
                continue;
            }
            let Some(definition) = self.registry.lookup(&node.node_type) else {
                log.downgrade(issue_idx, "node type is not registered");
                continue;
            };
            let Some(spec) = definition.parameter(parameter).filter(|s| s.required) else {
                // The current schema no longer requires it.
                log.resolved(issue_idx);
                continue;
            };
            let Some(default) = spec.usable_default().cloned() else {
                log.downgrade(issue_idx, "registry supplies no default value");
                continue;
            };

            node.parameters.insert(parameter.clone(), default.clone());
            let node_id = node.id.clone();
            log.applied(
                issue_idx,
                AppliedFix::new(
                    FixAction::FillDefault {
                        node: node_idx,
                        parameter: parameter.clone(),
                        value: default,
                    },
                    Some(&node_id),
                ),
            );
        }
    }

    fn is_current(&self, node: &Node) -> bool {
        self.registry
            .lookup(&node.node_type)
            .is_some_and(|def| node.version >= def.version)
    }

    /// Walks the migration chain from the node's type/version to a current definition.
    fn follow_migrations(&self, node: &Node) -> Option<MigratedNode> {
        let mut current = MigratedNode {
            node_type: node.node_type.clone(),
            version: node.version,
            parameters: node.parameters.clone(),
        };
        let mut visited: AHashSet<(String, u32)> = AHashSet::new();

        for _ in 0..MAX_MIGRATION_STEPS {
            if let Some(def) = self.registry.lookup(&current.node_type) {
                if current.version >= def.version {
                    return Some(current);
                }
            }
            if !visited.insert((current.node_type.clone(), current.version)) {
                return None;
            }
            let migration = self.registry.migration(&current.node_type, current.version)?;
            for (old, new) in &migration.rename_parameters {
                if current.parameters.contains_key(new) {
                    continue;
                }
                if let Some(value) = current.parameters.remove(old) {
                    current.parameters.insert(new.clone(), value);
                }
            }
            current.node_type = migration.to_type.clone();
            current.version = migration.to_version;
        }
        None
    }

    /// Fills every required parameter that has a usable default; returns what was set.
    fn fill_missing_defaults(&self, node: &mut Node) -> Vec<(String, ParamValue)> {
        let Some(definition) = self.registry.lookup(&node.node_type) else {
            return Vec::new();
        };
        let mut filled = Vec::new();
        for spec in definition.required_parameters() {
            if node.filled_parameter(&spec.name).is_some() {
                continue;
            }
            if let Some(default) = spec.usable_default() {
                node.parameters.insert(spec.name.clone(), default.clone());
                filled.push((spec.name.clone(), default.clone()));
            }
        }
        filled
    }
}

struct MigratedNode {
    node_type: String,
    version: u32,
    parameters: BTreeMap<String, ParamValue>,
}

/// Auto-fixable issues matched by `select`, paired with their position in `issues`.
fn fixable<'a, T>(
    issues: &'a [ValidationIssue],
    select: impl Fn(&'a IssueCode) -> Option<T>,
) -> impl Iterator<Item = (usize, T)> {
    issues
        .iter()
        .enumerate()
        .filter(|(_, issue)| issue.auto_fixable)
        .filter_map(move |(idx, issue)| select(&issue.code).map(|t| (idx, t)))
}

/// Repairs `workflow` using the issues reported for it.
pub fn auto_fix(
    workflow: &Workflow,
    issues: &[ValidationIssue],
    registry: &dyn NodeTypeRegistry,
) -> AutoFixOutcome {
    AutoFixer::new(registry).fix(workflow, issues)
}
