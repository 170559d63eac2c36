use crate::graph::{Connection, ParamValue};
use crate::validator::ValidationIssue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single change made by the fixer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FixAction {
    RenameNodeId { node: usize, from: String, to: String },
    RemoveConnection { connection: Connection },
    #[serde(rename_all = "camelCase")]
    MigrateNode {
        node: usize,
        from_type: String,
        from_version: u32,
        to_type: String,
        to_version: u32,
    },
    FillDefault {
        node: usize,
        parameter: String,
        value: ParamValue,
    },
}

impl fmt::Display for FixAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixAction::RenameNodeId { from, to, .. } => {
                write!(f, "Renamed duplicate node id '{}' to '{}'", from, to)
            }
            FixAction::RemoveConnection { connection } => write!(
                f,
                "Removed connection '{}' -> '{}'",
                connection.from_node_id, connection.to_node_id
            ),
            FixAction::MigrateNode {
                from_type,
                from_version,
                to_type,
                to_version,
                ..
            } => write!(
                f,
                "Migrated '{}' v{} to '{}' v{}",
                from_type, from_version, to_type, to_version
            ),
            FixAction::FillDefault {
                parameter, value, ..
            } => write!(f, "Set '{}' to default {}", parameter, value),
        }
    }
}

/// Audit trail entry for an applied repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFix {
    #[serde(flatten)]
    pub action: FixAction,
    /// Id of the affected node after the repair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub description: String,
}

impl AppliedFix {
    pub fn new(action: FixAction, node_id: Option<&str>) -> Self {
        Self {
            description: action.to_string(),
            node_id: node_id.map(str::to_string),
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Resolved,
    Downgraded,
}

/// Accumulates what the fixer did to each issue while it works through its passes.
pub(super) struct RepairLog {
    applied: Vec<AppliedFix>,
    outcomes: Vec<Option<Outcome>>,
}

impl RepairLog {
    pub(super) fn new(issue_count: usize) -> Self {
        Self {
            applied: Vec::new(),
            outcomes: vec![None; issue_count],
        }
    }

    /// A change that resolves the issue at `issue`.
    pub(super) fn applied(&mut self, issue: usize, fix: AppliedFix) {
        self.record(fix);
        self.outcomes[issue] = Some(Outcome::Resolved);
    }

    /// A change not tied to a reported issue.
    pub(super) fn record(&mut self, fix: AppliedFix) {
        tracing::debug!(node_id = ?fix.node_id, "{}", fix.description);
        self.applied.push(fix);
    }

    /// The issue no longer holds on the working graph; nothing to change.
    pub(super) fn resolved(&mut self, issue: usize) {
        self.outcomes[issue] = Some(Outcome::Resolved);
    }

    pub(super) fn downgrade(&mut self, issue: usize, reason: &str) {
        tracing::warn!(issue, reason, "Auto-fix not possible, leaving issue unresolved");
        self.outcomes[issue] = Some(Outcome::Downgraded);
    }

    pub(super) fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Splits into the audit trail and the issues that are still open, in original order.
    pub(super) fn finish(
        self,
        issues: &[ValidationIssue],
    ) -> (Vec<AppliedFix>, Vec<ValidationIssue>) {
        let remaining = issues
            .iter()
            .zip(self.outcomes)
            .filter_map(|(issue, outcome)| match outcome {
                Some(Outcome::Resolved) => None,
                Some(Outcome::Downgraded) => Some(ValidationIssue {
                    auto_fixable: false,
                    ..issue.clone()
                }),
                None if issue.auto_fixable => Some(ValidationIssue {
                    auto_fixable: false,
                    ..issue.clone()
                }),
                None => Some(issue.clone()),
            })
            .collect();
        (self.applied, remaining)
    }
}
