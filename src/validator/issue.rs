use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding. Only `Error` makes a workflow invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
    Suggestion,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Error => write!(f, "error"),
            IssueKind::Warning => write!(f, "warning"),
            IssueKind::Suggestion => write!(f, "suggestion"),
        }
    }
}

/// Machine-readable identity of a finding.
///
/// `node` and `connection` are positions in the workflow's `nodes` / `connections`
/// sequences at validation time. Positions stay meaningful through auto-fix because
/// repairs never reorder nodes, and connections are only removed in a single final pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum IssueCode {
    DuplicateNodeId { node: usize },
    MissingTrigger,
    #[serde(rename_all = "camelCase")]
    UnknownNodeType { node: usize, node_type: String },
    #[serde(rename_all = "camelCase")]
    OutdatedNodeVersion {
        node: usize,
        version: u32,
        current_version: u32,
    },
    MissingParameter { node: usize, parameter: String },
    OrphanNode { node: usize },
    #[serde(rename_all = "camelCase")]
    DanglingConnection {
        connection: usize,
        missing_node_id: String,
    },
    /// Raised by a rule supplied through `Validator::with_rule`.
    Custom { rule: String },
}

/// A structured finding about a workflow.
///
/// Findings are data, not failures: they never interrupt a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub kind: IssueKind,
    #[serde(flatten)]
    pub code: IssueCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    pub auto_fixable: bool,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            node_id: None,
            node_name: None,
            message: message.into(),
            suggested_fix: None,
            auto_fixable: false,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Error, code, message)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Warning, code, message)
    }

    pub fn suggestion(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Suggestion, code, message)
    }

    pub fn at_node(mut self, node_id: &str, node_name: &str) -> Self {
        self.node_id = Some(node_id.to_string());
        self.node_name = Some(node_name.to_string());
        self
    }

    pub fn with_fix(mut self, suggested_fix: impl Into<String>, auto_fixable: bool) -> Self {
        self.suggested_fix = Some(suggested_fix.into());
        self.auto_fixable = auto_fixable;
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == IssueKind::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        if let Some(name) = &self.node_name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Per-kind tally of a list of findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
}

impl IssueCounts {
    pub fn of(issues: &[ValidationIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.kind {
                IssueKind::Error => counts.errors += 1,
                IssueKind::Warning => counts.warnings += 1,
                IssueKind::Suggestion => counts.suggestions += 1,
            }
            counts
        })
    }
}
