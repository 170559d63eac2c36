//! The validation engine: an ordered set of rules evaluated over a workflow.

use crate::error::InputError;
use crate::graph::Workflow;
use crate::registry::NodeTypeRegistry;
use serde::{Deserialize, Serialize};

mod issue;
mod rules;

pub use issue::*;
pub use rules::{RuleCategory, RuleContext, ValidationRule};

/// Outcome of a single validation pass: the findings and whether any of them is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: !issues.iter().any(ValidationIssue::is_error),
            issues,
        }
    }

    pub fn counts(&self) -> IssueCounts {
        IssueCounts::of(&self.issues)
    }

    pub fn has_fixable_issues(&self) -> bool {
        self.issues.iter().any(|i| i.auto_fixable)
    }
}

/// Runs the rule set over workflows. Holds no per-call state and can be shared freely.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
    allow_connection_removal: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: rules::default_rules(),
            allow_connection_removal: true,
        }
    }

    /// Whether dangling connections are reported as fixable by removal.
    pub fn allow_connection_removal(mut self, allow: bool) -> Self {
        self.allow_connection_removal = allow;
        self
    }

    /// Appends a rule. It runs after the built-in rules of the same category.
    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        // Stable: built-ins keep their relative order.
        self.rules.sort_by_key(|r| r.category());
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validates a workflow against a registry without touching either.
    pub fn validate(
        &self,
        workflow: &Workflow,
        registry: &dyn NodeTypeRegistry,
    ) -> Result<ValidationReport, InputError> {
        if registry.is_empty() {
            return Err(InputError::EmptyRegistry);
        }
        workflow.check_well_formed()?;

        let ctx = RuleContext::new(workflow, registry, self.allow_connection_removal);
        let mut issues = Vec::new();
        for rule in &self.rules {
            let before = issues.len();
            rule.check(&ctx, &mut issues);
            tracing::debug!(
                rule = rule.name(),
                found = issues.len() - before,
                "Rule evaluated"
            );
        }

        Ok(ValidationReport::new(issues))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates `workflow` with the built-in rule set.
pub fn validate(
    workflow: &Workflow,
    registry: &dyn NodeTypeRegistry,
) -> Result<ValidationReport, InputError> {
    Validator::new().validate(workflow, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Connection, Node};
    use crate::registry::{Migration, NodeCatalog, NodeTypeDefinition};

    fn make_test_registry() -> NodeCatalog {
        NodeCatalog::builder()
            .with_node_type(NodeTypeDefinition::new("webhookTrigger", 2).trigger())
            .with_node_type(
                NodeTypeDefinition::new("httpRequest", 4)
                    .required("url")
                    .required_with_default("method", "GET"),
            )
            .with_node_type(NodeTypeDefinition::new("respond", 1).terminal())
            .with_node_type(NodeTypeDefinition::new("code", 2))
            .with_migration(Migration::new("httpRequest", Some(3), "httpRequest", 4))
            .with_migration(Migration::new("function", None, "code", 2))
            .build()
            .unwrap()
    }

    fn linear_workflow() -> Workflow {
        Workflow::new("wf", "Linear")
            .with_node(Node::new("t", "Trigger", "webhookTrigger", 2))
            .with_node(
                Node::new("h", "Fetch", "httpRequest", 4)
                    .with_parameter("url", "https://example.com")
                    .with_parameter("method", "POST"),
            )
            .with_node(Node::new("r", "Respond", "respond", 1))
            .connect("t", "h")
            .connect("h", "r")
    }

    fn codes(report: &ValidationReport) -> Vec<&IssueCode> {
        report.issues.iter().map(|i| &i.code).collect()
    }

    #[test]
    fn test_valid_workflow() {
        let report = validate(&linear_workflow(), &make_test_registry()).unwrap();
        assert!(report.is_valid);
        assert!(report.issues.is_empty(), "Expected no issues, got: {:?}", report.issues);
    }

    #[test]
    fn test_unknown_type_with_and_without_migration() {
        let workflow = linear_workflow()
            .with_node(Node::new("f", "Legacy", "function", 1))
            .with_node(Node::new("x", "Mystery", "mystery", 1))
            .connect("h", "f")
            .connect("h", "x");
        let report = validate(&workflow, &make_test_registry()).unwrap();

        assert!(!report.is_valid);
        let unknown: Vec<_> = report
            .issues
            .iter()
            .filter(|i| matches!(i.code, IssueCode::UnknownNodeType { .. }))
            .collect();
        assert_eq!(unknown.len(), 2);
        assert!(unknown.iter().all(|i| i.kind == IssueKind::Error));
        assert!(unknown[0].auto_fixable);
        assert_eq!(unknown[0].node_id.as_deref(), Some("f"));
        assert!(!unknown[1].auto_fixable);
    }

    #[test]
    fn test_outdated_version_is_a_warning() {
        let mut workflow = linear_workflow();
        workflow.nodes[1].version = 3;
        let report = validate(&workflow, &make_test_registry()).unwrap();

        assert!(report.is_valid);
        assert_eq!(
            codes(&report),
            vec![&IssueCode::OutdatedNodeVersion {
                node: 1,
                version: 3,
                current_version: 4
            }]
        );
        assert!(report.issues[0].auto_fixable);

        workflow.nodes[1].version = 2;
        let report = validate(&workflow, &make_test_registry()).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert!(!report.issues[0].auto_fixable);
    }

    #[test]
    fn test_missing_parameter_severity_depends_on_default() {
        let mut workflow = linear_workflow();
        workflow.nodes[1].parameters.clear();
        workflow.nodes[1]
            .parameters
            .insert("method".to_string(), crate::graph::ParamValue::from(""));
        let report = validate(&workflow, &make_test_registry()).unwrap();

        assert_eq!(report.issues.len(), 2);
        let url = &report.issues[0];
        assert_eq!(url.kind, IssueKind::Suggestion);
        assert!(!url.auto_fixable);
        let method = &report.issues[1];
        assert_eq!(method.kind, IssueKind::Warning);
        assert!(method.auto_fixable);
        assert_eq!(
            method.code,
            IssueCode::MissingParameter {
                node: 1,
                parameter: "method".to_string()
            }
        );
    }

    #[test]
    fn test_orphan_exempts_triggers_and_terminals() {
        let workflow = Workflow::new("wf", "Loose")
            .with_node(Node::new("t", "Trigger", "webhookTrigger", 2))
            .with_node(Node::new("c", "Code", "code", 2))
            .with_node(Node::new("r", "Respond", "respond", 1));
        let report = validate(&workflow, &make_test_registry()).unwrap();

        assert_eq!(codes(&report), vec![&IssueCode::OrphanNode { node: 1 }]);
        assert_eq!(report.issues[0].kind, IssueKind::Suggestion);
        assert!(!report.issues[0].auto_fixable);
    }

    #[test]
    fn test_missing_trigger() {
        let workflow = Workflow::new("wf", "No start")
            .with_node(Node::new("c", "Code", "code", 2))
            .with_node(Node::new("r", "Respond", "respond", 1))
            .connect("c", "r");
        let report = validate(&workflow, &make_test_registry()).unwrap();
        assert_eq!(codes(&report), vec![&IssueCode::MissingTrigger]);
        assert!(report.is_valid);
    }

    #[test]
    fn test_dangling_connection_reported_once() {
        let workflow = linear_workflow()
            .with_connection(Connection::new("ghost", "phantom"))
            .connect("h", "missing");
        let report = validate(&workflow, &make_test_registry()).unwrap();

        let dangling: Vec<_> = report
            .issues
            .iter()
            .filter(|i| matches!(i.code, IssueCode::DanglingConnection { .. }))
            .collect();
        assert_eq!(dangling.len(), 2);
        assert_eq!(
            dangling[0].code,
            IssueCode::DanglingConnection {
                connection: 2,
                missing_node_id: "ghost".to_string()
            }
        );
        assert!(dangling[0].message.contains("'phantom'"));
        assert!(dangling.iter().all(|i| i.auto_fixable && i.is_error()));
    }

    #[test]
    fn test_connection_removal_policy() {
        let workflow = linear_workflow().connect("h", "missing");
        let report = Validator::new()
            .allow_connection_removal(false)
            .validate(&workflow, &make_test_registry())
            .unwrap();
        assert_eq!(report.issues.len(), 1);
        assert!(!report.issues[0].auto_fixable);
    }

    #[test]
    fn test_rule_order_is_structural_node_connection() {
        let workflow = Workflow::new("wf", "Messy")
            .with_node(Node::new("a", "A", "code", 2))
            .with_node(Node::new("a", "A again", "mystery", 1))
            .connect("a", "nowhere");
        let report = validate(&workflow, &make_test_registry()).unwrap();

        assert_eq!(
            codes(&report),
            vec![
                &IssueCode::DuplicateNodeId { node: 1 },
                &IssueCode::MissingTrigger,
                &IssueCode::UnknownNodeType {
                    node: 1,
                    node_type: "mystery".to_string()
                },
                &IssueCode::DanglingConnection {
                    connection: 0,
                    missing_node_id: "nowhere".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_custom_rule_runs_within_its_category() {
        struct NoSelfLoops;
        impl ValidationRule for NoSelfLoops {
            fn name(&self) -> &str {
                "no-self-loops"
            }
            fn category(&self) -> RuleCategory {
                RuleCategory::Structural
            }
            fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<ValidationIssue>) {
                for c in &ctx.workflow.connections {
                    if c.from_node_id == c.to_node_id {
                        issues.push(ValidationIssue::suggestion(
                            IssueCode::Custom {
                                rule: self.name().to_string(),
                            },
                            "Self loop",
                        ));
                    }
                }
            }
        }

        let validator = Validator::new().with_rule(Box::new(NoSelfLoops));
        assert_eq!(validator.rule_names()[2], "no-self-loops");

        let workflow = linear_workflow().connect("h", "h");
        let report = validator.validate(&workflow, &make_test_registry()).unwrap();
        assert_eq!(
            codes(&report),
            vec![&IssueCode::Custom {
                rule: "no-self-loops".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_malformed_input() {
        let workflow = Workflow::new("wf", "Bad").with_node(Node::new("", "Blank", "code", 2));
        assert_eq!(
            validate(&workflow, &make_test_registry()),
            Err(InputError::EmptyNodeId { index: 0 })
        );
        assert_eq!(
            validate(&linear_workflow(), &NodeCatalog::default()),
            Err(InputError::EmptyRegistry)
        );
    }
}
