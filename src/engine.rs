//! Result assembly: validation, scoring and repair composed into one call.

use crate::config::EngineConfig;
use crate::error::InputError;
use crate::fixer::{AppliedFix, AutoFixOutcome, AutoFixer};
use crate::graph::Workflow;
use crate::registry::NodeTypeRegistry;
use crate::scoring::{ScoringPolicy, Scores};
use crate::validator::{ValidationIssue, ValidationReport, ValidationRule, Validator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything the presentation and export layers need about one workflow.
///
/// When a repair ran, `is_valid`, `issues` and both scores describe `repaired_graph`,
/// not the workflow that was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub quality_score: f64,
    pub complexity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repaired_graph: Option<Workflow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_fixes: Vec<AppliedFix>,
}

impl ValidationResult {
    fn assemble(
        report: ValidationReport,
        scores: Scores,
        repaired_graph: Option<Workflow>,
        applied_fixes: Vec<AppliedFix>,
    ) -> Self {
        Self {
            is_valid: report.is_valid,
            issues: report.issues,
            quality_score: scores.quality,
            complexity_score: scores.complexity,
            repaired_graph,
            applied_fixes,
        }
    }

    /// The graph that should be exported: the repaired one if a repair ran.
    pub fn effective_graph<'a>(&'a self, submitted: &'a Workflow) -> &'a Workflow {
        self.repaired_graph.as_ref().unwrap_or(submitted)
    }
}

/// The validation engine bound to a registry and a configuration.
///
/// An engine holds only immutable data, so one instance can serve any number of
/// threads concurrently.
pub struct Engine {
    registry: Arc<dyn NodeTypeRegistry>,
    validator: Validator,
    config: EngineConfig,
}

pub struct EngineBuilder {
    registry: Arc<dyn NodeTypeRegistry>,
    config: EngineConfig,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl EngineBuilder {
    pub fn new(registry: Arc<dyn NodeTypeRegistry>) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
            rules: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scoring(mut self, policy: ScoringPolicy) -> Self {
        self.config.scoring = policy;
        self
    }

    pub fn auto_fix(mut self, enabled: bool) -> Self {
        self.config.auto_fix = enabled;
        self
    }

    pub fn remove_dangling_connections(mut self, enabled: bool) -> Self {
        self.config.remove_dangling_connections = enabled;
        self
    }

    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> Engine {
        let validator = self.rules.into_iter().fold(
            Validator::new().allow_connection_removal(self.config.remove_dangling_connections),
            Validator::with_rule,
        );
        Engine {
            registry: self.registry,
            validator,
            config: self.config,
        }
    }
}

impl Engine {
    pub fn builder(registry: Arc<dyn NodeTypeRegistry>) -> EngineBuilder {
        EngineBuilder::new(registry)
    }

    pub fn new(registry: Arc<dyn NodeTypeRegistry>) -> Self {
        EngineBuilder::new(registry).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn NodeTypeRegistry {
        self.registry.as_ref()
    }

    /// A single validation pass; no scoring, no repair.
    pub fn validate(&self, workflow: &Workflow) -> Result<ValidationReport, InputError> {
        self.validator.validate(workflow, self.registry())
    }

    pub fn score(&self, workflow: &Workflow, issues: &[ValidationIssue]) -> Scores {
        self.config.scoring.score(workflow, issues)
    }

    pub fn auto_fix(&self, workflow: &Workflow, issues: &[ValidationIssue]) -> AutoFixOutcome {
        AutoFixer::new(self.registry()).fix(workflow, issues)
    }

    /// Validates, scores and, when something is repairable, repairs `workflow`.
    ///
    /// After a repair the repaired graph is validated and scored again, so the returned
    /// issues and scores always describe the graph the caller should use.
    pub fn check(&self, workflow: &Workflow) -> Result<ValidationResult, InputError> {
        let report = self.validate(workflow)?;
        let counts = report.counts();
        tracing::info!(
            workflow = %workflow.name,
            errors = counts.errors,
            warnings = counts.warnings,
            suggestions = counts.suggestions,
            "Validated workflow"
        );

        if !self.config.auto_fix || !report.has_fixable_issues() {
            let scores = self.score(workflow, &report.issues);
            return Ok(ValidationResult::assemble(report, scores, None, Vec::new()));
        }

        let outcome = self.auto_fix(workflow, &report.issues);
        if outcome.applied.is_empty() {
            let report = ValidationReport::new(outcome.remaining);
            let scores = self.score(workflow, &report.issues);
            return Ok(ValidationResult::assemble(report, scores, None, Vec::new()));
        }

        let mut revalidated = self.validate(&outcome.repaired)?;
        // The fixer already had its pass; anything it left behind is not repairable.
        for issue in &mut revalidated.issues {
            issue.auto_fixable = false;
        }
        let scores = self.score(&outcome.repaired, &revalidated.issues);
        tracing::info!(
            workflow = %workflow.name,
            fixes = outcome.applied.len(),
            remaining = revalidated.issues.len(),
            quality = scores.quality,
            complexity = scores.complexity,
            "Repaired workflow"
        );

        Ok(ValidationResult::assemble(
            revalidated,
            scores,
            Some(outcome.repaired),
            outcome.applied,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::registry::{NodeCatalog, NodeTypeDefinition};
    use crate::validator::IssueCode;

    fn engine() -> EngineBuilder {
        let catalog = NodeCatalog::builder()
            .with_node_type(NodeTypeDefinition::new("manualTrigger", 1).trigger())
            .with_node_type(NodeTypeDefinition::new("set", 3).required_with_default("mode", "manual"))
            .build()
            .unwrap();
        Engine::builder(Arc::new(catalog))
    }

    #[test]
    fn test_warning_level_repair_runs_on_valid_graph() {
        let workflow = Workflow::new("wf", "Fill")
            .with_node(Node::new("t", "Start", "manualTrigger", 1))
            .with_node(Node::new("s", "Set", "set", 3))
            .connect("t", "s");

        let result = engine().build().check(&workflow).unwrap();
        assert!(result.is_valid);
        assert!(result.issues.is_empty());
        assert_eq!(result.quality_score, 100.0);
        assert_eq!(result.applied_fixes.len(), 1);
        let repaired = result.repaired_graph.as_ref().unwrap();
        assert_eq!(repaired.nodes[1].parameters["mode"].as_str(), Some("manual"));
        assert!(workflow.nodes[1].parameters.is_empty());
    }

    #[test]
    fn test_auto_fix_disabled() {
        let workflow = Workflow::new("wf", "Fill")
            .with_node(Node::new("t", "Start", "manualTrigger", 1))
            .with_node(Node::new("s", "Set", "set", 3))
            .connect("t", "s");

        let result = engine().auto_fix(false).build().check(&workflow).unwrap();
        assert!(result.repaired_graph.is_none());
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].auto_fixable);
        assert_eq!(result.quality_score, 95.0);
        assert!(std::ptr::eq(result.effective_graph(&workflow), &workflow));
    }

    #[test]
    fn test_dangling_connection_kept_when_removal_disallowed() {
        let workflow = Workflow::new("wf", "Dangling")
            .with_node(Node::new("t", "Start", "manualTrigger", 1))
            .connect("t", "gone");

        let result = engine()
            .remove_dangling_connections(false)
            .build()
            .check(&workflow)
            .unwrap();
        assert!(!result.is_valid);
        assert!(result.repaired_graph.is_none());
        assert!(matches!(
            result.issues[0].code,
            IssueCode::DanglingConnection { .. }
        ));
        assert_eq!(result.quality_score, 85.0);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
