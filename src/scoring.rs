//! Quality and complexity metrics.
//!
//! Both scores are pure functions of their inputs. Quality only ever goes down as
//! findings are added and is exactly 100 for a clean workflow; complexity only ever
//! goes up as the graph grows.

use crate::graph::Workflow;
use crate::validator::{IssueCounts, ValidationIssue};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const MAX_QUALITY: f64 = 100.0;
pub const MAX_COMPLEXITY: f64 = 10.0;

/// Weights used by the scoring engine.
///
/// Negative weights are treated as zero so the monotonicity guarantees hold for any
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringPolicy {
    pub error_penalty: f64,
    pub warning_penalty: f64,
    pub suggestion_penalty: f64,
    pub node_weight: f64,
    pub connection_weight: f64,
    pub distinct_type_weight: f64,
    pub branching_weight: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            error_penalty: 15.0,
            warning_penalty: 5.0,
            suggestion_penalty: 1.0,
            node_weight: 0.2,
            connection_weight: 0.1,
            distinct_type_weight: 0.3,
            branching_weight: 0.5,
        }
    }
}

/// Structural size of a workflow, the input to the complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub node_count: usize,
    pub connection_count: usize,
    pub distinct_node_types: usize,
    pub max_branching_factor: usize,
}

impl GraphMetrics {
    pub fn of(workflow: &Workflow) -> Self {
        Self {
            node_count: workflow.nodes.len(),
            connection_count: workflow.connections.len(),
            distinct_node_types: workflow.nodes.iter().map(|n| &n.node_type).unique().count(),
            max_branching_factor: workflow.max_branching_factor(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub quality: f64,
    pub complexity: f64,
}

impl ScoringPolicy {
    /// `100 - penalties`, clamped to `[0, 100]`.
    pub fn quality(&self, counts: IssueCounts) -> f64 {
        let penalty = counts.errors as f64 * self.error_penalty.max(0.0)
            + counts.warnings as f64 * self.warning_penalty.max(0.0)
            + counts.suggestions as f64 * self.suggestion_penalty.max(0.0);
        (MAX_QUALITY - penalty).clamp(0.0, MAX_QUALITY)
    }

    /// Weighted sum of the graph metrics, rounded to one decimal and clamped to `[0, 10]`.
    pub fn complexity(&self, metrics: GraphMetrics) -> f64 {
        let raw = metrics.node_count as f64 * self.node_weight.max(0.0)
            + metrics.connection_count as f64 * self.connection_weight.max(0.0)
            + metrics.distinct_node_types as f64 * self.distinct_type_weight.max(0.0)
            + metrics.max_branching_factor as f64 * self.branching_weight.max(0.0);
        ((raw * 10.0).round() / 10.0).clamp(0.0, MAX_COMPLEXITY)
    }

    pub fn score(&self, workflow: &Workflow, issues: &[ValidationIssue]) -> Scores {
        Scores {
            quality: self.quality(IssueCounts::of(issues)),
            complexity: self.complexity(GraphMetrics::of(workflow)),
        }
    }
}

/// Scores a workflow and its findings with the default policy.
pub fn score(workflow: &Workflow, issues: &[ValidationIssue]) -> Scores {
    ScoringPolicy::default().score(workflow, issues)
}
