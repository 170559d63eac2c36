//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowlint crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowlint::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let registry = NodeCatalog::from_file("path/to/registry.json")?;
//! let workflow = load_workflow_file("path/to/workflow.json")?;
//!
//! let engine = Engine::builder(Arc::new(registry))
//!     .with_config(EngineConfig::from_file("path/to/flowlint.json")?)
//!     .build();
//! let result = engine.check(&workflow)?;
//!
//! for issue in &result.issues {
//!     println!("{}", issue);
//! }
//! # Ok(())
//! # }
//! ```

// Engine and configuration
pub use crate::config::EngineConfig;
pub use crate::engine::{Engine, EngineBuilder, ValidationResult};

// Graph model
pub use crate::graph::{Connection, IntoWorkflow, Node, ParamValue, Workflow};

// Registry
pub use crate::registry::{
    Migration, NodeCatalog, NodeTypeDefinition, NodeTypeRegistry, ParameterSpec,
};

// Individual stages
pub use crate::fixer::{AppliedFix, AutoFixOutcome, FixAction, auto_fix};
pub use crate::scoring::{Scores, ScoringPolicy, score};
pub use crate::validator::{
    IssueCode, IssueKind, ValidationIssue, ValidationReport, ValidationRule, Validator, validate,
};

// Interchange
pub use crate::interchange::{export_json, import_json, load_workflow, load_workflow_file};

// Error types
pub use crate::error::{
    ConfigError, ConversionError, InputError, InterchangeError, RegistryError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
