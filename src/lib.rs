//! # Flowlint - Workflow Validation, Scoring and Repair Engine
//!
//! **Flowlint** checks machine-generated automation workflows before they are handed to an
//! external execution engine. A workflow is a directed graph of typed nodes; the engine
//! validates it against a registry of known node types, scores it, and repairs the
//! mechanical mistakes generators tend to make.
//!
//! ## Core Workflow
//!
//! The engine operates on a canonical internal model of a workflow graph:
//!
//! 1.  **Load a Registry**: Build a [`registry::NodeCatalog`] from JSON or with its builder. It is
//!     immutable and may be shared across threads.
//! 2.  **Convert to Flowlint's Model**: Parse the interchange format with [`interchange`], or
//!     implement [`graph::IntoWorkflow`] for your own structs.
//! 3.  **Check**: Use [`engine::Engine::builder`] to create an engine and call `check`. It
//!     validates, scores and, when something is repairable, repairs and re-validates.
//! 4.  **Export**: Write the effective graph back out with [`interchange::export_json`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowlint::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let registry = NodeCatalog::builder()
//!         .with_node_type(NodeTypeDefinition::new("webhookTrigger", 2).trigger())
//!         .with_node_type(
//!             NodeTypeDefinition::new("httpRequest", 4)
//!                 .required("url")
//!                 .required_with_default("method", "GET"),
//!         )
//!         .with_migration(Migration::new("httpRequest", Some(3), "httpRequest", 4))
//!         .build()?;
//!
//!     let workflow = Workflow::new("wf-1", "Fetch on webhook")
//!         .with_node(Node::new("hook", "Webhook", "webhookTrigger", 2))
//!         .with_node(
//!             Node::new("fetch", "Fetch", "httpRequest", 3)
//!                 .with_parameter("url", "https://example.com"),
//!         )
//!         .connect("hook", "fetch");
//!
//!     let engine = Engine::builder(Arc::new(registry)).build();
//!     let result = engine.check(&workflow)?;
//!
//!     println!("valid: {}, quality: {}", result.is_valid, result.quality_score);
//!     for fix in &result.applied_fixes {
//!         println!("  fixed: {}", fix.description);
//!     }
//!     let exported = export_json(result.effective_graph(&workflow))?;
//!     println!("{}", exported);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fixer;
pub mod graph;
pub mod interchange;
pub mod prelude;
pub mod registry;
pub mod scoring;
pub mod validator;
