use super::definition::Workflow;
use crate::error::ConversionError;

/// A trait for custom data models that can be converted into a flowlint `Workflow`.
///
/// Generators rarely emit the engine's native model directly. Implementing this trait on
/// the generator's own structs provides the translation layer, and keeps the engine
/// agnostic of where a workflow came from.
///
/// # Example
///
/// ```rust,no_run
/// use flowlint::prelude::*;
///
/// struct Step { key: String, kind: String }
/// struct Plan { title: String, steps: Vec<Step> }
///
/// impl IntoWorkflow for Plan {
///     fn into_workflow(self) -> std::result::Result<Workflow, ConversionError> {
///         let mut workflow = Workflow::new("plan", self.title);
///         let mut previous: Option<String> = None;
///         for step in self.steps {
///             if step.key.is_empty() {
///                 return Err(ConversionError::ValidationError("step without key".to_string()));
///             }
///             workflow = workflow.with_node(Node::new(&step.key, &step.key, step.kind, 1));
///             if let Some(prev) = previous.replace(step.key.clone()) {
///                 workflow = workflow.connect(&prev, &step.key);
///             }
///         }
///         Ok(workflow)
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a workflow graph.
    fn into_workflow(self) -> Result<Workflow, ConversionError>;
}

impl IntoWorkflow for Workflow {
    fn into_workflow(self) -> Result<Workflow, ConversionError> {
        Ok(self)
    }
}
