//! Read-only catalogue of known node types.
//!
//! The engine never owns a registry: every entry point takes an explicit handle to
//! something implementing [`NodeTypeRegistry`]. A registry is loaded once and is
//! then shared, unmodified, across any number of concurrent engine calls.

pub mod catalog;
pub mod definition;

pub use catalog::*;
pub use definition::*;

/// Lookup contract the engine needs from a node type catalogue.
///
/// Implementations must be immutable once published. Tests usually implement this on a
/// small fake; production code typically uses [`NodeCatalog`].
pub trait NodeTypeRegistry: Send + Sync {
    /// The current definition of a node type, if the type is known.
    fn lookup(&self, node_type: &str) -> Option<&NodeTypeDefinition>;

    /// A migration applicable to a node of `node_type` at `version`.
    ///
    /// Version-specific migrations take precedence over type-wide ones.
    fn migration(&self, node_type: &str, version: u32) -> Option<&Migration>;

    /// Number of registered node types.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_trigger(&self, node_type: &str) -> bool {
        self.lookup(node_type).is_some_and(|def| def.trigger)
    }

    /// Trigger or terminal type; such nodes are never reported as orphans.
    fn is_boundary(&self, node_type: &str) -> bool {
        self.lookup(node_type).is_some_and(NodeTypeDefinition::is_boundary)
    }
}
