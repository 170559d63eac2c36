use thiserror::Error;

/// Contract violations that abort an engine call before any issue is produced.
///
/// These describe inputs the engine refuses to reason about at all. Defects in an
/// otherwise well-formed workflow are reported as `ValidationIssue`s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Node at position {index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("Node '{node_id}' has an empty node type")]
    EmptyNodeType { node_id: String },

    #[error("Connection at position {index} has an empty endpoint")]
    EmptyConnectionEndpoint { index: usize },

    #[error("The node type registry contains no node types")]
    EmptyRegistry,
}

/// Errors that can occur while loading or assembling a node type catalog.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("Failed to parse registry JSON: {0}")]
    JsonParseError(String),

    #[error("Could not read registry file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Node type '{0}' is defined more than once")]
    DuplicateNodeType(String),

    #[error("Node type '{0}' has an empty name")]
    EmptyNodeType(String),

    #[error("Migration from '{from_type}' version {from_version:?} is defined more than once")]
    DuplicateMigration {
        from_type: String,
        from_version: Option<u32>,
    },

    #[error(
        "Migration from '{from_type}' targets '{to_type}' version {to_version}, which is not registered"
    )]
    UnknownMigrationTarget {
        from_type: String,
        to_type: String,
        to_version: u32,
    },
}

/// Errors raised while reading or writing the interchange workflow format.
#[derive(Error, Debug, Clone)]
pub enum InterchangeError {
    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to serialize workflow: {0}")]
    SerializeError(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Could not access workflow file '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors that can occur when converting a custom user format into a `Workflow`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised while loading an engine configuration file.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Failed to parse configuration JSON: {0}")]
    JsonParseError(String),

    #[error("Could not read configuration file '{path}': {message}")]
    Io { path: String, message: String },
}
