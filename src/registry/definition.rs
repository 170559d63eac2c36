use crate::graph::ParamValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalogue entry describing the current version of a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDefinition {
    #[serde(rename = "type")]
    pub node_type: String,
    /// The current version; nodes below it are outdated.
    pub version: u32,
    /// Entry point of a workflow (webhook, schedule, manual start...).
    #[serde(default)]
    pub trigger: bool,
    /// Sink that legitimately has no outgoing connections.
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl NodeTypeDefinition {
    pub fn new(node_type: impl Into<String>, version: u32) -> Self {
        Self {
            node_type: node_type.into(),
            version,
            trigger: false,
            terminal: false,
            parameters: Vec::new(),
        }
    }

    pub fn trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            required: true,
            default: None,
        });
        self
    }

    pub fn required_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<ParamValue>,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            required: true,
            default: Some(default.into()),
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, default: Option<ParamValue>) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            required: false,
            default,
        });
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Exempt from the orphan rule.
    pub fn is_boundary(&self) -> bool {
        self.trigger || self.terminal
    }
}

/// Schema of a single node parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParameterSpec {
    /// The default value, if it is one that actually fills the parameter.
    pub fn usable_default(&self) -> Option<&ParamValue> {
        self.default.as_ref().filter(|value| !value.is_empty())
    }
}

/// A rewrite from a legacy node type/version to a newer one.
///
/// `from_version: None` matches every version of `from_type`, which is how renamed or
/// removed node types are mapped onto their replacements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    pub from_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_version: Option<u32>,
    pub to_type: String,
    pub to_version: u32,
    /// Old parameter name -> new parameter name.
    #[serde(default)]
    pub rename_parameters: BTreeMap<String, String>,
}

impl Migration {
    pub fn new(
        from_type: impl Into<String>,
        from_version: Option<u32>,
        to_type: impl Into<String>,
        to_version: u32,
    ) -> Self {
        Self {
            from_type: from_type.into(),
            from_version,
            to_type: to_type.into(),
            to_version,
            rename_parameters: BTreeMap::new(),
        }
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_parameters.insert(from.into(), to.into());
        self
    }
}
