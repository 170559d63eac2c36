//! Common test utilities: a sample registry and workflow builders.
use flowlint::prelude::*;
use std::sync::Arc;

/// A small registry modelled on the node types a generator typically emits.
#[allow(dead_code)]
pub const REGISTRY_JSON: &str = r#"{
    "nodeTypes": [
        { "type": "webhookTrigger", "version": 1, "trigger": true },
        { "type": "manualTrigger", "version": 1, "trigger": true },
        { "type": "httpRequest", "version": 4, "parameters": [
            { "name": "url", "required": true },
            { "name": "method", "required": true, "default": "GET" },
            { "name": "timeout", "required": false, "default": 30 }
        ]},
        { "type": "set", "version": 3, "parameters": [
            { "name": "mode", "required": true, "default": "manual" }
        ]},
        { "type": "code", "version": 2, "parameters": [
            { "name": "jsCode", "required": true },
            { "name": "language", "required": true, "default": "javaScript" }
        ]},
        { "type": "slack", "version": 2, "terminal": true, "parameters": [
            { "name": "channel", "required": true },
            { "name": "text", "required": true, "default": "" }
        ]}
    ],
    "migrations": [
        { "fromType": "httpRequest", "fromVersion": 3, "toType": "httpRequest", "toVersion": 4 },
        { "fromType": "function", "toType": "code", "toVersion": 2,
          "renameParameters": { "functionCode": "jsCode" } }
    ]
}"#;

#[allow(dead_code)]
pub fn create_registry() -> NodeCatalog {
    NodeCatalog::from_json(REGISTRY_JSON).expect("Failed to parse test registry")
}

#[allow(dead_code)]
pub fn create_engine() -> Engine {
    Engine::new(Arc::new(create_registry()))
}

/// Webhook -> HTTP request -> Slack, with every required parameter present.
#[allow(dead_code)]
pub fn create_clean_workflow() -> Workflow {
    Workflow::new("wf-clean", "Forward webhook")
        .with_description("Posts every webhook payload to an API and reports to Slack")
        .with_node(Node::new("hook", "Webhook", "webhookTrigger", 1))
        .with_node(
            Node::new("fetch", "Fetch", "httpRequest", 4)
                .with_parameter("url", "https://api.example.com")
                .with_parameter("method", "POST"),
        )
        .with_node(
            Node::new("notify", "Notify", "slack", 2)
                .with_parameter("channel", "#ops")
                .with_parameter("text", "done"),
        )
        .connect("hook", "fetch")
        .connect("fetch", "notify")
}

/// A workflow carrying one instance of every repairable defect.
#[allow(dead_code)]
pub fn create_messy_workflow() -> Workflow {
    Workflow::new("wf-messy", "Generated draft")
        .with_node(Node::new("n1", "Webhook", "webhookTrigger", 1))
        .with_node(Node::new("n2", "Fetch", "httpRequest", 3).with_parameter("url", "https://x.io"))
        .with_node(Node::new("n2", "Prepare", "set", 3))
        .with_node(Node::new("n3", "Script", "function", 1).with_parameter("functionCode", "return items"))
        .with_node(Node::new("n4", "Notify", "slack", 2).with_parameter("channel", "#ops"))
        .connect("n1", "n2")
        .connect("n2", "n3")
        .connect("n3", "n4")
        .connect("n3", "deleted-node")
}

/// A workflow whose defects the fixer cannot repair.
#[allow(dead_code)]
pub fn create_broken_workflow() -> Workflow {
    Workflow::new("wf-broken", "Unrepairable")
        .with_node(Node::new("a", "Mystery", "mysteryNode", 1))
        .with_node(Node::new("b", "Fetch", "httpRequest", 4))
        .connect("a", "b")
}
