use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::tools::{Tool, ToolError, ToolSafety, ToolSpec};

/// Name → tool map.
///
/// Tools are held as `Arc<dyn Tool>` so one tool can sit in several registries (the
/// sensitive tool node holds every appointment tool, the safe one only the safe subset).
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool; replaces an existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Specs of all tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn safety(&self, name: &str) -> Option<ToolSafety> {
        self.tools.get(name).map(|t| t.safety())
    }

    /// True only for registered tools classified sensitive.
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.safety(name) == Some(ToolSafety::Sensitive)
    }

    /// Registry restricted to tools of one safety class.
    pub fn subset(&self, safety: ToolSafety) -> Self {
        Self {
            tools: self
                .tools
                .iter()
                .filter(|(_, t)| t.safety() == safety)
                .map(|(n, t)| (n.clone(), Arc::clone(t)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls a tool by name. Unknown names fail with `ToolError::NotFound`.
    pub async fn call(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(args).await
    }
}
