use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{ToolError, ToolSafety, ToolSpec};

/// A single tool the model can call.
///
/// # Interaction
///
/// - **ToolRegistry**: stores tools by name; `ToolRegistry::call` dispatches here.
/// - **ToolNode**: calls through the registry and maps `ToolError` to an error tool result.
/// - **Routers**: read `safety()` through the registry to pick the safe or sensitive path.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name; the model refers to the tool by it.
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    fn safety(&self) -> ToolSafety {
        ToolSafety::Safe
    }

    /// Runs the tool. The returned text is what the model sees.
    async fn call(&self, args: Value) -> Result<String, ToolError>;
}
