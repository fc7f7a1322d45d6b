use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::{DatabaseError, PropertyDatabase};
use crate::tools::{str_arg, Tool, ToolCatalog, ToolDefinition, ToolError, ToolSafety, ToolSpec};

pub const TOOL_GET_LISTING_DETAILS: &str = "get_listing_details";

/// Looks up one listing by id. Safe; run by the main agent's tool node.
pub struct GetListingDetailsTool {
    def: ToolDefinition,
    db: Arc<dyn PropertyDatabase>,
}

impl GetListingDetailsTool {
    pub fn new(catalog: &ToolCatalog, db: Arc<dyn PropertyDatabase>) -> Result<Self, ToolError> {
        Ok(Self {
            def: catalog.definition(TOOL_GET_LISTING_DETAILS)?,
            db,
        })
    }
}

#[async_trait]
impl Tool for GetListingDetailsTool {
    fn name(&self) -> &str {
        TOOL_GET_LISTING_DETAILS
    }

    fn spec(&self) -> ToolSpec {
        self.def.spec.clone()
    }

    fn safety(&self) -> ToolSafety {
        self.def.safety
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let id = str_arg(&args, "listing_id")?;
        match self.db.get(id).await {
            Ok(listing) => serde_json::to_string_pretty(&listing)
                .map_err(|e| ToolError::Execution(e.to_string())),
            Err(DatabaseError::NotFound(id)) => {
                Err(ToolError::Execution(format!("no listing with id {}", id)))
            }
            Err(e) => Err(ToolError::Execution(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryPropertyDatabase;
    use serde_json::json;

    fn tool() -> GetListingDetailsTool {
        GetListingDetailsTool::new(
            &ToolCatalog::load().unwrap(),
            Arc::new(InMemoryPropertyDatabase::with_samples()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_listing_json() {
        let out = tool().call(json!({"listing_id": "L-1002"})).await.unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["address"], "88 Rainey St #1204");
    }

    #[tokio::test]
    async fn unknown_or_missing_id_is_an_error() {
        assert!(matches!(
            tool().call(json!({"listing_id": "L-0"})).await,
            Err(ToolError::Execution(m)) if m.contains("L-0")
        ));
        assert!(matches!(
            tool().call(json!({})).await,
            Err(ToolError::InvalidInput(_))
        ));
    }
}
