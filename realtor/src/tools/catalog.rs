//! YAML-backed tool definitions.
//!
//! Each tool has one file under `realtor/tools/*.yaml`, embedded at compile time via
//! `include_str!` and parsed with `serde_yaml`. The YAML is the single place a tool's
//! description, argument schema and safety classification are declared. Add a line to
//! `TOOL_YAML_FILES` when adding a tool YAML.

use std::collections::HashMap;

use serde::Deserialize;

use crate::tools::{ToolError, ToolSafety, ToolSpec};

macro_rules! embed_tool_yaml {
    ($($path:literal),+ $(,)?) => {
        &[ $( include_str!($path) ),+ ]
    };
}

const TOOL_YAML_FILES: &[&str] = embed_tool_yaml!(
    "../../tools/to_search_criteria_agent.yaml",
    "../../tools/to_appointment_agent.yaml",
    "../../tools/get_listing_details.yaml",
    "../../tools/get_availability.yaml",
    "../../tools/list_appointments.yaml",
    "../../tools/book_appointment.yaml",
    "../../tools/cancel_appointment.yaml",
    "../../tools/reschedule_appointment.yaml",
);

/// One tool as declared in YAML: its spec plus its safety class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolDefinition {
    #[serde(flatten)]
    pub spec: ToolSpec,
    #[serde(default)]
    pub safety: ToolSafety,
}

/// Parsed tool definitions keyed by name.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    by_name: HashMap<String, ToolDefinition>,
}

impl ToolCatalog {
    /// Parses the embedded YAML files.
    pub fn load() -> Result<Self, ToolError> {
        Self::parse(TOOL_YAML_FILES)
    }

    fn parse(files: &[&str]) -> Result<Self, ToolError> {
        let mut by_name = HashMap::with_capacity(files.len());
        for (i, yaml) in files.iter().enumerate() {
            let def: ToolDefinition = serde_yaml::from_str(yaml).map_err(|e| {
                ToolError::InvalidInput(format!("tool yaml #{}: {}", i, e))
            })?;
            if by_name.insert(def.spec.name.clone(), def).is_some() {
                return Err(ToolError::InvalidInput(format!(
                    "tool yaml #{} redeclares an existing tool",
                    i
                )));
            }
        }
        Ok(Self { by_name })
    }

    pub fn definition(&self, name: &str) -> Result<ToolDefinition, ToolError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    pub fn spec(&self, name: &str) -> Result<ToolSpec, ToolError> {
        self.definition(name).map(|d| d.spec)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
