//! Tool Registry - Central registry of executable tools.
//!
//! Tools are registered once at startup together with their handler. The
//! name in the handler's definition is the unique key; there is no removal.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(LookupContactsTool::new(directory, thresholds)))?;
//!
//! let handler = registry.get("lookup_contacts")?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::orchestration::ToolSchemaLookup;
use crate::domain::tools::ToolDefinition;
use crate::ports::ToolHandler;

/// Errors raised by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Tool '{0}' is not registered")]
    NotFound(String),
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Registry of tool handlers keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    /// Registration order, used for prompt rendering
    order: Vec<String>,
}

impl ToolRegistry {
    /// Creates a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its definition's name.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let definition = handler.definition();
        let name = definition.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.order.push(name.clone());
        self.tools.insert(name, RegisteredTool { definition, handler });
        Ok(())
    }

    /// Gets a handler by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ToolHandler>, RegistryError> {
        self.tools
            .get(name)
            .map(|tool| Arc::clone(&tool.handler))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Gets a tool definition by name.
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|tool| &tool.definition)
    }

    /// Checks if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.definition(name).cloned())
            .collect()
    }

    /// All registered tool names in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Returns the number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl ToolSchemaLookup for ToolRegistry {
    fn schema(&self, name: &str) -> Option<&ToolDefinition> {
        self.definition(name)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}
