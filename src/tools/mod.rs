//! Tool registry: the startup-time, read-only collection of available tools.
//!
//! The registry maps a tool name to its descriptor (name, description,
//! input schema) and its handler. It is populated once at startup and
//! never mutated afterwards, so the name set served by `tools/list` and
//! the name set accepted by `tools/call` cannot diverge within a run.

pub mod builtin;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Arguments passed to a tool handler.
pub type ToolArgs = Map<String, Value>;

/// Content item produced by a tool handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

impl ToolContent {
    /// Creates a text content item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A tool definition as exposed in the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Errors that can occur while constructing the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool name was registered twice.
    #[error("duplicate tool name '{0}'")]
    DuplicateTool(String),
}

/// Errors that can occur while invoking a tool.
///
/// Unknown-tool lookups are a typed result, not a panic: the dispatch
/// loop turns this into an error response and keeps serving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// No tool with the requested name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

type Handler = Box<dyn Fn(&ToolArgs) -> Vec<ToolContent> + Send + Sync>;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Handler,
}

/// The in-memory tool registry.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. Registration order is the order `list` reports.
    ///
    /// # Errors
    ///
    /// Returns an error if a tool with the same name is already registered.
    pub fn register<F>(&mut self, descriptor: ToolDescriptor, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&ToolArgs) -> Vec<ToolContent> + Send + Sync + 'static,
    {
        if self.tools.iter().any(|t| t.descriptor.name == descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }
        self.tools.push(RegisteredTool {
            descriptor,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Returns all tool descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes the named tool with the given arguments.
    ///
    /// Absent arguments are treated as an empty map. Handlers report their
    /// own failures as text content; the only error this returns is an
    /// unknown tool name.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::UnknownTool`] if no tool has the given name.
    pub fn invoke(
        &self,
        name: &str,
        arguments: Option<&ToolArgs>,
    ) -> Result<Vec<ToolContent>, InvokeError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.descriptor.name == name)
            .ok_or_else(|| InvokeError::UnknownTool(name.to_string()))?;

        let empty = ToolArgs::new();
        let args = arguments.unwrap_or(&empty);
        Ok((tool.handler)(args))
    }
}
