//! The built-in demo tools: `get_current_time`, `calculate`, `echo`.
//!
//! Handler failures (bad expression, missing argument) are reported as
//! text content in a successful response, never as protocol errors. The
//! registry stays read-only after this module populates it.

use chrono::Local;
use serde_json::json;

use crate::calc;
use crate::tools::{RegistryError, ToolContent, ToolDescriptor, ToolRegistry};

/// Builds the registry of built-in tools.
///
/// # Errors
///
/// Returns an error if the tool set contains a duplicate name. This is a
/// startup-time failure; the process exits non-zero on it.
pub fn registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    registry.register(
        ToolDescriptor {
            name: "get_current_time".to_string(),
            description: "Get the current time".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "description": "Timezone (optional)"
                    }
                }
            }),
        },
        |args| {
            let timezone = args
                .get("timezone")
                .and_then(|v| v.as_str())
                .unwrap_or("local");
            // The timezone is a label only; the clock reading is not
            // converted (see DESIGN.md).
            let now = Local::now().format("%Y-%m-%d %H:%M:%S");
            tracing::info!(timezone, "Returning current time");
            vec![ToolContent::text(format!(
                "Current time ({timezone}): {now}"
            ))]
        },
    )?;

    registry.register(
        ToolDescriptor {
            name: "calculate".to_string(),
            description: "Perform basic calculations".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Math expression to evaluate"
                    }
                },
                "required": ["expression"]
            }),
        },
        |args| {
            let expression = args
                .get("expression")
                .and_then(|v| v.as_str())
                .unwrap_or("");

            if expression.trim().is_empty() {
                return vec![ToolContent::text("No expression provided")];
            }

            tracing::info!(expression, "Calculating");
            let text = match calc::evaluate(expression) {
                Ok(value) => format!(
                    "Expression: {expression}\nResult: {}",
                    calc::format_value(value)
                ),
                Err(e) => format!("Error calculating '{expression}': {e}"),
            };
            vec![ToolContent::text(text)]
        },
    )?;

    registry.register(
        ToolDescriptor {
            name: "echo".to_string(),
            description: "Echo back the input text".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to echo back"
                    }
                },
                "required": ["text"]
            }),
        },
        |args| {
            let text = args.get("text").and_then(|v| v.as_str()).unwrap_or("");
            vec![ToolContent::text(format!("Echo: {text}"))]
        },
    )?;

    Ok(registry)
}
