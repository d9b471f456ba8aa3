//! The static tool registry
//!
//! Built once at startup and shared read-only by the executor and the router.

use super::definition::{FieldKind, ParameterSchema, ToolDescriptor};

/// Tool id of the log search tool
pub const SCAN_LOGS: &str = "scan_logs";

/// Ordered set of tool descriptors
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The tools every gateway exposes
    pub fn builtin() -> Self {
        let operands = |first: &str, second: &str| {
            ParameterSchema::new()
                .required("num1", FieldKind::Number, Some(first))
                .required("num2", FieldKind::Number, Some(second))
        };

        Self::new()
            .with_tool(
                ToolDescriptor::new("add", "addition", "Adds two numbers together")
                    .with_parameters(operands("First number to add", "Second number to add")),
            )
            .with_tool(
                ToolDescriptor::new("subtract", "subtraction", "Subtracts second number from first number")
                    .with_parameters(operands("Number to subtract from", "Number to subtract")),
            )
            .with_tool(
                ToolDescriptor::new("multiply", "multiplication", "Multiplies two numbers together").with_parameters(
                    ParameterSchema::new()
                        .required("num1", FieldKind::Number, None)
                        .required("num2", FieldKind::Number, None),
                ),
            )
            .with_tool(
                ToolDescriptor::new("divide", "division", "Divides first number by second number")
                    .with_parameters(operands("Number to divide", "Number to divide by")),
            )
            .with_tool(
                ToolDescriptor::new("power", "power", "Raises first number to the power of second number")
                    .with_parameters(operands("Base number", "Exponent")),
            )
            .with_tool(
                ToolDescriptor::new(
                    SCAN_LOGS,
                    "cloudwatch_logs",
                    "Scans AWS CloudWatch logs for specific string patterns",
                )
                .with_parameters(
                    ParameterSchema::new()
                        .required(
                            "logGroupName",
                            FieldKind::String,
                            Some("Name of the CloudWatch log group"),
                        )
                        .required(
                            "searchString",
                            FieldKind::String,
                            Some("String pattern to search for in logs"),
                        )
                        .optional(
                            "startTime",
                            FieldKind::Number,
                            Some("Start time in milliseconds since epoch"),
                        )
                        .optional("endTime", FieldKind::Number, Some("End time in milliseconds since epoch")),
                ),
            )
    }

    /// Append a tool; later registrations with the same id are ignored
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        if !self.contains(&tool.id) {
            self.tools.push(tool);
        }
        self
    }

    /// All tools in registration order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Get a tool by id
    pub fn get(&self, id: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Check if a tool exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
