//! Tool definition - schema and metadata for a tool.
//!
//! Defines the interface for a tool the planner can choose and the executor
//! can invoke. Parameters are declared as typed specs so that planned calls
//! can be checked structurally before anything runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON type a tool parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParameterType {
    /// JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns true if `value` has this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParameterType,
    pub required: bool,
    pub description: String,
}

/// Definition of a tool that can be planned and invoked.
///
/// # Examples
///
/// ```
/// use command_orchestrator::domain::tools::{ParameterType, ToolDefinition};
///
/// let def = ToolDefinition::new("send_message", "Send a message")
///     .with_parameter("content", ParameterType::String, "Message text", true)
///     .with_output_fields(["message_id"]);
///
/// assert_eq!(def.required_parameters().count(), 1);
/// assert!(def.produces("message_id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "lookup_contacts")
    name: String,

    /// Human-readable description for the planner prompt
    description: String,

    /// Declared parameters in prompt order
    parameters: Vec<ParameterSpec>,

    /// Fields this tool places in `ToolResult::data` for the next step
    output_fields: Vec<String>,
}

impl ToolDefinition {
    /// Creates a tool definition with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            output_fields: Vec::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            param_type,
            required,
            description: description.into(),
        });
        self
    }

    /// Declares the data fields the tool outputs.
    pub fn with_output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns all declared parameters.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a parameter spec by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Iterates over required parameters.
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Returns the declared output fields.
    pub fn output_fields(&self) -> &[String] {
        &self.output_fields
    }

    /// Returns true if the tool declares `field` as output.
    pub fn produces(&self, field: &str) -> bool {
        self.output_fields.iter().any(|f| f == field)
    }

    /// Renders the parameters as a JSON Schema object.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in &self.parameters {
            properties.insert(
                spec.name.clone(),
                json!({
                    "type": spec.param_type.as_str(),
                    "description": spec.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .required_parameters()
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Converts to OpenAI tool format.
    pub fn to_openai_format(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema()
            }
        })
    }
}
