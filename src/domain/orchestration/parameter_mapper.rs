//! Parameter Mapper - Deterministic propagation of step outputs.
//!
//! A fixed table says which output field of one tool feeds which parameter
//! of the next. Before step *i+1* runs, `$prev.<field>` tokens are replaced
//! with values from step *i*'s data and any table-mapped parameter the plan
//! left out is filled in. The model never performs this wiring.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::domain::tools::names::{
    ANALYZE_CONVERSATION, GET_CONVERSATIONS, GET_MESSAGES, LOOKUP_CONTACTS, RESOLVE_CONVERSATION,
    SEND_MESSAGE, SUMMARIZE_CONVERSATION,
};
use crate::domain::tools::ToolCall;

use super::OrchestrationError;

/// Prefix of a reference token, e.g. `"$prev.contact_id"`.
pub const REFERENCE_PREFIX: &str = "$prev.";

/// One row of the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterMapping {
    pub from_tool: &'static str,
    pub from_field: &'static str,
    pub to_tool: &'static str,
    pub to_parameter: &'static str,
}

const fn mapping(
    from_tool: &'static str,
    from_field: &'static str,
    to_tool: &'static str,
    to_parameter: &'static str,
) -> ParameterMapping {
    ParameterMapping {
        from_tool,
        from_field,
        to_tool,
        to_parameter,
    }
}

/// The mapping table.
pub const PARAMETER_MAPPINGS: [ParameterMapping; 8] = [
    mapping(LOOKUP_CONTACTS, "contact_id", SEND_MESSAGE, "recipient_id"),
    mapping(LOOKUP_CONTACTS, "contact_id", RESOLVE_CONVERSATION, "contact_id"),
    mapping(RESOLVE_CONVERSATION, "conversation_id", SUMMARIZE_CONVERSATION, "conversation_id"),
    mapping(RESOLVE_CONVERSATION, "conversation_id", ANALYZE_CONVERSATION, "conversation_id"),
    mapping(RESOLVE_CONVERSATION, "conversation_id", GET_MESSAGES, "conversation_id"),
    mapping(RESOLVE_CONVERSATION, "conversation_id", SEND_MESSAGE, "conversation_id"),
    mapping(GET_CONVERSATIONS, "conversation_id", SUMMARIZE_CONVERSATION, "conversation_id"),
    mapping(GET_CONVERSATIONS, "conversation_id", GET_MESSAGES, "conversation_id"),
];

/// Table rows indexed by source tool, then target tool.
static BY_TOOL_PAIR: Lazy<HashMap<&'static str, HashMap<&'static str, Vec<ParameterMapping>>>> =
    Lazy::new(|| {
        let mut index: HashMap<_, HashMap<_, Vec<_>>> = HashMap::new();
        for row in PARAMETER_MAPPINGS {
            index
                .entry(row.from_tool)
                .or_default()
                .entry(row.to_tool)
                .or_default()
                .push(row);
        }
        index
    });

/// Returns the rows wiring `from_tool` into `to_tool`.
pub fn mappings_between(from_tool: &str, to_tool: &str) -> &'static [ParameterMapping] {
    BY_TOOL_PAIR
        .get(from_tool)
        .and_then(|targets| targets.get(to_tool))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Returns true if the table fills `to_tool.parameter` from `from_tool`.
pub fn is_mapped(from_tool: &str, to_tool: &str, parameter: &str) -> bool {
    mappings_between(from_tool, to_tool)
        .iter()
        .any(|m| m.to_parameter == parameter)
}

/// Extracts the field name from a reference token.
pub fn reference_field(value: &Value) -> Option<&str> {
    value
        .as_str()
        .map(str::trim)
        .and_then(|s| s.strip_prefix(REFERENCE_PREFIX))
}

/// Collects every reference token in a value, recursively.
pub fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(_) => {
            if let Some(field) = reference_field(value) {
                out.push(field);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_references(v, out)),
        _ => {}
    }
}

/// Renders the table for the planner prompt.
pub fn render_table() -> String {
    PARAMETER_MAPPINGS
        .iter()
        .map(|m| {
            format!(
                "| {}.{} | {}.{} |",
                m.from_tool, m.from_field, m.to_tool, m.to_parameter
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves a call against the previous step's output.
///
/// Replaces reference tokens (at any depth) and fills absent table-mapped
/// parameters. Explicit values in the plan win over the table.
pub fn resolve_call(
    call: &ToolCall,
    previous_tool: &str,
    previous_data: &Map<String, Value>,
) -> Result<ToolCall, OrchestrationError> {
    let mut resolved = ToolCall::new(call.name(), Value::Object(Map::new()));

    for (name, value) in call.parameters() {
        let value = substitute(value, previous_data).map_err(|reference| {
            OrchestrationError::UnresolvedReference {
                tool: call.name().to_string(),
                parameter: name.clone(),
                reference,
            }
        })?;
        resolved.set_parameter(name.clone(), value);
    }

    for row in mappings_between(previous_tool, call.name()) {
        if resolved.parameter(row.to_parameter).is_some() {
            continue;
        }
        if let Some(value) = previous_data.get(row.from_field).filter(|v| !v.is_null()) {
            resolved.set_parameter(row.to_parameter, value.clone());
        }
    }

    Ok(resolved)
}

/// Replaces reference tokens; on failure returns the offending token.
fn substitute(value: &Value, data: &Map<String, Value>) -> Result<Value, String> {
    match value {
        Value::String(s) => match reference_field(value) {
            Some(field) => data
                .get(field)
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or_else(|| s.trim().to_string()),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|v| substitute(v, data))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| substitute(v, data).map(|v| (k.clone(), v)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        _ => Ok(value.clone()),
    }
}
