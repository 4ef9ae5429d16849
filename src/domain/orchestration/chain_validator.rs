//! Chain Validator - Structural checks on a proposed plan.
//!
//! Planner output is untrusted. Every plan passes through here before the
//! first tool runs, and every step is re-checked after parameter mapping.

use serde_json::Value;
use std::collections::HashMap;

use crate::domain::tools::{ToolCall, ToolDefinition};

use super::parameter_mapper::{self, collect_references};
use super::{ChainPlan, OrchestrationError, MAX_CHAIN_LENGTH};

/// Read access to tool schemas.
pub trait ToolSchemaLookup {
    /// Returns the definition of `name`, if registered.
    fn schema(&self, name: &str) -> Option<&ToolDefinition>;
}

impl ToolSchemaLookup for HashMap<String, ToolDefinition> {
    fn schema(&self, name: &str) -> Option<&ToolDefinition> {
        self.get(name)
    }
}

impl ToolSchemaLookup for [ToolDefinition] {
    fn schema(&self, name: &str) -> Option<&ToolDefinition> {
        self.iter().find(|d| d.name() == name)
    }
}

impl ToolSchemaLookup for Vec<ToolDefinition> {
    fn schema(&self, name: &str) -> Option<&ToolDefinition> {
        self.as_slice().schema(name)
    }
}

/// Returns true if `s` is a template placeholder such as `"[contact_id]"`,
/// `"<contact_id>"`, `"{contact_id}"` or `"{{contact_id}}"`.
pub fn is_placeholder(s: &str) -> bool {
    let s = s.trim();
    let inner = s
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .or_else(|| s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')))
        .or_else(|| s.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')))
        .or_else(|| s.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')));

    match inner.map(str::trim) {
        Some(name) => {
            let mut chars = name.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        None => false,
    }
}

/// Finds the first placeholder string in a value, recursively.
pub fn find_placeholder(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if is_placeholder(s) => Some(s.as_str()),
        Value::Array(items) => items.iter().find_map(find_placeholder),
        Value::Object(map) => map.values().find_map(find_placeholder),
        _ => None,
    }
}

/// Validates plans against tool schemas.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    max_length: usize,
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::new(MAX_CHAIN_LENGTH)
    }
}

impl ChainValidator {
    /// Creates a validator. The length cap never exceeds [`MAX_CHAIN_LENGTH`].
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.clamp(1, MAX_CHAIN_LENGTH),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validates a whole plan. Nothing has executed when this fails.
    pub fn validate(
        &self,
        plan: &ChainPlan,
        schemas: &dyn ToolSchemaLookup,
    ) -> Result<(), OrchestrationError> {
        if plan.is_empty() {
            return Err(OrchestrationError::EmptyPlan);
        }
        if plan.len() > self.max_length {
            return Err(OrchestrationError::ChainLengthExceeded {
                max: self.max_length,
                actual: plan.len(),
            });
        }
        for (index, pair) in plan.steps().windows(2).enumerate() {
            if pair[0].name() == pair[1].name() {
                return Err(OrchestrationError::DuplicateTool {
                    tool: pair[1].name().to_string(),
                    step: index + 2,
                });
            }
        }

        let mut previous: Option<&ToolDefinition> = None;
        for (index, call) in plan.steps().iter().enumerate() {
            let step = index + 1;
            let schema = schemas
                .schema(call.name())
                .ok_or_else(|| OrchestrationError::UnknownTool {
                    tool: call.name().to_string(),
                    step,
                })?;
            self.check_call(step, call, schema, previous)?;
            previous = Some(schema);
        }
        Ok(())
    }

    /// Re-checks a single call after its references have been resolved.
    ///
    /// At this point no reference tokens may remain and every required
    /// parameter must be physically present.
    pub fn validate_resolved(
        &self,
        step: usize,
        call: &ToolCall,
        schema: &ToolDefinition,
    ) -> Result<(), OrchestrationError> {
        for (name, value) in call.parameters() {
            let mut refs = Vec::new();
            collect_references(value, &mut refs);
            if let Some(field) = refs.first() {
                return Err(OrchestrationError::UnresolvedReference {
                    tool: call.name().to_string(),
                    parameter: name.clone(),
                    reference: format!("{}{}", parameter_mapper::REFERENCE_PREFIX, field),
                });
            }
        }
        self.check_call(step, call, schema, None)
    }

    fn check_call(
        &self,
        step: usize,
        call: &ToolCall,
        schema: &ToolDefinition,
        previous: Option<&ToolDefinition>,
    ) -> Result<(), OrchestrationError> {
        for (name, value) in call.parameters() {
            if let Some(placeholder) = find_placeholder(value) {
                return Err(OrchestrationError::Placeholder {
                    step,
                    tool: call.name().to_string(),
                    parameter: name.clone(),
                    value: placeholder.to_string(),
                });
            }

            let mut refs = Vec::new();
            collect_references(value, &mut refs);
            for field in refs {
                let reference = format!("{}{}", parameter_mapper::REFERENCE_PREFIX, field);
                match previous {
                    None => {
                        return Err(OrchestrationError::InvalidReference {
                            step,
                            tool: call.name().to_string(),
                            reference,
                            reason: "there is no previous step".to_string(),
                        })
                    }
                    Some(prev) if !prev.produces(field) => {
                        return Err(OrchestrationError::InvalidReference {
                            step,
                            tool: call.name().to_string(),
                            reason: format!("{} does not output '{}'", prev.name(), field),
                            reference,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for spec in schema.parameters() {
            match call.parameter(&spec.name) {
                Some(value) => {
                    let deferred = parameter_mapper::reference_field(value).is_some();
                    if !deferred && !spec.param_type.accepts(value) {
                        return Err(OrchestrationError::InvalidParameterType {
                            step,
                            tool: call.name().to_string(),
                            parameter: spec.name.clone(),
                            expected: spec.param_type,
                        });
                    }
                    if !deferred && value.as_str().is_some_and(|s| s.trim().is_empty()) && spec.required {
                        return Err(OrchestrationError::MissingParameter {
                            step,
                            tool: call.name().to_string(),
                            parameter: spec.name.clone(),
                        });
                    }
                }
                None if spec.required => {
                    let filled_by_mapper = previous.is_some_and(|prev| {
                        parameter_mapper::is_mapped(prev.name(), call.name(), &spec.name)
                    });
                    if !filled_by_mapper {
                        return Err(OrchestrationError::MissingParameter {
                            step,
                            tool: call.name().to_string(),
                            parameter: spec.name.clone(),
                        });
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::definitions::builtin_tools;
    use crate::domain::tools::names;
    use proptest::prelude::*;
    use serde_json::json;

    fn validate(steps: Vec<ToolCall>) -> Result<(), OrchestrationError> {
        ChainValidator::default().validate(&ChainPlan::from_planner(steps), &builtin_tools())
    }

    fn lookup(name: &str) -> ToolCall {
        ToolCall::new(names::LOOKUP_CONTACTS, json!({ "name": name }))
    }

    fn send(content: &str) -> ToolCall {
        ToolCall::new(
            names::SEND_MESSAGE,
            json!({"recipient_id": "$prev.contact_id", "content": content}),
        )
    }

    #[test]
    fn accepts_lookup_then_send() {
        assert!(validate(vec![lookup("John"), send("On my way")]).is_ok());
    }

    #[test]
    fn rejects_empty_plan() {
        assert_eq!(validate(vec![]), Err(OrchestrationError::EmptyPlan));
    }

    #[test]
    fn rejects_adjacent_duplicates() {
        let send_direct = ToolCall::new(
            names::SEND_MESSAGE,
            json!({"conversation_id": "c-1", "content": "hi"}),
        );
        let err = validate(vec![send_direct.clone(), send_direct]).unwrap_err();

        assert_eq!(
            err,
            OrchestrationError::DuplicateTool {
                tool: names::SEND_MESSAGE.to_string(),
                step: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_tool() {
        let err = validate(vec![ToolCall::new("open_camera", json!({}))]).unwrap_err();
        assert!(matches!(err, OrchestrationError::UnknownTool { step: 1, .. }));
    }

    #[test]
    fn rejects_missing_required_parameter() {
        let err = validate(vec![ToolCall::new(names::LOOKUP_CONTACTS, json!({}))]).unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::MissingParameter { ref parameter, .. } if parameter == "name"
        ));
    }

    #[test]
    fn rejects_blank_required_string() {
        let err = validate(vec![lookup("  ")]).unwrap_err();
        assert!(matches!(err, OrchestrationError::MissingParameter { .. }));
    }

    #[test]
    fn rejects_mistyped_parameter() {
        let call = ToolCall::new(names::GET_CONVERSATIONS, json!({"limit": "ten"}));
        let err = validate(vec![call]).unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidParameterType { .. }));
    }

    #[test]
    fn mapped_parameter_counts_as_present() {
        let summarize = ToolCall::new(names::SUMMARIZE_CONVERSATION, json!({}));
        let resolve = ToolCall::new(
            names::RESOLVE_CONVERSATION,
            json!({"contact_id": "$prev.contact_id"}),
        );
        assert!(validate(vec![lookup("Sam"), resolve, summarize]).is_ok());
    }

    #[test]
    fn rejects_placeholders_in_every_bracket_style() {
        for placeholder in ["[contact_id]", "<contact_id>", "{contact_id}", "{{contact_id}}"] {
            let call = ToolCall::new(
                names::SEND_MESSAGE,
                json!({"recipient_id": placeholder, "content": "hi"}),
            );
            let err = validate(vec![call]).unwrap_err();
            assert!(
                matches!(err, OrchestrationError::Placeholder { .. }),
                "{} was accepted",
                placeholder
            );
        }
    }

    #[test]
    fn rejects_reference_in_first_step() {
        let err = validate(vec![send("hi")]).unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidReference { step: 1, .. }));
    }

    #[test]
    fn rejects_reference_to_field_not_produced() {
        let call = ToolCall::new(
            names::SEND_MESSAGE,
            json!({"recipient_id": "$prev.phone_number", "content": "hi"}),
        );
        let err = validate(vec![lookup("John"), call]).unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidReference { step: 2, .. }));
    }

    #[test]
    fn validate_resolved_rejects_leftover_reference() {
        let validator = ChainValidator::default();
        let schema = crate::domain::tools::definitions::send_message_tool();
        let err = validator.validate_resolved(2, &send("hi"), &schema).unwrap_err();
        assert!(matches!(err, OrchestrationError::UnresolvedReference { .. }));
    }

    #[test]
    fn max_length_is_capped() {
        assert_eq!(ChainValidator::new(10).max_length(), MAX_CHAIN_LENGTH);
        assert_eq!(ChainValidator::new(0).max_length(), 1);
    }

    #[test]
    fn ordinary_text_is_not_a_placeholder() {
        assert!(!is_placeholder("I'm on my way"));
        assert!(!is_placeholder("{}"));
        assert!(!is_placeholder("<3"));
        assert!(!is_placeholder("$prev.contact_id"));
        assert!(is_placeholder(" [recipient] "));
    }

    fn tool_name() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(names::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn adjacent_duplicates_never_pass(names in proptest::collection::vec(tool_name(), 2..=3), at in 0usize..2) {
            let mut names = names;
            let at = at.min(names.len() - 2);
            names[at + 1] = names[at];
            let steps = names.iter().map(|n| ToolCall::new(*n, json!({}))).collect();

            let result = validate(steps);

            prop_assert!(
                matches!(result, Err(OrchestrationError::DuplicateTool { step, .. }) if step <= at + 2),
                "unexpected result: {:?}", result
            );
        }

        #[test]
        fn over_length_chains_never_pass(names in proptest::collection::vec(tool_name(), 4..8)) {
            let steps = names.iter().map(|n| ToolCall::new(*n, json!({}))).collect();
            let result = validate(steps);

            prop_assert!(
                matches!(result, Err(OrchestrationError::ChainLengthExceeded { max: 3, .. })),
                "unexpected result: {:?}", result
            );
        }

        #[test]
        fn bracketed_identifiers_are_placeholders(name in "[a-z_][a-z0-9_]{0,20}") {
            let bracketed = format!("[{}]", name);
            let angled = format!("<{}>", name);
            let braced = format!("{{{}}}", name);
            prop_assert!(is_placeholder(&bracketed));
            prop_assert!(is_placeholder(&angled));
            prop_assert!(is_placeholder(&braced));
        }
    }
}
