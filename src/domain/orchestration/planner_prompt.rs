//! Planner prompt construction and reply parsing.
//!
//! The prompt is hierarchical: role, critical rules, a block that depends on
//! where the user is, usage patterns, the parameter mapping table, one worked
//! example and a list of anti-patterns. It is advisory only; the chain
//! validator decides what runs.

use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

use crate::domain::tools::names::{
    ANALYZE_CONVERSATION, ANALYZE_CONVERSATIONS_MULTI, LOOKUP_CONTACTS, RESOLVE_CONVERSATION,
    SEND_MESSAGE, SUMMARIZE_CONVERSATION,
};
use crate::domain::tools::{ToolCall, ToolDefinition};

use super::parameter_mapper::{self, REFERENCE_PREFIX};
use super::{AppContext, OrchestrationError, PreflightReport};

/// Inputs for one planning prompt.
#[derive(Debug, Clone, Copy)]
pub struct PlannerPrompt<'a> {
    pub tools: &'a [ToolDefinition],
    pub context: &'a AppContext,
    pub preflight: &'a PreflightReport,
    pub max_steps: usize,
}

impl<'a> PlannerPrompt<'a> {
    /// Builds the system prompt.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::with_capacity(4096);

        prompt.push_str(
            "# ROLE\n\
             You turn a user's command in a messaging app into a short chain of tool calls. \
             You only plan; the tools are executed by the system.\n\n",
        );

        let _ = write!(
            prompt,
            "# CRITICAL RULES\n\
             1. Emit at most {max} tool calls.\n\
             2. Never put the same tool twice in a row.\n\
             3. Never invent ids. Use \"{prefix}<field>\" to refer to the previous tool's output.\n\
             4. Never use template placeholders such as \"[contact_id]\" or \"<contact_id>\".\n\
             5. When a tool may need the user to choose (e.g. {lookup}), plan the remaining steps anyway; \
             the system pauses and resumes on its own.\n\
             6. Reply with JSON only: {{\"tools\": [{{\"tool\": \"name\", \"parameters\": {{...}}}}]}}\n\n",
            max = self.max_steps,
            prefix = REFERENCE_PREFIX,
            lookup = LOOKUP_CONTACTS,
        );

        prompt.push_str("# CURRENT CONTEXT\n");
        let _ = writeln!(prompt, "Screen: {}", self.context.current_screen);
        match self.context.conversation_id() {
            Some(id) if self.context.current_screen.is_conversation_view() => {
                let _ = write!(
                    prompt,
                    "The user is inside conversation \"{id}\". Use this id directly for \
                     {summarize}, {analyze} or {send} when the command refers to \"this\" \
                     conversation.\n\n",
                    id = id,
                    summarize = SUMMARIZE_CONVERSATION,
                    analyze = ANALYZE_CONVERSATION,
                    send = SEND_MESSAGE,
                );
            }
            _ => {
                let _ = write!(
                    prompt,
                    "No conversation is open. Route information questions to {multi}. \
                     Do NOT use {single} and do NOT ask the user to open a conversation first.\n\n",
                    multi = ANALYZE_CONVERSATIONS_MULTI,
                    single = ANALYZE_CONVERSATION,
                );
            }
        }

        if !self.preflight.warnings.is_empty() || !self.preflight.suggestions.is_empty() {
            prompt.push_str("# PRE-FLIGHT NOTES\n");
            for note in self
                .preflight
                .warnings
                .iter()
                .chain(self.preflight.suggestions.iter())
            {
                let _ = writeln!(prompt, "- {}", note);
            }
            prompt.push('\n');
        }

        let _ = write!(
            prompt,
            "# TOOL USAGE PATTERNS\n\
             - Message a person: {lookup} -> {send}\n\
             - Summarize a chat with a person: {lookup} -> {resolve} -> {summarize}\n\
             - Question about a chat with a person: {lookup} -> {resolve} -> {analyze}\n\
             - Question with no conversation open: {multi}\n\n",
            lookup = LOOKUP_CONTACTS,
            send = SEND_MESSAGE,
            resolve = RESOLVE_CONVERSATION,
            summarize = SUMMARIZE_CONVERSATION,
            analyze = ANALYZE_CONVERSATION,
            multi = ANALYZE_CONVERSATIONS_MULTI,
        );

        prompt.push_str("# PARAMETER MAPPING\nThese parameters are filled automatically from the previous step:\n");
        prompt.push_str("| from | to |\n|---|---|\n");
        prompt.push_str(&parameter_mapper::render_table());
        prompt.push_str("\n\n");

        let _ = write!(
            prompt,
            "# EXAMPLE\n\
             Command: \"Tell John I'm on my way\"\n\
             {{\"tools\": [\
             {{\"tool\": \"{lookup}\", \"parameters\": {{\"name\": \"John\"}}}}, \
             {{\"tool\": \"{send}\", \"parameters\": {{\"recipient_id\": \"{prefix}contact_id\", \"content\": \"I'm on my way\"}}}}\
             ]}}\n\n",
            lookup = LOOKUP_CONTACTS,
            send = SEND_MESSAGE,
            prefix = REFERENCE_PREFIX,
        );

        let _ = write!(
            prompt,
            "# ANTI-PATTERNS\n\
             - [{send}, {send}]: one message is one call.\n\
             - \"recipient_id\": \"[contact_id]\": placeholders are rejected.\n\
             - Including \"Tell John\" in the message content.\n\
             - {single} without a known conversation id.\n\
             - {lookup} when the user already chose a contact.\n\n",
            send = SEND_MESSAGE,
            single = ANALYZE_CONVERSATION,
            lookup = LOOKUP_CONTACTS,
        );

        prompt.push_str("# AVAILABLE TOOLS\n");
        let catalogue: Vec<Value> = self.tools.iter().map(ToolDefinition::to_openai_format).collect();
        prompt.push_str(
            &serde_json::to_string_pretty(&catalogue).unwrap_or_else(|_| "[]".to_string()),
        );
        prompt.push('\n');

        prompt
    }

    /// Builds the user message.
    pub fn user_message(command: &str) -> String {
        format!("Command: \"{}\"", command.trim())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanReply {
    Wrapped { tools: Vec<ToolCall> },
    Steps { steps: Vec<ToolCall> },
    Bare(Vec<ToolCall>),
}

/// Parses the planner's reply into tool calls.
///
/// Accepts `{"tools": [...]}`, `{"steps": [...]}` or a bare array, with or
/// without surrounding prose or code fences.
pub fn parse_plan(reply: &str) -> Result<Vec<ToolCall>, OrchestrationError> {
    let json = extract_json(reply).ok_or_else(|| {
        OrchestrationError::Planning("planner reply contained no JSON".to_string())
    })?;

    match serde_json::from_str::<PlanReply>(json) {
        Ok(PlanReply::Wrapped { tools }) => Ok(tools),
        Ok(PlanReply::Steps { steps }) => Ok(steps),
        Ok(PlanReply::Bare(tools)) => Ok(tools),
        Err(e) => Err(OrchestrationError::Planning(format!(
            "failed to parse plan JSON: {}",
            e
        ))),
    }
}

/// Extracts the outermost JSON object or array from text.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = match text.as_bytes()[start] {
        b'{' => '}',
        _ => ']',
    };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
