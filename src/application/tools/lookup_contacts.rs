//! lookup_contacts - fuzzy contact resolution.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::ErrorInfo;
use crate::domain::matching::{resolve, FuzzyThresholds, Resolution};
use crate::domain::messaging::Contact;
use crate::domain::tools::{
    definitions, reasons, ClarificationOption, ClarificationPayload, ToolCall, ToolDefinition,
    ToolResult,
};
use crate::ports::{ContactDirectory, ToolContext, ToolExecutionError, ToolHandler};

use super::{recover, required_str};

/// Resolves a spoken name to one contact, or asks which one was meant.
pub struct LookupContactsTool {
    directory: Arc<dyn ContactDirectory>,
    thresholds: FuzzyThresholds,
}

impl LookupContactsTool {
    pub fn new(directory: Arc<dyn ContactDirectory>, thresholds: FuzzyThresholds) -> Self {
        Self {
            directory,
            thresholds,
        }
    }

    async fn run(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        let name = required_str(call, "name")?;
        let contacts = self.directory.list_contacts(&ctx.user_id).await?;

        let result = match resolve(name, contacts, |c: &Contact| c.display_name.as_str(), &self.thresholds) {
            Resolution::Resolved(found) => {
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    contact_id = %found.candidate.id,
                    score = found.score,
                    "Contact resolved"
                );
                ToolResult::continue_or_complete(
                    json!({
                        "contact_id": found.candidate.id.as_str(),
                        "display_name": found.candidate.display_name,
                        "confidence": found.score,
                    }),
                    ctx.remaining_steps,
                )
            }
            Resolution::Ambiguous(matches) => {
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    candidates = matches.len(),
                    "Contact name is ambiguous"
                );
                let options = matches
                    .into_iter()
                    .map(|m| {
                        let subtitle = m.candidate.subtitle();
                        ClarificationOption::new(
                            m.candidate.id.as_str(),
                            m.candidate.display_name,
                            subtitle,
                            m.score,
                        )
                    })
                    .collect();
                ToolResult::clarification_needed(ClarificationPayload::new(
                    reasons::AMBIGUOUS_CONTACT,
                    options,
                ))
            }
            Resolution::NotFound => ToolResult::failure(
                ErrorInfo::not_found(format!("No contact matches \"{}\"", name))
                    .with_suggestion("Check the spelling or use the contact's full name"),
            ),
        };
        Ok(result)
    }
}

#[async_trait]
impl ToolHandler for LookupContactsTool {
    fn definition(&self) -> ToolDefinition {
        definitions::lookup_contacts_tool()
    }

    async fn handle(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, ToolExecutionError> {
        self.run(call, ctx).await.or_else(recover)
    }
}
