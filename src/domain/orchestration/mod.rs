//! Orchestration module - Planning, validation and execution state.
//!
//! Pure logic only. The application layer drives these pieces against the
//! tool registry and the AI provider.

mod app_context;
mod chain_plan;
mod chain_state;
pub mod chain_validator;
mod errors;
pub mod parameter_mapper;
mod planner_prompt;
mod preflight;
mod response;
mod resume;

pub use app_context::{AppContext, Screen};
pub use chain_plan::{ChainPlan, PlanSource, MAX_CHAIN_LENGTH};
pub use chain_state::ChainState;
pub use chain_validator::{ChainValidator, ToolSchemaLookup};
pub use errors::OrchestrationError;
pub use planner_prompt::{parse_plan, PlannerPrompt};
pub use preflight::{is_information_query, preflight, PreflightReport, MAX_COMMAND_LENGTH};
pub use response::{CommandResponse, ResponseAction};
pub use resume::{build_resume, selection_data, ResumeOutcome};
