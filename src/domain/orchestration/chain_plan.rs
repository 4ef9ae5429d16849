//! Chain plan - the ordered tool calls for one invocation.

use serde::{Deserialize, Serialize};

use crate::domain::tools::ToolCall;

/// Upper bound on plan length.
pub const MAX_CHAIN_LENGTH: usize = 3;

/// Where a plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Emitted by the planning model
    Planner,
    /// Rebuilt deterministically from a clarification answer
    ClarificationResume,
}

/// Ordered sequence of tool calls.
///
/// Construction does not validate; run the plan through
/// [`ChainValidator`](super::ChainValidator) before executing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainPlan {
    steps: Vec<ToolCall>,
    source: PlanSource,
}

impl ChainPlan {
    pub fn new(steps: Vec<ToolCall>, source: PlanSource) -> Self {
        Self { steps, source }
    }

    /// Plan emitted by the planner.
    pub fn from_planner(steps: Vec<ToolCall>) -> Self {
        Self::new(steps, PlanSource::Planner)
    }

    /// Plan rebuilt on clarification resume.
    pub fn from_resume(steps: Vec<ToolCall>) -> Self {
        Self::new(steps, PlanSource::ClarificationResume)
    }

    pub fn steps(&self) -> &[ToolCall] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&ToolCall> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn source(&self) -> PlanSource {
        self.source
    }

    /// Tool names in order, for logging.
    pub fn tool_names(&self) -> Vec<&str> {
        self.steps.iter().map(ToolCall::name).collect()
    }

    /// The final planned tool.
    pub fn last_tool(&self) -> Option<&str> {
        self.steps.last().map(ToolCall::name)
    }
}
