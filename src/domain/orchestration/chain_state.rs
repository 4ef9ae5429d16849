//! Chain execution lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a chain within one invocation.
///
/// Valid transitions:
/// - Planned -> Running
/// - Running -> Clarifying | Complete | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    #[default]
    Planned,
    Running,
    Clarifying,
    Complete,
    Failed,
}

impl StateMachine for ChainState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ChainState::*;
        matches!(
            (self, target),
            (Planned, Running) | (Running, Clarifying) | (Running, Complete) | (Running, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ChainState::*;
        match self {
            Planned => vec![Running],
            Running => vec![Clarifying, Complete, Failed],
            Clarifying | Complete | Failed => vec![],
        }
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainState::Planned => "PLANNED",
            ChainState::Running => "RUNNING",
            ChainState::Clarifying => "CLARIFYING",
            ChainState::Complete => "COMPLETE",
            ChainState::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}
