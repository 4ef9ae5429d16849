//! State machine trait for lifecycle enums.
//!
//! Chain execution and clarification both move through small, closed sets
//! of states; this trait gives them one checked way to transition.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```
/// use command_orchestrator::domain::foundation::StateMachine;
/// use command_orchestrator::domain::orchestration::ChainState;
///
/// let running = ChainState::Planned.transition_to(ChainState::Running).unwrap();
/// assert!(running.transition_to(ChainState::Planned).is_err());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
