//! Application layer - Planning, execution and the built-in tools.
//!
//! This layer drives the pure orchestration logic of the domain against the
//! ports: it owns the tool registry, calls the planning model, runs chains
//! and implements every built-in tool.

pub mod handlers;
pub mod tools;

mod executor;
mod planner;
mod tool_registry;

pub use executor::{ChainExecutor, ChainOutcome, ChainRun};
pub use handlers::{InvokeCommand, InvokeCommandHandler, InvokeCommandResult, OrchestratorSettings};
pub use planner::{ChainPlanner, PlanningInput};
pub use tool_registry::{RegistryError, ToolRegistry};
pub use tools::{register_builtin_tools, ToolDependencies};
