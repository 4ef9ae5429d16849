//! Command Orchestrator - Natural-language commands for a messaging app
//!
//! A user types an instruction ("Tell John I'm running late"). The engine
//! asks a language model for a short chain of tool calls, validates the
//! chain, then runs it step by step, threading each step's output into the
//! next. Chains pause for clarification when a contact or conversation is
//! ambiguous and resume from the user's choice without re-planning.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
