//! Domain layer containing the orchestration logic and its value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `tools` - Tool definitions, calls, results and clarification payloads
//! - `orchestration` - Pre-flight, planning prompt, validation, mapping, resume
//! - `matching` - Fuzzy contact name resolution
//! - `retrieval` - Context assembly and cross-conversation relevance
//! - `messaging` - Contact, conversation and message records

pub mod foundation;
pub mod matching;
pub mod messaging;
pub mod orchestration;
pub mod retrieval;
pub mod tools;
