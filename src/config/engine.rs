//! Orchestration engine configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::matching::FuzzyThresholds;
use crate::domain::orchestration::MAX_CHAIN_LENGTH;
use crate::domain::retrieval::{RelevanceSettings, RetrievalSettings};

use super::error::ValidationError;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Longest chain the validator accepts (at most 3)
    #[serde(default = "default_max_chain_length")]
    pub max_chain_length: usize,

    /// Budget for one tool call, including all I/O it performs
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Budget for the planning completion
    #[serde(default = "default_planner_timeout")]
    pub planner_timeout_secs: u64,

    /// Contact name matching cut-offs
    #[serde(default)]
    pub fuzzy: FuzzyThresholds,

    /// Single-conversation retrieval
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Cross-conversation relevance
    #[serde(default)]
    pub relevance: RelevanceSettings,
}

impl EngineConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn planner_timeout(&self) -> Duration {
        Duration::from_secs(self.planner_timeout_secs)
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_chain_length == 0 || self.max_chain_length > MAX_CHAIN_LENGTH {
            return Err(ValidationError::InvalidChainLength(MAX_CHAIN_LENGTH));
        }
        if self.tool_timeout_secs == 0 || self.tool_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("engine.tool_timeout_secs"));
        }
        if self.planner_timeout_secs == 0 || self.planner_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("engine.planner_timeout_secs"));
        }

        let fuzzy = &self.fuzzy;
        if ![fuzzy.epsilon, fuzzy.floor, fuzzy.min_score]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
        {
            return Err(ValidationError::InvalidThreshold("fuzzy values must lie in [0, 1]"));
        }
        if fuzzy.min_score > fuzzy.floor {
            return Err(ValidationError::InvalidThreshold("fuzzy.min_score exceeds fuzzy.floor"));
        }

        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 || retrieval.recent_limit == 0 {
            return Err(ValidationError::InvalidRetrieval("retrieval limits must be positive"));
        }

        let relevance = &self.relevance;
        if relevance.top_k == 0 || relevance.max_options == 0 {
            return Err(ValidationError::InvalidRetrieval("relevance limits must be positive"));
        }
        if relevance.relevance_weight < 0.0
            || relevance.recency_weight < 0.0
            || relevance.relevance_weight + relevance.recency_weight <= 0.0
        {
            return Err(ValidationError::InvalidThreshold("relevance weights"));
        }
        if !(0.0..=1.0).contains(&relevance.qualification_threshold) {
            return Err(ValidationError::InvalidThreshold("relevance.qualification_threshold"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_length: default_max_chain_length(),
            tool_timeout_secs: default_tool_timeout(),
            planner_timeout_secs: default_planner_timeout(),
            fuzzy: FuzzyThresholds::default(),
            retrieval: RetrievalSettings::default(),
            relevance: RelevanceSettings::default(),
        }
    }
}

fn default_max_chain_length() -> usize {
    MAX_CHAIN_LENGTH
}

fn default_tool_timeout() -> u64 {
    20
}

fn default_planner_timeout() -> u64 {
    20
}
