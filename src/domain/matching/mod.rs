//! Matching module - Fuzzy resolution of human-typed names.

mod fuzzy;

pub use fuzzy::{
    is_initial, match_score, resolve, tokenize, FuzzyThresholds, Resolution, ScoredMatch,
    SKIP_PENALTY, TRAILING_PENALTY,
};
