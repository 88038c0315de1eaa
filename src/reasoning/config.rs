//! Configuration for the reasoning loop.
//!
//! Provides the [`ReasoningConfig`] struct. Users usually construct it in code; it also
//! derives `serde` so deployments can keep it in a JSON file next to their prompts.
//!
//! # Example
//!
//! ```rust
//! use cloudllm_reasoning::ReasoningConfig;
//!
//! // Defaults: 5 rounds, the standard marker tokens.
//! let config = ReasoningConfig::default();
//! assert_eq!(config.max_rounds, 5);
//!
//! // Partial JSON: missing fields fall back to the defaults.
//! let config = ReasoningConfig::from_json_str(r#"{ "max_rounds": 3 }"#).unwrap();
//! assert_eq!(config.max_rounds, 3);
//! assert_eq!(config.markers.ok_token, "OK");
//! ```

use crate::reasoning::error::{ReasoningError, ReasoningResult};
use crate::reasoning::signal::MarkerSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default round budget (planning round included).
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Message shown to the user in place of a bare "verification passed" round.
pub const DEFAULT_TRANSITION_MESSAGE: &str =
    "Verification passed. The reasoning above is confirmed and will be used for planning.";

/// Settings for one [`ReasoningLoop`](crate::ReasoningLoop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Maximum number of rounds, planning round included. Must be at least 2.
    pub max_rounds: usize,
    /// Replacement text for a revision round that only said "verification passed".
    pub transition_message: String,
    /// Protocol tokens recognised at the end of a round.
    pub markers: MarkerSet,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            transition_message: DEFAULT_TRANSITION_MESSAGE.to_string(),
            markers: MarkerSet::default(),
        }
    }
}

impl ReasoningConfig {
    /// Override the round budget (builder pattern).
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Override the transition message (builder pattern).
    pub fn with_transition_message(mut self, message: impl Into<String>) -> Self {
        self.transition_message = message.into();
        self
    }

    /// Override the protocol tokens (builder pattern).
    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.markers = markers;
        self
    }

    /// Check the invariants the loop relies on.
    ///
    /// ```rust
    /// use cloudllm_reasoning::{ReasoningConfig, ReasoningError};
    ///
    /// let err = ReasoningConfig::default().with_max_rounds(1).validate().unwrap_err();
    /// assert!(matches!(err, ReasoningError::InvalidConfig(_)));
    /// ```
    pub fn validate(&self) -> Result<(), ReasoningError> {
        if self.max_rounds < 2 {
            return Err(ReasoningError::InvalidConfig(format!(
                "max_rounds must be at least 2 (planning + one revision), got {}",
                self.max_rounds
            )));
        }
        if self.transition_message.trim().is_empty() {
            return Err(ReasoningError::InvalidConfig(
                "transition_message must not be empty".to_string(),
            ));
        }
        if self.markers.ok_token.trim().is_empty() || self.markers.passed_phrase.trim().is_empty()
        {
            return Err(ReasoningError::InvalidConfig(
                "ok_token and passed_phrase must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ReasoningResult<Self> {
        let config: ReasoningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ReasoningResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            log::error!(
                "ReasoningConfig::from_json_file({}): {}",
                path.display(),
                err
            );
            err
        })?;
        Self::from_json_str(&raw)
    }
}
