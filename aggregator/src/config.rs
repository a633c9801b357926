//! Run configuration: where to read the source table and where to write
//! the two grouped views.
//!
//! Resolution order is CLI flag, then environment (including `.env`),
//! then the defaults below.

use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

/// Default source spreadsheet, exported as CSV.
pub const DEFAULT_INPUT: &str = "National IPM Database.csv";

/// Default output for the per-crop view.
pub const DEFAULT_BY_CROP_OUTPUT: &str = "by crops.csv";

/// Default output for the per-state view.
pub const DEFAULT_BY_STATE_OUTPUT: &str = "by state.csv";

pub const INPUT_ENV: &str = "IPM_INPUT";
pub const BY_CROP_OUTPUT_ENV: &str = "IPM_BY_CROP_OUTPUT";
pub const BY_STATE_OUTPUT_ENV: &str = "IPM_BY_STATE_OUTPUT";

/// Paths for one aggregation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatorConfig {
    pub input: PathBuf,
    pub by_crop_output: PathBuf,
    pub by_state_output: PathBuf,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            by_crop_output: PathBuf::from(DEFAULT_BY_CROP_OUTPUT),
            by_state_output: PathBuf::from(DEFAULT_BY_STATE_OUTPUT),
        }
    }
}

impl AggregatorConfig {
    /// Load `.env` (if present) and read `IPM_*` overrides.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or empty keys keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            input: get(INPUT_ENV, DEFAULT_INPUT),
            by_crop_output: get(BY_CROP_OUTPUT_ENV, DEFAULT_BY_CROP_OUTPUT),
            by_state_output: get(BY_STATE_OUTPUT_ENV, DEFAULT_BY_STATE_OUTPUT),
        }
    }

    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = path.as_ref().to_path_buf();
        self
    }

    pub fn with_by_crop_output(mut self, path: impl AsRef<Path>) -> Self {
        self.by_crop_output = path.as_ref().to_path_buf();
        self
    }

    pub fn with_by_state_output(mut self, path: impl AsRef<Path>) -> Self {
        self.by_state_output = path.as_ref().to_path_buf();
        self
    }

    /// Resolve every path against `dir`. Absolute paths are left alone.
    pub fn rooted_at(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            input: dir.join(self.input),
            by_crop_output: dir.join(self.by_crop_output),
            by_state_output: dir.join(self.by_state_output),
        }
    }
}
