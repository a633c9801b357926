//! Domain models for the crop/state aggregation.
//!
//! - [`SourceRecord`] - one (crop, state) row of the source table
//! - [`SourceTable`] - ordered records plus reader metadata
//! - [`CropGroup`] - all states for one crop, joined
//! - [`StateGroup`] - all crops for one state, joined
//! - [`GroupRow`] - common shape used when persisting either view

use serde::{Deserialize, Serialize};

/// Column holding the crop name in both source and output tables.
pub const CROPS_COLUMN: &str = "Crops";

/// Column holding the state name in both source and output tables.
pub const STATES_COLUMN: &str = "States";

// =============================================================================
// Source
// =============================================================================

/// One row of the source table. A missing cell is read as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(rename = "Crops")]
    pub crop: String,
    #[serde(rename = "States")]
    pub state: String,
}

impl SourceRecord {
    pub fn new(crop: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            state: state.into(),
        }
    }
}

/// Records in source row order, with what the reader detected.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTable {
    pub records: Vec<SourceRecord>,
    /// Detected encoding of the input bytes
    pub encoding: String,
    /// Detected field delimiter
    pub delimiter: char,
    /// Header row, trimmed
    pub headers: Vec<String>,
}

impl SourceTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Grouped views
// =============================================================================

/// A grouped row: a unique key and the joined values associated with it.
///
/// Both views persist the same way; only the column names differ.
pub trait GroupRow {
    /// Header of the key column.
    const KEY_COLUMN: &'static str;
    /// Header of the joined-values column.
    const VALUES_COLUMN: &'static str;

    fn key(&self) -> &str;
    fn joined(&self) -> &str;
}

/// All states a crop is grown in, joined in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropGroup {
    #[serde(rename = "Crops")]
    pub crop: String,
    #[serde(rename = "States")]
    pub states: String,
}

/// All crops grown in a state, joined in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateGroup {
    #[serde(rename = "States")]
    pub state: String,
    #[serde(rename = "Crops")]
    pub crops: String,
}

impl GroupRow for CropGroup {
    const KEY_COLUMN: &'static str = CROPS_COLUMN;
    const VALUES_COLUMN: &'static str = STATES_COLUMN;

    fn key(&self) -> &str {
        &self.crop
    }

    fn joined(&self) -> &str {
        &self.states
    }
}

impl GroupRow for StateGroup {
    const KEY_COLUMN: &'static str = STATES_COLUMN;
    const VALUES_COLUMN: &'static str = CROPS_COLUMN;

    fn key(&self) -> &str {
        &self.state
    }

    fn joined(&self) -> &str {
        &self.crops
    }
}
