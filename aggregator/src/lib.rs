//! # IPM aggregator - crop/state summaries from the National IPM table
//!
//! Reads a spreadsheet of (crop, state) rows and writes two summaries: every
//! state a crop is grown in, and every crop grown in a state.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  CSV export │────▶│   Parser    │────▶│   Grouper   │────▶│ by crops.csv │
//! │  (any enc.) │     │  (auto-enc) │     │ (1st-seen)  │     │ by state.csv │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ipm_aggregator::{run, AggregatorConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&AggregatorConfig::default())?;
//!     println!("{} crops, {} states", summary.crop_groups, summary.state_groups);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Input/output paths and their defaults
//! - [`models`] - Source rows and grouped views
//! - [`parser`] - Spreadsheet loading with auto-detection
//! - [`transform`] - Grouping and the run pipeline
//! - [`validation`] - Completeness check of grouped views
//! - [`output`] - CSV persistence
//! - [`logs`] - Run logging to stderr

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Stages
pub mod output;
pub mod parser;
pub mod transform;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::AggregatorConfig;

pub use error::{LoadError, PipelineError, ValidationError, WriteError};

pub use models::{CropGroup, GroupRow, SourceRecord, SourceTable, StateGroup};

pub use parser::{load, parse_bytes};

pub use transform::{aggregate, group_by_crop, group_by_state, run, GroupedViews, RunSummary};

pub use validation::{check_completeness, CompletenessReport};

pub use output::{persist, to_csv_string};
